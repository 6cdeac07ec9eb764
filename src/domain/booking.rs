// src/domain/booking.rs

use crate::query::QueryError;
use chrono::NaiveDate;
use std::fmt;

/// `grand_total` is tax-inclusive at a flat 12%; net revenue is
/// `grand_total / NET_REVENUE_DIVISOR`.
pub const NET_REVENUE_DIVISOR: f64 = 1.12;

/// Codes excluded from the B2C segment.
pub const NON_B2C_SOURCES: [i64; 6] = [13, 19, 3, 4, 21, 24];
pub const B2B_SOURCES: [i64; 4] = [3, 4, 21, 24];
pub const OWNER_SOURCES: [i64; 2] = [13, 19];

/// Status codes stored in `mtd.guest_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuestStatus {
    Pending,
    CheckedIn,
    CheckedOut,
    NoShow,
    Cancelled,
}

impl GuestStatus {
    pub const REALIZED: [GuestStatus; 2] = [GuestStatus::CheckedIn, GuestStatus::CheckedOut];

    pub fn code(self) -> i64 {
        match self {
            GuestStatus::Pending => 0,
            GuestStatus::CheckedIn => 1,
            GuestStatus::CheckedOut => 2,
            GuestStatus::NoShow => 3,
            GuestStatus::Cancelled => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GuestStatus::Pending => "Pending",
            GuestStatus::CheckedIn => "Checked-in",
            GuestStatus::CheckedOut => "Checked-out",
            GuestStatus::NoShow => "No-show",
            GuestStatus::Cancelled => "Cancelled",
        }
    }
}

/// Inclusive date bounds. Construction does not validate; `validate` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.start > self.end {
            return Err(QueryError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Exclusive upper bound, so timestamp columns include the whole last day.
    pub fn end_exclusive(&self) -> Option<NaiveDate> {
        self.end.succ_opt()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
