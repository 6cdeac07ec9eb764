//! Metric query construction.
//!
//! `QueryBuilder::build_query` turns a metric kind, an optional date range,
//! scope filters and a segment into a `QuerySpec`: named filter predicates,
//! aggregation expressions and a grouping. A spec carries values as data;
//! `render` binds them as parameters, so nothing user-supplied is ever
//! spliced into SQL text.

pub mod render;
pub mod schema;

use crate::domain::booking::{
    DateRange, GuestStatus, B2B_SOURCES, NON_B2C_SOURCES, OWNER_SOURCES,
};
use crate::domain::MetricScope;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use render::Dialect;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("unknown metric kind '{0}'")]
    UnknownMetricKind(String),
    #[error("{0} needs a city or property to report on")]
    EmptyScope(MetricKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    CitySummary,
    PropertyBreakdown,
    SoldRevenue,
    B2bRevenue,
    B2cRevenue,
    MonthlyTrend,
    ChannelMix,
}

impl MetricKind {
    pub const ALL: [MetricKind; 7] = [
        MetricKind::CitySummary,
        MetricKind::PropertyBreakdown,
        MetricKind::SoldRevenue,
        MetricKind::B2bRevenue,
        MetricKind::B2cRevenue,
        MetricKind::MonthlyTrend,
        MetricKind::ChannelMix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::CitySummary => "city_summary",
            MetricKind::PropertyBreakdown => "property_breakdown",
            MetricKind::SoldRevenue => "sold_revenue",
            MetricKind::B2bRevenue => "b2b_revenue",
            MetricKind::B2cRevenue => "b2c_revenue",
            MetricKind::MonthlyTrend => "monthly_trend",
            MetricKind::ChannelMix => "channel_mix",
        }
    }

    /// City-level views are meaningless without a city (or property).
    pub fn requires_scope(self) -> bool {
        matches!(
            self,
            MetricKind::CitySummary | MetricKind::PropertyBreakdown | MetricKind::ChannelMix
        )
    }

    fn default_segment(self) -> Segment {
        match self {
            MetricKind::SoldRevenue => Segment::Sold,
            MetricKind::B2bRevenue => Segment::B2b,
            _ => Segment::B2c,
        }
    }

    /// Kinds whose segment is part of their definition.
    fn has_fixed_segment(self) -> bool {
        matches!(
            self,
            MetricKind::SoldRevenue | MetricKind::B2bRevenue | MetricKind::B2cRevenue
        )
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| QueryError::UnknownMetricKind(s.to_string()))
    }
}

/// B2C vs B2B split by source code. `Sold` is B2C plus owner bookings on
/// allow-listed properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    B2c,
    B2b,
    Owner,
    Sold,
    All,
}

impl Segment {
    pub fn as_str(self) -> &'static str {
        match self {
            Segment::B2c => "b2c",
            Segment::B2b => "b2b",
            Segment::Owner => "owner",
            Segment::Sold => "sold",
            Segment::All => "all",
        }
    }
}

impl FromStr for Segment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b2c" => Ok(Segment::B2c),
            "b2b" => Ok(Segment::B2b),
            "owner" => Ok(Segment::Owner),
            "sold" => Ok(Segment::Sold),
            "all" => Ok(Segment::All),
            other => Err(format!("unknown segment '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateColumn {
    StayDate,
    CreatedAt,
}

/// Which city or property a query reports on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFilters {
    pub city: Option<String>,
    pub property_id: Option<i64>,
}

impl ScopeFilters {
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            property_id: None,
        }
    }

    #[cfg(test)]
    pub fn property(property_id: i64) -> Self {
        Self {
            city: None,
            property_id: Some(property_id),
        }
    }

    fn city_name(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    fn is_empty(&self) -> bool {
        self.city_name().is_none() && self.property_id.is_none()
    }
}

/// Business constants that shape every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    pub property_prefixes: Vec<String>,
    pub city_blocklist: Vec<String>,
    pub owner_property_ids: Vec<i64>,
    pub default_window_start: NaiveDate,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            property_prefixes: vec!["Fab".into(), "Oriva".into()],
            city_blocklist: vec!["Gotham".into(), "daman11".into()],
            owner_property_ids: vec![980831, 980015, 913204, 990439],
            default_window_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    GuestStatusIn(Vec<GuestStatus>),
    PropertyNamePrefix(Vec<String>),
    CityNotIn(Vec<String>),
    CityEquals(String),
    PropertyIdEquals(i64),
    PropertyIdIn(Vec<i64>),
    BookingSourceIn(Vec<i64>),
    BookingSourceNotIn(Vec<i64>),
    DateWithin { column: DateColumn, range: DateRange },
    DateOnOrAfter { column: DateColumn, date: NaiveDate },
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: &'static str,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// `SUM(grand_total / 1.12)`
    Revenue,
    /// `COUNT(room_night_booking_id)`
    RoomNights,
}

impl Aggregate {
    pub fn alias(self) -> &'static str {
        match self {
            Aggregate::Revenue => "revenue",
            Aggregate::RoomNights => "room_nights",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    None,
    Property,
    Month(DateColumn),
    Sources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Unordered,
    RevenueDesc,
    MonthAsc,
}

/// Structured, injection-safe description of one metrics query.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub kind: MetricKind,
    pub segment: Segment,
    pub date_column: DateColumn,
    pub scope: MetricScope,
    pub filters: Vec<Filter>,
    pub aggregates: Vec<Aggregate>,
    pub grouping: Grouping,
    pub ordering: Ordering,
}

impl QuerySpec {
    #[cfg(test)]
    pub fn filter(&self, name: &str) -> Option<&Predicate> {
        self.filters
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.predicate)
    }

    pub fn is_grouped(&self) -> bool {
        self.grouping != Grouping::None
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    policy: FilterPolicy,
}

impl QueryBuilder {
    pub fn new(policy: FilterPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    /// Builds the spec for one metric. Fails before anything touches the
    /// database: reversed ranges, and city-level kinds with no scope.
    ///
    /// Without an explicit range the window opens at the policy's default
    /// start on `created_at` for sold revenue and `stay_date` otherwise.
    pub fn build_query(
        &self,
        kind: MetricKind,
        range: Option<DateRange>,
        scope: &ScopeFilters,
        segment: Option<Segment>,
    ) -> Result<QuerySpec, QueryError> {
        if let Some(range) = &range {
            range.validate()?;
        }
        if kind.requires_scope() && scope.is_empty() {
            return Err(QueryError::EmptyScope(kind));
        }

        let segment = match segment {
            Some(requested) if !kind.has_fixed_segment() => requested,
            _ => kind.default_segment(),
        };
        let date_column = if kind == MetricKind::SoldRevenue || segment == Segment::Sold {
            DateColumn::CreatedAt
        } else {
            DateColumn::StayDate
        };

        let mut filters = self.base_filters();
        if let Some(predicate) = self.segment_predicate(segment) {
            filters.push(Filter {
                name: "segment",
                predicate,
            });
        }
        if let Some(city) = scope.city_name() {
            filters.push(Filter {
                name: "scope_city",
                predicate: Predicate::CityEquals(city.to_string()),
            });
        }
        if let Some(id) = scope.property_id {
            filters.push(Filter {
                name: "scope_property",
                predicate: Predicate::PropertyIdEquals(id),
            });
        }
        filters.push(Filter {
            name: "date_window",
            predicate: match range {
                Some(range) => Predicate::DateWithin {
                    column: date_column,
                    range,
                },
                None => Predicate::DateOnOrAfter {
                    column: date_column,
                    date: self.policy.default_window_start,
                },
            },
        });

        let (grouping, ordering) = match kind {
            MetricKind::PropertyBreakdown => (Grouping::Property, Ordering::RevenueDesc),
            MetricKind::MonthlyTrend => (Grouping::Month(date_column), Ordering::MonthAsc),
            MetricKind::ChannelMix => (Grouping::Sources, Ordering::Unordered),
            _ => (Grouping::None, Ordering::Unordered),
        };

        Ok(QuerySpec {
            kind,
            segment,
            date_column,
            scope: summary_scope(scope),
            filters,
            aggregates: vec![Aggregate::Revenue, Aggregate::RoomNights],
            grouping,
            ordering,
        })
    }

    fn base_filters(&self) -> Vec<Filter> {
        vec![
            Filter {
                name: "guest_status",
                predicate: Predicate::GuestStatusIn(GuestStatus::REALIZED.to_vec()),
            },
            Filter {
                name: "property_brand",
                predicate: Predicate::PropertyNamePrefix(self.policy.property_prefixes.clone()),
            },
            Filter {
                name: "city_blocklist",
                predicate: Predicate::CityNotIn(self.policy.city_blocklist.clone()),
            },
        ]
    }

    fn segment_predicate(&self, segment: Segment) -> Option<Predicate> {
        let b2c = Predicate::BookingSourceNotIn(NON_B2C_SOURCES.to_vec());
        let owner = Predicate::All(vec![
            Predicate::BookingSourceIn(OWNER_SOURCES.to_vec()),
            Predicate::PropertyIdIn(self.policy.owner_property_ids.clone()),
        ]);
        match segment {
            Segment::B2c => Some(b2c),
            Segment::B2b => Some(Predicate::BookingSourceIn(B2B_SOURCES.to_vec())),
            Segment::Owner => Some(owner),
            Segment::Sold => Some(Predicate::Any(vec![b2c, owner])),
            Segment::All => None,
        }
    }
}

fn summary_scope(scope: &ScopeFilters) -> MetricScope {
    match (scope.city_name(), scope.property_id) {
        (_, Some(id)) => MetricScope::Property {
            id,
            name: String::new(),
        },
        (Some(city), None) => MetricScope::City(city.to_string()),
        (None, None) => MetricScope::Portfolio,
    }
}
