// src/domain/metrics.rs

use crate::domain::channel::{classify, ChannelLabel};
use std::collections::BTreeMap;
use std::fmt;

/// What a metrics record describes.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricScope {
    Portfolio,
    City(String),
    Property { id: i64, name: String },
    Month(String),
    Channel(ChannelLabel),
}

impl fmt::Display for MetricScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricScope::Portfolio => f.write_str("portfolio"),
            MetricScope::City(city) => write!(f, "city {city}"),
            MetricScope::Property { id, name } if name.is_empty() => write!(f, "property #{id}"),
            MetricScope::Property { name, .. } => write!(f, "property {name}"),
            MetricScope::Month(month) => write!(f, "month {month}"),
            MetricScope::Channel(label) => write!(f, "channel {label}"),
        }
    }
}

/// Aggregated revenue and volume for one scope. Values keep full precision;
/// round only when rendering (see `round2` / `format_currency`).
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRecord {
    pub scope: MetricScope,
    pub revenue: f64,
    pub room_nights: i64,
    pub adr: Option<f64>,
}

impl MetricsRecord {
    pub fn new(scope: MetricScope, revenue: f64, room_nights: i64) -> Self {
        let room_nights = room_nights.max(0);
        let adr = if room_nights > 0 {
            Some(revenue / room_nights as f64)
        } else {
            None
        };
        Self {
            scope,
            revenue,
            room_nights,
            adr,
        }
    }

    #[cfg(test)]
    pub fn empty(scope: MetricScope) -> Self {
        Self::new(scope, 0.0, 0)
    }
}

/// Grouping key columns read back from an aggregate row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowKey {
    Total,
    Property { id: i64, name: String },
    Month(String),
    Sources {
        booking_source: Option<i64>,
        ota_booking_source: Option<i64>,
    },
}

/// One aggregate row as returned by the SQL execution service.
/// `revenue` is NULL when SUM ran over no rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub key: RowKey,
    pub revenue: Option<f64>,
    pub room_nights: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricsReport {
    Summary(MetricsRecord),
    Breakdown(Vec<MetricsRecord>),
}

impl MetricsReport {
    pub fn into_records(self) -> Vec<MetricsRecord> {
        match self {
            MetricsReport::Summary(record) => vec![record],
            MetricsReport::Breakdown(records) => records,
        }
    }

    /// The single record of a summary; a breakdown is folded into one
    /// record for `scope`.
    pub fn into_summary(self, scope: MetricScope) -> MetricsRecord {
        match self {
            MetricsReport::Summary(record) => record,
            MetricsReport::Breakdown(records) => {
                let (revenue, room_nights) = records
                    .iter()
                    .fold((0.0, 0), |(rev, rn), r| (rev + r.revenue, rn + r.room_nights));
                MetricsRecord::new(scope, revenue, room_nights)
            }
        }
    }
}

/// Result formatter entry point: ungrouped queries collapse to one record,
/// grouped ones to a list.
pub fn format(scope: MetricScope, grouped: bool, rows: Vec<MetricRow>) -> MetricsReport {
    if grouped {
        MetricsReport::Breakdown(format_breakdown(rows))
    } else {
        MetricsReport::Summary(format_summary(scope, &rows))
    }
}

/// Single-record shaping for ungrouped aggregates. Zero rows (or a row of
/// NULL sums) yields revenue 0, room nights 0 and no ADR.
pub fn format_summary(scope: MetricScope, rows: &[MetricRow]) -> MetricsRecord {
    let (revenue, room_nights) = rows.iter().fold((0.0, 0), |(rev, rn), row| {
        (rev + row.revenue.unwrap_or(0.0), rn + row.room_nights)
    });
    MetricsRecord::new(scope, revenue, room_nights)
}

/// Shapes grouped rows. Month keys are sorted chronologically; channel rows
/// are folded through the classifier and ordered by revenue, highest first.
/// Property rows keep the order the query produced.
pub fn format_breakdown(rows: Vec<MetricRow>) -> Vec<MetricsRecord> {
    let mut channels: BTreeMap<ChannelLabel, (f64, i64)> = BTreeMap::new();
    let mut records = Vec::new();
    let mut by_month = false;

    for row in rows {
        let revenue = row.revenue.unwrap_or(0.0);
        match row.key {
            RowKey::Total => records.push(MetricsRecord::new(
                MetricScope::Portfolio,
                revenue,
                row.room_nights,
            )),
            RowKey::Property { id, name } => records.push(MetricsRecord::new(
                MetricScope::Property { id, name },
                revenue,
                row.room_nights,
            )),
            RowKey::Month(month) => {
                by_month = true;
                records.push(MetricsRecord::new(
                    MetricScope::Month(month),
                    revenue,
                    row.room_nights,
                ));
            }
            RowKey::Sources {
                booking_source,
                ota_booking_source,
            } => {
                let entry = channels
                    .entry(classify(booking_source, ota_booking_source))
                    .or_insert((0.0, 0));
                entry.0 += revenue;
                entry.1 += row.room_nights;
            }
        }
    }

    if by_month {
        records.sort_by(|a, b| month_key(a).cmp(month_key(b)));
    }

    if !channels.is_empty() {
        let mut folded: Vec<MetricsRecord> = channels
            .into_iter()
            .map(|(label, (revenue, rn))| MetricsRecord::new(MetricScope::Channel(label), revenue, rn))
            .collect();
        folded.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        records.extend(folded);
    }

    records
}

fn month_key(record: &MetricsRecord) -> &str {
    match &record.scope {
        MetricScope::Month(month) => month,
        _ => "",
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `₹1,234,567.89`; negative values keep their sign in front of the symbol.
pub fn format_currency(value: f64) -> String {
    let rounded = round2(value);
    let sign = if rounded < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}₹{}.{cents}", group_thousands(whole))
}

pub fn format_count(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(&value.unsigned_abs().to_string()))
}

pub fn format_adr(adr: Option<f64>) -> String {
    adr.map(format_currency).unwrap_or_else(|| "n/a".to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
