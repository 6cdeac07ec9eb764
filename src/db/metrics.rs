use crate::db::connection::Database;
use crate::domain::metrics::{self, MetricRow, MetricsReport, RowKey};
use crate::errors::ServerError;
use crate::query::render::{self, city_list_statement, BoundQuery, Dialect};
use crate::query::{FilterPolicy, Grouping, QuerySpec};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Row};
use sea_query::{Value, Values};
use tracing::debug;

/// Executes a metrics spec against the local database and shapes the rows.
pub fn run_metrics(db: &Database, spec: &QuerySpec) -> Result<MetricsReport, ServerError> {
    let bound = spec.bind(Dialect::Sqlite);
    debug!(kind = %spec.kind, sql = %bound.sql, "running metrics query");

    let grouping = spec.grouping;
    let rows = fetch(db, &bound, |row| read_metric_row(row, grouping))?;
    debug!(kind = %spec.kind, rows = rows.len(), "metrics query finished");

    Ok(metrics::format(spec.scope.clone(), spec.is_grouped(), rows))
}

pub fn get_city_list(db: &Database, policy: &FilterPolicy) -> Result<Vec<String>, ServerError> {
    let bound = render::build(&city_list_statement(policy), Dialect::Sqlite);
    fetch(db, &bound, |row| row.get::<_, String>(0))
}

fn fetch<T, F>(db: &Database, bound: &BoundQuery, map: F) -> Result<Vec<T>, ServerError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let params = sql_params(&bound.values)?;
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(&bound.sql)
            .map_err(|e| ServerError::DbError(format!("Prepare failed: {e}")))?;

        let rows = stmt
            .query_map(params_from_iter(params.iter()), map)
            .map_err(|e| ServerError::DbError(format!("Query failed: {e}")))?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(format!("Row read failed: {e}")))?);
        }
        Ok(out)
    })
}

fn read_metric_row(row: &Row<'_>, grouping: Grouping) -> rusqlite::Result<MetricRow> {
    let key = match grouping {
        Grouping::None => RowKey::Total,
        Grouping::Property => RowKey::Property {
            id: row.get("property_id")?,
            name: row
                .get::<_, Option<String>>("property_name")?
                .unwrap_or_default(),
        },
        Grouping::Month(_) => RowKey::Month(row.get("month")?),
        Grouping::Sources => RowKey::Sources {
            booking_source: row.get("booking_source")?,
            ota_booking_source: row.get("ota_booking_source")?,
        },
    };

    Ok(MetricRow {
        key,
        revenue: row.get("revenue")?,
        room_nights: row.get("room_nights")?,
    })
}

/// Converts the builder's bound values into rusqlite parameters.
fn sql_params(values: &Values) -> Result<Vec<SqlValue>, ServerError> {
    values
        .0
        .iter()
        .map(|value| match value {
            Value::Int(v) => Ok(v.map_or(SqlValue::Null, |n| SqlValue::Integer(n.into()))),
            Value::BigInt(v) => Ok(v.map_or(SqlValue::Null, SqlValue::Integer)),
            Value::Double(v) => Ok(v.map_or(SqlValue::Null, SqlValue::Real)),
            Value::String(v) => Ok(v
                .as_ref()
                .map_or(SqlValue::Null, |s| SqlValue::Text(s.to_string()))),
            other => Err(ServerError::DbError(format!(
                "Unsupported bind value: {other:?}"
            ))),
        })
        .collect()
}
