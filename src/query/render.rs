// src/query/render.rs

use super::schema::Mtd;
use super::{Aggregate, DateColumn, FilterPolicy, Grouping, Ordering, Predicate, QuerySpec};
use crate::domain::booking::NET_REVENUE_DIVISOR;
use sea_query::{
    Alias, Cond, Condition, Expr, Func, LikeExpr, Order, PostgresQueryBuilder, Query, SelectStatement,
    SimpleExpr, SqliteQueryBuilder, Values,
};

/// SQLite runs the queries locally; PostgreSQL is the dialect shown to
/// analysts who copy the SQL into the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

/// Parameterized SQL plus the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub sql: String,
    pub values: Values,
}

impl QuerySpec {
    pub fn to_statement(&self, dialect: Dialect) -> SelectStatement {
        let mut stmt = Query::select();
        stmt.from(Mtd::Table);

        match self.grouping {
            Grouping::None => {}
            Grouping::Property => {
                stmt.columns([Mtd::PropertyId, Mtd::PropertyName])
                    .group_by_columns([Mtd::PropertyId, Mtd::PropertyName]);
            }
            Grouping::Month(column) => {
                let key = month_key(column, dialect);
                stmt.expr_as(key.clone(), Alias::new("month"))
                    .add_group_by([key]);
            }
            Grouping::Sources => {
                stmt.columns([Mtd::BookingSource, Mtd::OtaBookingSource])
                    .group_by_columns([Mtd::BookingSource, Mtd::OtaBookingSource]);
            }
        }

        for aggregate in &self.aggregates {
            stmt.expr_as(aggregate_expr(*aggregate), Alias::new(aggregate.alias()));
        }

        let clause = self
            .filters
            .iter()
            .fold(Cond::all(), |cond, filter| cond.add(condition(&filter.predicate)));
        stmt.cond_where(clause);

        match self.ordering {
            Ordering::Unordered => {}
            Ordering::RevenueDesc => {
                stmt.order_by(Alias::new(Aggregate::Revenue.alias()), Order::Desc);
            }
            Ordering::MonthAsc => {
                stmt.order_by(Alias::new("month"), Order::Asc);
            }
        }

        stmt.to_owned()
    }

    /// Placeholders and bound values; the only form that is ever executed.
    pub fn bind(&self, dialect: Dialect) -> BoundQuery {
        let (sql, values) = match dialect {
            Dialect::Sqlite => self.to_statement(dialect).build(SqliteQueryBuilder),
            Dialect::Postgres => self.to_statement(dialect).build(PostgresQueryBuilder),
        };
        BoundQuery { sql, values }
    }

    /// Values inlined and escaped by the query builder, for display only.
    pub fn display_sql(&self, dialect: Dialect) -> String {
        inline(&self.to_statement(dialect), dialect)
    }
}

/// Distinct cities under the brand and blocklist filters, alphabetical.
pub fn city_list_statement(policy: &FilterPolicy) -> SelectStatement {
    Query::select()
        .distinct()
        .column(Mtd::PropertyCity)
        .from(Mtd::Table)
        .cond_where(
            Cond::all()
                .add(Expr::col(Mtd::PropertyCity).is_not_null())
                .add(condition(&Predicate::PropertyNamePrefix(
                    policy.property_prefixes.clone(),
                )))
                .add(condition(&Predicate::CityNotIn(policy.city_blocklist.clone()))),
        )
        .order_by(Mtd::PropertyCity, Order::Asc)
        .to_owned()
}

pub fn build(stmt: &SelectStatement, dialect: Dialect) -> BoundQuery {
    let (sql, values) = match dialect {
        Dialect::Sqlite => stmt.build(SqliteQueryBuilder),
        Dialect::Postgres => stmt.build(PostgresQueryBuilder),
    };
    BoundQuery { sql, values }
}

fn inline(stmt: &SelectStatement, dialect: Dialect) -> String {
    match dialect {
        Dialect::Sqlite => stmt.to_string(SqliteQueryBuilder),
        Dialect::Postgres => stmt.to_string(PostgresQueryBuilder),
    }
}

fn column(date: DateColumn) -> Mtd {
    match date {
        DateColumn::StayDate => Mtd::StayDate,
        DateColumn::CreatedAt => Mtd::CreatedAt,
    }
}

/// `YYYY-MM` text key for the month containing the date column.
fn month_key(date: DateColumn, dialect: Dialect) -> SimpleExpr {
    match dialect {
        Dialect::Sqlite => Func::cust(Alias::new("strftime"))
            .arg(Expr::cust("'%Y-%m'"))
            .arg(Expr::col(column(date)))
            .into(),
        Dialect::Postgres => Func::cust(Alias::new("TO_CHAR"))
            .arg(Expr::col(column(date)))
            .arg(Expr::cust("'YYYY-MM'"))
            .into(),
    }
}

fn aggregate_expr(aggregate: Aggregate) -> SimpleExpr {
    match aggregate {
        Aggregate::Revenue => Func::sum(Expr::col(Mtd::GrandTotal).div(NET_REVENUE_DIVISOR)).into(),
        Aggregate::RoomNights => Func::count(Expr::col(Mtd::RoomNightBookingId)).into(),
    }
}

fn day(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Escapes LIKE wildcards so a prefix matches literally.
fn escape_like(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len());
    for ch in prefix.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn condition(predicate: &Predicate) -> Condition {
    match predicate {
        Predicate::GuestStatusIn(statuses) => Cond::all()
            .add(Expr::col(Mtd::GuestStatus).is_in(statuses.iter().map(|s| s.code()))),
        Predicate::PropertyNamePrefix(prefixes) => prefixes.iter().fold(Cond::any(), |cond, prefix| {
            cond.add(
                Expr::col(Mtd::PropertyName)
                    .like(LikeExpr::new(format!("{}%", escape_like(prefix))).escape('\\')),
            )
        }),
        Predicate::CityNotIn(cities) => {
            Cond::all().add(Expr::col(Mtd::PropertyCity).is_not_in(cities.iter().cloned()))
        }
        Predicate::CityEquals(city) => Cond::all().add(Expr::col(Mtd::PropertyCity).eq(city.as_str())),
        Predicate::PropertyIdEquals(id) => Cond::all().add(Expr::col(Mtd::PropertyId).eq(*id)),
        Predicate::PropertyIdIn(ids) => {
            Cond::all().add(Expr::col(Mtd::PropertyId).is_in(ids.iter().copied()))
        }
        Predicate::BookingSourceIn(codes) => {
            Cond::all().add(Expr::col(Mtd::BookingSource).is_in(codes.iter().copied()))
        }
        Predicate::BookingSourceNotIn(codes) => {
            Cond::all().add(Expr::col(Mtd::BookingSource).is_not_in(codes.iter().copied()))
        }
        Predicate::DateWithin { column: date, range } => {
            let col = column(*date);
            let lower = Cond::all().add(Expr::col(col).gte(day(range.start)));
            // Compare against the next day so timestamps on the last day count.
            match range.end_exclusive() {
                Some(next) => lower.add(Expr::col(col).lt(day(next))),
                None => lower.add(Expr::col(col).lte(day(range.end))),
            }
        }
        Predicate::DateOnOrAfter { column: date, date: from } => {
            Cond::all().add(Expr::col(column(*date)).gte(day(*from)))
        }
        Predicate::All(parts) => parts
            .iter()
            .fold(Cond::all(), |cond, part| cond.add(condition(part))),
        Predicate::Any(parts) => parts
            .iter()
            .fold(Cond::any(), |cond, part| cond.add(condition(part))),
    }
}
