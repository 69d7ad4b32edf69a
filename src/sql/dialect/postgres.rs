//! PostgreSQL dialect.
//!
//! - ANSI identifier quoting (`"`)
//! - `DATE_TRUNC` / `EXTRACT` date bucketing
//! - `TO_TIMESTAMP` for UNIX timestamp columns (root default)
//! - `expr + INTERVAL 'n unit'` arithmetic (root default)

use crate::mbql::DatetimeUnit;
use crate::sql::expr::{extract, lit_int, Expr, ExprExt};

use super::helpers::date_trunc;
use super::SqlDialect;

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn date(&self, unit: DatetimeUnit, expr: Expr) -> Expr {
        match unit {
            DatetimeUnit::Default => expr,
            DatetimeUnit::Minute => date_trunc("minute", expr),
            DatetimeUnit::MinuteOfHour => extract("minute", expr),
            DatetimeUnit::Hour => date_trunc("hour", expr),
            DatetimeUnit::HourOfDay => extract("hour", expr),
            DatetimeUnit::Day => date_trunc("day", expr),
            // Postgres DOW is 0-6 starting Sunday; shift to 1-7.
            DatetimeUnit::DayOfWeek => extract("dow", expr).add(lit_int(1)),
            DatetimeUnit::DayOfMonth => extract("day", expr),
            DatetimeUnit::DayOfYear => extract("doy", expr),
            DatetimeUnit::Week => date_trunc("week", expr),
            DatetimeUnit::WeekOfYear => extract("week", expr),
            DatetimeUnit::Month => date_trunc("month", expr),
            DatetimeUnit::MonthOfYear => extract("month", expr),
            DatetimeUnit::Quarter => date_trunc("quarter", expr),
            DatetimeUnit::QuarterOfYear => extract("quarter", expr),
            DatetimeUnit::Year => date_trunc("year", expr),
        }
    }
}
