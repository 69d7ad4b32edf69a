//! SQL Server dialect.
//!
//! - Bracket identifier quoting (`[name]`)
//! - Truncation via the `DATEADD(unit, DATEDIFF(unit, 0, expr), 0)` idiom
//! - `DATEPART` extraction
//! - `GETUTCDATE()` for the current datetime
//! - `OFFSET ... FETCH` pagination

use crate::mbql::DatetimeUnit;
use crate::metadata::TimestampResolution;
use crate::sql::expr::{func, lit_inline, lit_int, Expr, ExprExt};
use crate::sql::token::{Token, TokenStream};

use super::{QuoteStyle, SqlDialect};

/// SQL Server dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlServer;

/// `DATEPART(part, expr)`. The part is a keyword, not a string.
fn date_part(part: &str, expr: Expr) -> Expr {
    func("DATEPART", vec![Expr::Raw(part.into()), expr])
}

/// Truncate by measuring whole units since epoch zero and adding them
/// back: `DATEADD(unit, DATEDIFF(unit, 0, expr), 0)`.
fn date_trunc(unit: &str, expr: Expr) -> Expr {
    func(
        "DATEADD",
        vec![
            Expr::Raw(unit.into()),
            func("DATEDIFF", vec![Expr::Raw(unit.into()), lit_int(0), expr]),
            lit_int(0),
        ],
    )
}

impl SqlDialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote_style(&self) -> QuoteStyle {
        QuoteStyle::SqlServer
    }

    fn current_datetime(&self) -> Expr {
        func("GETUTCDATE", vec![])
    }

    fn date(&self, unit: DatetimeUnit, expr: Expr) -> Expr {
        match unit {
            DatetimeUnit::Default => expr,
            DatetimeUnit::Minute => date_trunc("minute", expr),
            DatetimeUnit::MinuteOfHour => date_part("minute", expr),
            DatetimeUnit::Hour => date_trunc("hour", expr),
            DatetimeUnit::HourOfDay => date_part("hour", expr),
            DatetimeUnit::Day => func("CONVERT", vec![Expr::Raw("DATE".into()), expr]),
            DatetimeUnit::DayOfWeek => date_part("weekday", expr),
            DatetimeUnit::DayOfMonth => date_part("day", expr),
            DatetimeUnit::DayOfYear => date_part("dayofyear", expr),
            DatetimeUnit::Week => date_trunc("week", expr),
            DatetimeUnit::WeekOfYear => date_part("iso_week", expr),
            DatetimeUnit::Month => date_trunc("month", expr),
            DatetimeUnit::MonthOfYear => date_part("month", expr),
            DatetimeUnit::Quarter => date_trunc("quarter", expr),
            DatetimeUnit::QuarterOfYear => date_part("quarter", expr),
            DatetimeUnit::Year => date_trunc("year", expr),
        }
    }

    fn add_interval(&self, expr: Expr, amount: i64, unit: DatetimeUnit) -> Expr {
        func(
            "DATEADD",
            vec![
                Expr::Raw(unit.interval_keyword().into()),
                lit_int(amount),
                expr,
            ],
        )
    }

    fn unix_timestamp_to_timestamp(&self, expr: Expr, resolution: TimestampResolution) -> Expr {
        match resolution {
            TimestampResolution::Seconds => func(
                "DATEADD",
                vec![Expr::Raw("second".into()), expr, lit_inline("1970-01-01")],
            ),
            TimestampResolution::Milliseconds => self.unix_timestamp_to_timestamp(
                expr.div(lit_int(1000)),
                TimestampResolution::Seconds,
            ),
        }
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Offset)
            .space()
            .push(Token::LitInt(offset.unwrap_or(0) as i64))
            .space()
            .push(Token::Rows);
        if let Some(limit) = limit {
            ts.space()
                .push(Token::Fetch)
                .space()
                .push(Token::Next)
                .space()
                .push(Token::LitInt(limit as i64))
                .space()
                .push(Token::Rows)
                .space()
                .push(Token::Only);
        }
        ts
    }
}
