//! Oracle dialect.
//!
//! - Double-quote identifier quoting
//! - `TRUNC(expr, 'fmt')` truncation, `EXTRACT`/`TO_CHAR` extraction
//! - Interval arithmetic through `NUMTODSINTERVAL`/`NUMTOYMINTERVAL`
//! - Custom column names truncated to Oracle's 30-byte identifier limit

use crate::mbql::DatetimeUnit;
use crate::metadata::TimestampResolution;
use crate::sql::expr::{extract, func, lit_inline, lit_int, Expr, ExprExt};

use super::{QuoteStyle, SqlDialect};

const MAX_IDENTIFIER_LEN: usize = 30;

/// Oracle dialect.
#[derive(Debug, Clone, Copy)]
pub struct Oracle;

/// `TRUNC(expr, 'fmt')`.
fn trunc(fmt: &str, expr: Expr) -> Expr {
    func("TRUNC", vec![expr, lit_inline(fmt)])
}

/// `TO_NUMBER(TO_CHAR(expr, 'fmt'))`.
fn to_char_number(fmt: &str, expr: Expr) -> Expr {
    func("TO_NUMBER", vec![func("TO_CHAR", vec![expr, lit_inline(fmt)])])
}

impl SqlDialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn quote_style(&self) -> QuoteStyle {
        QuoteStyle::Oracle
    }

    fn current_datetime(&self) -> Expr {
        Expr::Raw("CURRENT_TIMESTAMP".into())
    }

    fn date(&self, unit: DatetimeUnit, expr: Expr) -> Expr {
        match unit {
            DatetimeUnit::Default => expr,
            DatetimeUnit::Minute => trunc("MI", expr),
            DatetimeUnit::MinuteOfHour => extract("minute", expr),
            DatetimeUnit::Hour => trunc("HH", expr),
            DatetimeUnit::HourOfDay => extract("hour", expr),
            DatetimeUnit::Day => trunc("DD", expr),
            DatetimeUnit::DayOfWeek => to_char_number("D", expr),
            DatetimeUnit::DayOfMonth => extract("day", expr),
            DatetimeUnit::DayOfYear => to_char_number("DDD", expr),
            DatetimeUnit::Week => trunc("IW", expr),
            DatetimeUnit::WeekOfYear => to_char_number("IW", expr),
            DatetimeUnit::Month => trunc("MM", expr),
            DatetimeUnit::MonthOfYear => extract("month", expr),
            DatetimeUnit::Quarter => trunc("Q", expr),
            DatetimeUnit::QuarterOfYear => to_char_number("Q", expr),
            DatetimeUnit::Year => trunc("YYYY", expr),
        }
    }

    fn add_interval(&self, expr: Expr, amount: i64, unit: DatetimeUnit) -> Expr {
        let interval = match unit {
            DatetimeUnit::Month | DatetimeUnit::MonthOfYear => {
                func("NUMTOYMINTERVAL", vec![lit_int(amount), lit_inline("MONTH")])
            }
            DatetimeUnit::Quarter | DatetimeUnit::QuarterOfYear => func(
                "NUMTOYMINTERVAL",
                vec![lit_int(amount * 3), lit_inline("MONTH")],
            ),
            DatetimeUnit::Year => {
                func("NUMTOYMINTERVAL", vec![lit_int(amount), lit_inline("YEAR")])
            }
            DatetimeUnit::Week | DatetimeUnit::WeekOfYear => func(
                "NUMTODSINTERVAL",
                vec![lit_int(amount * 7), lit_inline("DAY")],
            ),
            DatetimeUnit::Minute | DatetimeUnit::MinuteOfHour => func(
                "NUMTODSINTERVAL",
                vec![lit_int(amount), lit_inline("MINUTE")],
            ),
            DatetimeUnit::Hour | DatetimeUnit::HourOfDay => {
                func("NUMTODSINTERVAL", vec![lit_int(amount), lit_inline("HOUR")])
            }
            _ => func("NUMTODSINTERVAL", vec![lit_int(amount), lit_inline("DAY")]),
        };
        expr.add(interval)
    }

    fn unix_timestamp_to_timestamp(&self, expr: Expr, resolution: TimestampResolution) -> Expr {
        match resolution {
            TimestampResolution::Seconds => Expr::Raw("TIMESTAMP '1970-01-01 00:00:00'".into())
                .add(func("NUMTODSINTERVAL", vec![expr, lit_inline("SECOND")])),
            TimestampResolution::Milliseconds => self.unix_timestamp_to_timestamp(
                expr.div(lit_int(1000)),
                TimestampResolution::Seconds,
            ),
        }
    }

    fn format_custom_field_name(&self, name: &str) -> String {
        name.chars().take(MAX_IDENTIFIER_LEN).collect()
    }
}
