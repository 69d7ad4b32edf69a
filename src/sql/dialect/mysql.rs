//! MySQL dialect.
//!
//! - Backtick identifier quoting
//! - Truncation by formatting and re-parsing (`STR_TO_DATE`/`DATE_FORMAT`)
//! - `FROM_UNIXTIME` for UNIX timestamp columns
//! - `DATE_ADD(expr, INTERVAL n unit)` arithmetic

use crate::mbql::DatetimeUnit;
use crate::metadata::TimestampResolution;
use crate::sql::expr::{func, lit_inline, lit_int, Expr, ExprExt};

use super::helpers::call1;
use super::{QuoteStyle, SqlDialect};

/// MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

/// Truncate by round-tripping through a date format string.
fn trunc_with_format(format: &str, expr: Expr) -> Expr {
    func(
        "STR_TO_DATE",
        vec![
            func("DATE_FORMAT", vec![expr, lit_inline(format)]),
            lit_inline(format),
        ],
    )
}

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_style(&self) -> QuoteStyle {
        QuoteStyle::MySql
    }

    fn date(&self, unit: DatetimeUnit, expr: Expr) -> Expr {
        match unit {
            DatetimeUnit::Default => expr,
            DatetimeUnit::Minute => trunc_with_format("%Y-%m-%d %H:%i", expr),
            DatetimeUnit::MinuteOfHour => call1("MINUTE", expr),
            DatetimeUnit::Hour => trunc_with_format("%Y-%m-%d %H", expr),
            DatetimeUnit::HourOfDay => call1("HOUR", expr),
            DatetimeUnit::Day => call1("DATE", expr),
            DatetimeUnit::DayOfWeek => call1("DAYOFWEEK", expr),
            DatetimeUnit::DayOfMonth => call1("DAYOFMONTH", expr),
            DatetimeUnit::DayOfYear => call1("DAYOFYEAR", expr),
            // YEARWEEK + %X%V pins the result to the first day of the week.
            DatetimeUnit::Week => func(
                "STR_TO_DATE",
                vec![
                    func(
                        "CONCAT",
                        vec![func("YEARWEEK", vec![expr]), lit_inline(" Sunday")],
                    ),
                    lit_inline("%X%V %W"),
                ],
            ),
            DatetimeUnit::WeekOfYear => call1("WEEK", expr),
            DatetimeUnit::Month => trunc_with_format("%Y-%m", expr),
            DatetimeUnit::MonthOfYear => call1("MONTH", expr),
            DatetimeUnit::Quarter => func(
                "STR_TO_DATE",
                vec![
                    func(
                        "CONCAT",
                        vec![
                            call1("YEAR", expr.clone()),
                            lit_inline("-"),
                            call1("QUARTER", expr).mul(lit_int(3)).sub(lit_int(2)),
                            lit_inline("-01"),
                        ],
                    ),
                    lit_inline("%Y-%m-%d"),
                ],
            ),
            DatetimeUnit::QuarterOfYear => call1("QUARTER", expr),
            DatetimeUnit::Year => func("MAKEDATE", vec![call1("YEAR", expr), lit_int(1)]),
        }
    }

    fn add_interval(&self, expr: Expr, amount: i64, unit: DatetimeUnit) -> Expr {
        func(
            "DATE_ADD",
            vec![
                expr,
                Expr::Raw(format!(
                    "INTERVAL {} {}",
                    amount,
                    unit.interval_keyword().to_uppercase()
                )),
            ],
        )
    }

    fn unix_timestamp_to_timestamp(&self, expr: Expr, resolution: TimestampResolution) -> Expr {
        match resolution {
            TimestampResolution::Seconds => func("FROM_UNIXTIME", vec![expr]),
            TimestampResolution::Milliseconds => self.unix_timestamp_to_timestamp(
                expr.div(lit_int(1000)),
                TimestampResolution::Seconds,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::expr::ident;

    fn sql(expr: &Expr) -> String {
        expr.to_tokens().serialize(&MySql).unwrap().0
    }

    #[test]
    fn test_month_truncation_round_trips_through_format() {
        let expr = MySql.date(DatetimeUnit::Month, ident("created_at"));
        assert_eq!(
            sql(&expr),
            "STR_TO_DATE(DATE_FORMAT(`created_at`, '%Y-%m'), '%Y-%m')"
        );
    }

    #[test]
    fn test_unix_timestamp_seconds() {
        let expr = MySql.unix_timestamp_to_timestamp(ident("ts"), TimestampResolution::Seconds);
        assert_eq!(sql(&expr), "FROM_UNIXTIME(`ts`)");
    }

    #[test]
    fn test_unix_timestamp_milliseconds_divides_first() {
        let expr =
            MySql.unix_timestamp_to_timestamp(ident("ts"), TimestampResolution::Milliseconds);
        assert_eq!(sql(&expr), "FROM_UNIXTIME(`ts` / 1000)");
    }

    #[test]
    fn test_add_interval() {
        let expr = MySql.add_interval(ident("created_at"), -30, DatetimeUnit::Day);
        assert_eq!(sql(&expr), "DATE_ADD(`created_at`, INTERVAL -30 DAY)");
    }
}
