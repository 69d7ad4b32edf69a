//! H2 dialect.
//!
//! - Double-quote identifier quoting with upcasing
//! - Truncation by formatting and re-parsing
//!   (`PARSEDATETIME`/`FORMATDATETIME`)
//! - Extraction through H2's calendar functions
//! - `TIMESTAMPADD` from the epoch for UNIX timestamp columns

use crate::mbql::DatetimeUnit;
use crate::metadata::TimestampResolution;
use crate::sql::expr::{func, lit_inline, lit_int, Expr, ExprExt};

use super::helpers::call1;
use super::{QuoteStyle, SqlDialect};

/// H2 dialect.
#[derive(Debug, Clone, Copy)]
pub struct H2;

/// Truncate by round-tripping through a format pattern.
fn trunc_with_format(format: &str, expr: Expr) -> Expr {
    func(
        "PARSEDATETIME",
        vec![
            func("FORMATDATETIME", vec![expr, lit_inline(format)]),
            lit_inline(format),
        ],
    )
}

impl SqlDialect for H2 {
    fn name(&self) -> &'static str {
        "h2"
    }

    fn quote_style(&self) -> QuoteStyle {
        QuoteStyle::H2
    }

    fn date(&self, unit: DatetimeUnit, expr: Expr) -> Expr {
        match unit {
            DatetimeUnit::Default => expr,
            DatetimeUnit::Minute => trunc_with_format("yyyyMMddHHmm", expr),
            DatetimeUnit::MinuteOfHour => call1("MINUTE", expr),
            DatetimeUnit::Hour => trunc_with_format("yyyyMMddHH", expr),
            DatetimeUnit::HourOfDay => call1("HOUR", expr),
            DatetimeUnit::Day => trunc_with_format("yyyyMMdd", expr),
            DatetimeUnit::DayOfWeek => call1("DAY_OF_WEEK", expr),
            DatetimeUnit::DayOfMonth => call1("DAY_OF_MONTH", expr),
            DatetimeUnit::DayOfYear => call1("DAY_OF_YEAR", expr),
            // Truncate to day, then step back to the start of the week.
            DatetimeUnit::Week => func(
                "DATEADD",
                vec![
                    lit_inline("day"),
                    lit_int(1).sub(call1("DAY_OF_WEEK", expr.clone())),
                    trunc_with_format("yyyyMMdd", expr),
                ],
            ),
            DatetimeUnit::WeekOfYear => call1("WEEK", expr),
            DatetimeUnit::Month => trunc_with_format("yyyyMM", expr),
            DatetimeUnit::MonthOfYear => call1("MONTH", expr),
            // Start of the year plus the elapsed whole quarters.
            DatetimeUnit::Quarter => func(
                "DATEADD",
                vec![
                    lit_inline("month"),
                    call1("QUARTER", expr.clone())
                        .sub(lit_int(1))
                        .mul(lit_int(3)),
                    trunc_with_format("yyyy", expr),
                ],
            ),
            DatetimeUnit::QuarterOfYear => call1("QUARTER", expr),
            DatetimeUnit::Year => trunc_with_format("yyyy", expr),
        }
    }

    fn add_interval(&self, expr: Expr, amount: i64, unit: DatetimeUnit) -> Expr {
        func(
            "DATEADD",
            vec![lit_inline(unit.interval_keyword()), lit_int(amount), expr],
        )
    }

    fn unix_timestamp_to_timestamp(&self, expr: Expr, resolution: TimestampResolution) -> Expr {
        match resolution {
            TimestampResolution::Seconds => func(
                "TIMESTAMPADD",
                vec![
                    lit_inline("second"),
                    expr,
                    Expr::Raw("TIMESTAMP '1970-01-01 00:00:00'".into()),
                ],
            ),
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
        expr.to_tokens().serialize(&H2).unwrap().0
    }

    #[test]
    fn test_month_truncation_round_trips_through_format() {
        let expr = H2.date(DatetimeUnit::Month, ident("created_at"));
        assert_eq!(
            sql(&expr),
            "PARSEDATETIME(FORMATDATETIME(\"CREATED_AT\", 'yyyyMM'), 'yyyyMM')"
        );
    }

    #[test]
    fn test_extraction() {
        let expr = H2.date(DatetimeUnit::DayOfWeek, ident("created_at"));
        assert_eq!(sql(&expr), "DAY_OF_WEEK(\"CREATED_AT\")");
    }

    #[test]
    fn test_unix_timestamp_from_epoch() {
        let expr = H2.unix_timestamp_to_timestamp(ident("ts"), TimestampResolution::Seconds);
        assert_eq!(
            sql(&expr),
            "TIMESTAMPADD('second', \"TS\", TIMESTAMP '1970-01-01 00:00:00')"
        );
    }
}
