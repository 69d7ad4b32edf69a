//! Field reference clauses.

use serde::{Deserialize, Serialize};

use crate::metadata::{BaseType, FieldId};

/// A reference to a column-producing thing.
///
/// Structural equality matters: the breakout applier uses it to skip
/// breakout columns already present in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldRef {
    /// A stored field, by id.
    FieldId(FieldId),

    /// An unresolved column by name - the shape a source query's result
    /// columns take. Emitted as a bare identifier, never re-aliased.
    FieldLiteral { name: String, base_type: BaseType },

    /// Foreign-key navigation: the destination field reached through a
    /// foreign-key field on the source table.
    Fk {
        fk_field_id: FieldId,
        dest_field: Box<FieldRef>,
    },

    /// Date truncation or extraction applied to the wrapped reference.
    Datetime {
        field: Box<FieldRef>,
        unit: DatetimeUnit,
    },

    /// Numeric binning applied to the wrapped reference.
    Binned {
        field: Box<FieldRef>,
        strategy: BinningStrategy,
        options: BinningOptions,
    },

    /// A named entry of the enclosing query's `expressions` map.
    Expression(String),

    /// The n-th aggregation at the current nesting level. References
    /// cannot reach aggregations of enclosing levels.
    Aggregation(usize),
}

impl FieldRef {
    pub fn field(id: i64) -> Self {
        FieldRef::FieldId(FieldId(id))
    }

    pub fn datetime(self, unit: DatetimeUnit) -> Self {
        FieldRef::Datetime {
            field: Box::new(self),
            unit,
        }
    }

    pub fn fk(fk_field_id: i64, dest_field: FieldRef) -> Self {
        FieldRef::Fk {
            fk_field_id: FieldId(fk_field_id),
            dest_field: Box::new(dest_field),
        }
    }
}

/// Date bucketing granularity. Truncation units produce dates, the
/// `*-of-*` units extract a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatetimeUnit {
    Default,
    Minute,
    MinuteOfHour,
    Hour,
    HourOfDay,
    Day,
    DayOfWeek,
    DayOfMonth,
    DayOfYear,
    Week,
    WeekOfYear,
    Month,
    MonthOfYear,
    Quarter,
    QuarterOfYear,
    Year,
}

impl DatetimeUnit {
    /// The unit keyword used in interval arithmetic (`INTERVAL 'n day'`,
    /// `DATEADD(day, n, expr)`).
    pub fn interval_keyword(&self) -> &'static str {
        match self {
            DatetimeUnit::Minute | DatetimeUnit::MinuteOfHour => "minute",
            DatetimeUnit::Hour | DatetimeUnit::HourOfDay => "hour",
            DatetimeUnit::Default
            | DatetimeUnit::Day
            | DatetimeUnit::DayOfWeek
            | DatetimeUnit::DayOfMonth
            | DatetimeUnit::DayOfYear => "day",
            DatetimeUnit::Week | DatetimeUnit::WeekOfYear => "week",
            DatetimeUnit::Month | DatetimeUnit::MonthOfYear => "month",
            DatetimeUnit::Quarter | DatetimeUnit::QuarterOfYear => "quarter",
            DatetimeUnit::Year => "year",
        }
    }
}

/// How bin boundaries were chosen. Resolution happens upstream; by the
/// time a clause reaches the compiler the options carry concrete numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinningStrategy {
    Default,
    NumBins,
    BinWidth,
}

/// Resolved binning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BinningOptions {
    pub bin_width: f64,
    pub min_value: f64,
    /// Carried through resolution but unused when emitting the binning
    /// arithmetic.
    pub max_value: f64,
}
