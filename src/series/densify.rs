//! Gap-filling densifier: one point per day on a fixed 24-hour grid, zero
//! where the underlying store has holes.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Serialize;

use crate::series::DAY_MS;

/// Aligned dense output for one series key: day axis, labels, and the two
/// metric series. All four vectors are always the same length; days ascend
/// in exact `DAY_MS` steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DenseTable {
    /// Grid days in millisecond timestamps.
    pub days: Vec<i64>,
    /// Human-readable UTC labels, one per day.
    pub labels: Vec<String>,
    /// Daily case counts.
    pub case_values: Vec<f64>,
    /// Daily death counts.
    pub death_values: Vec<f64>,
}

impl DenseTable {
    /// Number of days in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the table holds no days ("no data").
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Walk from the first observed day to `now_ms` in fixed 24-hour steps,
/// emitting a value for every day and defaulting to zero where a mapping has
/// no entry.
///
/// `start` is the smallest day present in either mapping; if both are empty
/// (or `now_ms` is not past `start`) the output is empty. The loop bound is
/// the caller-supplied clock, never ambient time: a day is emitted while
/// `day < now_ms`.
#[must_use]
pub fn densify(
    cases: &BTreeMap<i64, f64>,
    deaths: &BTreeMap<i64, f64>,
    now_ms: i64,
    date_format: &str,
) -> DenseTable {
    let start = match (cases.keys().next(), deaths.keys().next()) {
        (Some(c), Some(d)) => *c.min(d),
        (Some(c), None) => *c,
        (None, Some(d)) => *d,
        (None, None) => return DenseTable::default(),
    };

    let mut table = DenseTable::default();
    let mut it_day = start;
    while it_day < now_ms {
        table.days.push(it_day);
        table.labels.push(format_day_label(it_day, date_format));
        table
            .case_values
            .push(cases.get(&it_day).copied().unwrap_or(0.0));
        table
            .death_values
            .push(deaths.get(&it_day).copied().unwrap_or(0.0));
        let Some(next) = it_day.checked_add(DAY_MS) else {
            break;
        };
        it_day = next;
    }
    table
}

/// Render one grid day as a UTC label.
///
/// Falls back to the raw millisecond value for timestamps outside chrono's
/// representable range, so labeling is total.
#[must_use]
pub fn format_day_label(day_ms: i64, date_format: &str) -> String {
    DateTime::from_timestamp_millis(day_ms).map_or_else(
        || day_ms.to_string(),
        |moment| moment.format(date_format).to_string(),
    )
}
