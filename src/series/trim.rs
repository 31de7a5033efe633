//! Trailing-incompleteness trimmer: a zero on the most recent day usually
//! means ingestion has not caught up yet, not that nothing happened.

// The trim sentinel is an exact zero, never a computed float.
#![allow(clippy::float_cmp)]

use crate::series::densify::DenseTable;

/// Drop the final data point when it is very likely a partial day.
///
/// If the most recent case value is zero, one element is removed from the
/// case values, the death values, and the labels — in that order — plus the
/// day axis, keeping all arrays aligned. Exactly one trailing trim is ever
/// performed: only "today" can be legitimately incomplete, and a deliberate
/// zero-case historical day is left untouched. An empty table is a no-op.
///
/// Returns whether a point was removed. A table emptied by trimming is the
/// ordinary "no data" state, not an error.
pub fn trim_trailing_incomplete(table: &mut DenseTable) -> bool {
    match table.case_values.last() {
        Some(last) if *last == 0.0 => {
            table.case_values.pop();
            table.death_values.pop();
            table.labels.pop();
            table.days.pop();
            true
        }
        _ => false,
    }
}
