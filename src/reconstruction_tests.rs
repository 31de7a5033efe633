//! Reconstruction pipeline test matrix: invariant property checks and
//! end-to-end scenarios over the in-memory store.
//!
//! Covers the pipeline-wide properties:
//! 1. Determinism — fixed mappings and a fixed clock give identical output
//! 2. Density — adjacent pre-trim days differ by exactly one day
//! 3. Default fill — days without a raw entry reconstruct as exactly zero
//! 4. Trim boundary — at most one trailing point is removed, from all
//!    aligned arrays at once
//! 5. Trend absence — fewer than ten points yields no comparison

#![allow(clippy::float_cmp)]

use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::core::config::Config;
use crate::series::DAY_MS;
use crate::series::densify::densify;
use crate::series::report::{SeriesReport, TrendStage, reconstruct};
use crate::series::trend::{TrendDirection, compare_trend};
use crate::store::key::daily_key;
use crate::store::memory::MemoryStore;

const D0: i64 = 1_583_020_800_000; // 2020-03-01T00:00:00Z

fn raw_mapping(metric: &str, series_key: &str, points: &[(i64, u32)]) -> BTreeMap<String, String> {
    points
        .iter()
        .map(|(offset, value)| {
            (
                daily_key(metric, series_key, D0 + offset * DAY_MS),
                value.to_string(),
            )
        })
        .collect()
}

// ──────────────────── strategies ────────────────────

/// Sparse day offsets with values, plus a clock a few days past the last one.
fn arb_sparse_series() -> impl Strategy<Value = (Vec<(i64, u32)>, i64)> {
    (
        prop::collection::btree_map(0_i64..90, 0_u32..100_000, 1..40),
        1_i64..4,
    )
        .prop_map(|(points, slack)| {
            let max_offset = points.keys().max().copied().unwrap_or(0);
            let now = D0 + (max_offset + slack) * DAY_MS;
            (points.into_iter().collect(), now)
        })
}

proptest! {
    #[test]
    fn reconstruction_is_deterministic((points, now) in arb_sparse_series()) {
        let cases = raw_mapping("cases", "us", &points);
        let deaths = raw_mapping("deaths", "us", &points);
        let config = Config::default();

        let first = reconstruct("us", &cases, &deaths, now, &config).expect("reconstruct");
        let second = reconstruct("us", &cases, &deaths, now, &config).expect("reconstruct");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn pre_trim_grid_is_dense_and_anchored((points, now) in arb_sparse_series()) {
        let cases: BTreeMap<i64, f64> = points
            .iter()
            .map(|(offset, value)| (D0 + offset * DAY_MS, f64::from(*value)))
            .collect();
        let table = densify(&cases, &BTreeMap::new(), now, "%-d %b '%y");

        prop_assert!(!table.is_empty());
        let first_observed = *cases.keys().next().expect("nonempty");
        prop_assert_eq!(table.days[0], first_observed);
        for pair in table.days.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], DAY_MS);
        }
    }

    #[test]
    fn gap_days_reconstruct_as_exactly_zero((points, now) in arb_sparse_series()) {
        let cases: BTreeMap<i64, f64> = points
            .iter()
            .map(|(offset, value)| (D0 + offset * DAY_MS, f64::from(*value)))
            .collect();
        let table = densify(&cases, &BTreeMap::new(), now, "%-d %b '%y");

        for (day, value) in table.days.iter().zip(&table.case_values) {
            match cases.get(day) {
                Some(observed) => prop_assert_eq!(value, observed),
                None => prop_assert_eq!(*value, 0.0),
            }
        }
    }

    #[test]
    fn output_arrays_stay_aligned_through_trimming((points, now) in arb_sparse_series()) {
        let cases = raw_mapping("cases", "us", &points);
        let config = Config::default();
        let rec = reconstruct("us", &cases, &BTreeMap::new(), now, &config)
            .expect("reconstruct");

        let table = &rec.table;
        prop_assert_eq!(table.days.len(), table.labels.len());
        prop_assert_eq!(table.days.len(), table.case_values.len());
        prop_assert_eq!(table.days.len(), table.death_values.len());
    }

    #[test]
    fn trimming_removes_at_most_one_point((points, now) in arb_sparse_series()) {
        let cases: BTreeMap<i64, f64> = points
            .iter()
            .map(|(offset, value)| (D0 + offset * DAY_MS, f64::from(*value)))
            .collect();
        let pre_trim = densify(&cases, &BTreeMap::new(), now, "%-d %b '%y");

        let raw = raw_mapping("cases", "us", &points);
        let config = Config::default();
        let rec = reconstruct("us", &raw, &BTreeMap::new(), now, &config)
            .expect("reconstruct");

        let removed = pre_trim.len() - rec.table.len();
        prop_assert!(removed <= 1);
        prop_assert_eq!(removed == 1, rec.trimmed);
        prop_assert_eq!(
            &rec.table.case_values[..],
            &pre_trim.case_values[..pre_trim.len() - removed]
        );
    }
}

// ──────────────────── worked scenarios ────────────────────

#[test]
fn gapped_two_point_series_densifies_to_three_days() {
    // Raw: day 0 = 10, day 2 = 30, day 1 missing; now = day 3.
    let cases = raw_mapping("cases", "us", &[(0, 10), (2, 30)]);
    let config = Config::default();
    let rec = reconstruct("us", &cases, &BTreeMap::new(), D0 + 3 * DAY_MS, &config)
        .expect("reconstruct");

    assert_eq!(rec.table.case_values, vec![10.0, 0.0, 30.0]);
    assert!(!rec.trimmed, "nonzero tail must not trim");
}

#[test]
fn ten_days_with_incomplete_today_trims_to_nine_and_loses_the_trend() {
    let values: Vec<(i64, u32)> = [1, 2, 3, 4, 5, 6, 7, 8, 9, 0]
        .iter()
        .enumerate()
        .map(|(i, v)| (i as i64, *v))
        .collect();
    let cases = raw_mapping("cases", "us", &values);
    let config = Config::default();
    let rec = reconstruct("us", &cases, &BTreeMap::new(), D0 + 10 * DAY_MS, &config)
        .expect("reconstruct");

    assert!(rec.trimmed);
    assert_eq!(
        rec.table.case_values,
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
    );

    // Post-trim (the shipped default): nine points, comparison absent.
    assert_eq!(rec.trend(TrendStage::PostTrim), None);

    // Pre-trim variant still sees ten points: [6,7,8,9,0] vs [1,2,3,4,5].
    let pre = rec.trend(TrendStage::PreTrim).expect("comparison");
    assert_eq!(pre.current_window_sum, 30.0);
    assert_eq!(pre.previous_window_sum, 15.0);
    assert_eq!(pre.direction, TrendDirection::More);
}

#[test]
fn flat_ten_point_series_compares_as_same() {
    let values = [2.0; 10];
    let cmp = compare_trend(&values).expect("comparison");
    assert_eq!(cmp.direction, TrendDirection::Same);
    assert_eq!(cmp.current_window_sum, 10.0);
    assert_eq!(cmp.previous_window_sum, 10.0);
}

#[test]
fn end_to_end_report_over_memory_store_with_gaps() {
    let mut store = MemoryStore::new();
    store.insert("cases_fr", "500");
    store.insert("deaths_fr", "20");
    // Observed on days 0, 1, 3, 5; days 2 and 4 are store holes.
    for (offset, cases, deaths) in [(0, 10, 1), (1, 12, 0), (3, 20, 2), (5, 25, 3)] {
        store.insert(
            daily_key("cases", "fr", D0 + offset * DAY_MS),
            cases.to_string(),
        );
        store.insert(
            daily_key("deaths", "fr", D0 + offset * DAY_MS),
            deaths.to_string(),
        );
    }
    // An unrelated series must not leak in.
    store.insert(daily_key("cases", "de", D0), "9999");

    let config = Config::default();
    let report =
        SeriesReport::build(&store, "fr", &config, D0 + 6 * DAY_MS).expect("report");

    assert_eq!(report.total_cases, 500.0);
    assert_eq!(report.total_deaths, 20.0);
    assert_eq!(
        report.reconstruction.table.case_values,
        vec![10.0, 12.0, 0.0, 20.0, 0.0, 25.0]
    );
    assert_eq!(
        report.reconstruction.table.death_values,
        vec![1.0, 0.0, 0.0, 2.0, 0.0, 3.0]
    );
    assert!(!report.reconstruction.trimmed);
    assert_eq!(report.trend, None, "six points is below the trend floor");
    assert!(report.warnings.is_empty());
}

#[test]
fn labels_follow_the_dense_grid() {
    let cases = raw_mapping("cases", "us", &[(0, 1), (2, 1)]);
    let config = Config::default();
    let rec = reconstruct("us", &cases, &BTreeMap::new(), D0 + 3 * DAY_MS, &config)
        .expect("reconstruct");
    assert_eq!(
        rec.table.labels,
        vec!["1 Mar '20", "2 Mar '20", "3 Mar '20"]
    );
}
