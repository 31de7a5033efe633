//! Reconstruction entry point and per-series report assembly.
//!
//! `reconstruct` is the pure pipeline (extract → densify → trim) over raw
//! mappings already fetched from the store; `SeriesReport::build` adds the
//! store reads, scalar totals, trend classification, and the free-text
//! travel note around it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::config::Config;
use crate::core::errors::Result;
use crate::series::densify::{DenseTable, densify};
use crate::series::extract::{extract_daily, extract_scalar};
use crate::series::trend::{TrendComparison, compare_trend};
use crate::series::trim::trim_trailing_incomplete;
use crate::store::CounterStore;
use crate::store::key::scalar_key;

/// Metric name for daily case counts.
pub const METRIC_CASES: &str = "cases";
/// Metric name for daily death counts.
pub const METRIC_DEATHS: &str = "deaths";
/// Metric name for the free-text travel-restriction note.
pub const METRIC_TRAVEL: &str = "travel";

/// Which series the trend comparator consumes.
///
/// The shipped behavior drops the trailing incomplete day before comparing
/// (`PostTrim`); `PreTrim` compares over the series as densified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStage {
    /// Compare over the trimmed series (complete days only).
    #[default]
    PostTrim,
    /// Compare over the pre-trim series, trailing zero included.
    PreTrim,
}

impl FromStr for TrendStage {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw {
            "post_trim" => Ok(Self::PostTrim),
            "pre_trim" => Ok(Self::PreTrim),
            other => Err(format!(
                "unknown trend stage {other:?} (expected \"post_trim\" or \"pre_trim\")"
            )),
        }
    }
}

impl fmt::Display for TrendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PostTrim => "post_trim",
            Self::PreTrim => "pre_trim",
        })
    }
}

/// The trimmed dense output for one series key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconstruction {
    /// Trimmed, aligned dense table.
    pub table: DenseTable,
    /// Whether a trailing incomplete day was dropped.
    pub trimmed: bool,
}

impl Reconstruction {
    /// Trend comparison at the requested stage.
    ///
    /// The trimmer only ever removes a zero-valued case point, so the
    /// pre-trim case series is recoverable from the trimmed table.
    #[must_use]
    pub fn trend(&self, stage: TrendStage) -> Option<TrendComparison> {
        match stage {
            TrendStage::PostTrim => compare_trend(&self.table.case_values),
            TrendStage::PreTrim => {
                if self.trimmed {
                    let mut values = self.table.case_values.clone();
                    values.push(0.0);
                    compare_trend(&values)
                } else {
                    compare_trend(&self.table.case_values)
                }
            }
        }
    }
}

/// Rebuild the dense daily series for one series key from the raw mappings.
///
/// Pure given its inputs: repeated calls with the same mappings and clock
/// yield identical output. `now_ms` is the loop bound for densification and
/// must come from the caller; the engine never reads ambient time.
pub fn reconstruct(
    series_key: &str,
    cases_raw: &BTreeMap<String, String>,
    deaths_raw: &BTreeMap<String, String>,
    now_ms: i64,
    config: &Config,
) -> Result<Reconstruction> {
    let policy = config.series.parse_policy;
    let cases = extract_daily(cases_raw, METRIC_CASES, series_key, policy)?;
    let deaths = extract_daily(deaths_raw, METRIC_DEATHS, series_key, policy)?;

    let mut table = densify(&cases, &deaths, now_ms, &config.labels.date_format);
    let trimmed = trim_trailing_incomplete(&mut table);

    Ok(Reconstruction { table, trimmed })
}

/// Everything the caller needs to present one series: totals, the trimmed
/// dense table, the trend classification, and the travel note.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesReport {
    /// The series key this report describes.
    pub series_key: String,
    /// Scalar total cases (0 when the scalar key is absent).
    pub total_cases: f64,
    /// Scalar total deaths (0 when the scalar key is absent).
    pub total_deaths: f64,
    /// Trimmed dense series and labels.
    pub reconstruction: Reconstruction,
    /// 5-day vs previous-5-day comparison, absent under 10 points.
    pub trend: Option<TrendComparison>,
    /// Free-text travel-restriction note, if set.
    pub travel_note: Option<String>,
    /// Degraded store reads, if any. A failed read contributes an empty
    /// mapping ("no data") rather than failing the report.
    pub warnings: Vec<String>,
}

impl SeriesReport {
    /// Assemble the report for `series_key` from the store.
    ///
    /// The three reads address disjoint key prefixes and have no ordering
    /// dependency. Each failed read degrades to "no data" and is recorded in
    /// `warnings`; only value parsing can fail the build (per the configured
    /// parse policy).
    pub fn build(
        store: &dyn CounterStore,
        series_key: &str,
        config: &Config,
        now_ms: i64,
    ) -> Result<Self> {
        let mut warnings = Vec::new();

        let cases_raw = read_or_empty(store, METRIC_CASES, series_key, &mut warnings);
        let deaths_raw = read_or_empty(store, METRIC_DEATHS, series_key, &mut warnings);

        let travel_note = match store.get(&scalar_key(METRIC_TRAVEL, series_key)) {
            Ok(note) => note.filter(|n| !n.trim().is_empty()),
            Err(err) => {
                warnings.push(format!("travel note read degraded to absent: {err}"));
                None
            }
        };

        let policy = config.series.parse_policy;
        let total_cases =
            extract_scalar(&cases_raw, METRIC_CASES, series_key, policy)?.unwrap_or(0.0);
        let total_deaths =
            extract_scalar(&deaths_raw, METRIC_DEATHS, series_key, policy)?.unwrap_or(0.0);

        let reconstruction = reconstruct(series_key, &cases_raw, &deaths_raw, now_ms, config)?;
        let trend = reconstruction.trend(config.series.trend_stage);

        Ok(Self {
            series_key: series_key.to_string(),
            total_cases,
            total_deaths,
            reconstruction,
            trend,
            travel_note,
            warnings,
        })
    }
}

fn read_or_empty(
    store: &dyn CounterStore,
    metric: &str,
    series_key: &str,
    warnings: &mut Vec<String>,
) -> BTreeMap<String, String> {
    let pattern = format!("{metric}_{series_key}*");
    match store.get_all_by_pattern(&pattern) {
        Ok(mapping) => mapping,
        Err(err) => {
            warnings.push(format!("{metric} read degraded to empty: {err}"));
            BTreeMap::new()
        }
    }
}
