//! Series extractor: filters a raw key-value mapping down to the daily
//! points of one metric/series combination.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{EngineError, Result};
use crate::store::key::{self, KeyKind};

/// What to do with a non-numeric value under a daily key.
///
/// `Propagate` rejects the whole extraction for the metric rather than
/// silently coercing to zero — mixing a parse failure with zero-fill would
/// mask store corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Fail the extraction with [`EngineError::ValueParse`].
    #[default]
    Propagate,
    /// Treat the unparseable entry as zero.
    ZeroFill,
}

impl FromStr for ParsePolicy {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw {
            "propagate" => Ok(Self::Propagate),
            "zero_fill" => Ok(Self::ZeroFill),
            other => Err(format!(
                "unknown parse policy {other:?} (expected \"propagate\" or \"zero_fill\")"
            )),
        }
    }
}

impl fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Propagate => "propagate",
            Self::ZeroFill => "zero_fill",
        })
    }
}

/// Extract the day→value mapping for one metric/series combination.
///
/// Keeps exactly the entries whose key is `<metric>_<seriesKey>_<millis>`
/// with a well-formed 13-digit suffix; the scalar key and sibling series are
/// excluded. Duplicate days are not expected, but if present the last entry
/// in the raw map's iteration order wins.
pub fn extract_daily(
    raw: &BTreeMap<String, String>,
    metric: &str,
    series_key: &str,
    policy: ParsePolicy,
) -> Result<BTreeMap<i64, f64>> {
    let mut daily = BTreeMap::new();
    for (raw_key, raw_value) in raw {
        if let KeyKind::Daily(day_ms) = key::classify(raw_key, metric, series_key) {
            daily.insert(day_ms, parse_value(raw_key, raw_value, policy)?);
        }
    }
    Ok(daily)
}

/// Extract the scalar total stored under `<metric>_<seriesKey>`, if present.
pub fn extract_scalar(
    raw: &BTreeMap<String, String>,
    metric: &str,
    series_key: &str,
    policy: ParsePolicy,
) -> Result<Option<f64>> {
    let scalar = key::scalar_key(metric, series_key);
    raw.get(&scalar)
        .map(|raw_value| parse_value(&scalar, raw_value, policy))
        .transpose()
}

fn parse_value(raw_key: &str, raw_value: &str, policy: ParsePolicy) -> Result<f64> {
    match raw_value.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => match policy {
            ParsePolicy::Propagate => Err(EngineError::ValueParse {
                key: raw_key.to_string(),
                value: raw_value.to_string(),
            }),
            ParsePolicy::ZeroFill => Ok(0.0),
        },
    }
}
