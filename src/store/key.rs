//! Counter store key grammar: one classifier for the
//! `<metric>_<seriesKey>_<millis>` convention.
//!
//! The wire format is load-bearing: an external population job writes these
//! keys, so the formatters here must stay bit-exact. A daily key carries a
//! millisecond timestamp suffix of exactly 13 ASCII digits (valid for dates
//! between 2001 and 2286); the scalar form omits the suffix entirely.

#![allow(missing_docs)]

use std::sync::OnceLock;

use regex::Regex;

/// Classification of one raw store key relative to a metric + series key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// `<metric>_<seriesKey>_<millis>` — one daily snapshot.
    Daily(i64),
    /// `<metric>_<seriesKey>` — the scalar/static value for the series.
    Scalar,
    /// Anything else: other series, malformed suffix, unrelated key.
    Foreign,
}

fn millis_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{13}$").expect("static regex must compile"))
}

/// Format the daily key for `day_ms`, zero-padded to the 13-digit contract.
#[must_use]
pub fn daily_key(metric: &str, series_key: &str, day_ms: i64) -> String {
    format!("{metric}_{series_key}_{day_ms:013}")
}

/// Format the scalar key for a series.
#[must_use]
pub fn scalar_key(metric: &str, series_key: &str) -> String {
    format!("{metric}_{series_key}")
}

/// Classify `key` against an expected metric and series key.
///
/// The match is exact: after `<metric>_<seriesKey>_` the remainder must be
/// precisely 13 digits. A key for a sibling series that merely shares the
/// prefix (`cases_us_east_…` seen from series `us`) classifies as `Foreign`.
#[must_use]
pub fn classify(key: &str, metric: &str, series_key: &str) -> KeyKind {
    let scalar = scalar_key(metric, series_key);
    if key == scalar {
        return KeyKind::Scalar;
    }
    let Some(rest) = key.strip_prefix(&scalar) else {
        return KeyKind::Foreign;
    };
    let Some(suffix) = rest.strip_prefix('_') else {
        return KeyKind::Foreign;
    };
    if !millis_suffix().is_match(suffix) {
        return KeyKind::Foreign;
    }
    suffix.parse::<i64>().map_or(KeyKind::Foreign, KeyKind::Daily)
}

/// Recover the series key from a raw key under `metric`, if any.
///
/// Both daily and scalar shapes yield their series key; keys for other
/// metrics yield `None`. Used for store inventory listings.
#[must_use]
pub fn series_key_of<'a>(key: &'a str, metric: &str) -> Option<&'a str> {
    let rest = key.strip_prefix(metric)?.strip_prefix('_')?;
    if rest.is_empty() {
        return None;
    }
    match rest.rsplit_once('_') {
        Some((series, suffix)) if millis_suffix().is_match(suffix) => Some(series),
        _ => Some(rest),
    }
}
