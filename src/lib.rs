#![forbid(unsafe_code)]

//! Counter Series Engine (cse) — rebuilds dense daily time series from a
//! sparse key-value counter store and classifies short-term trends.
//!
//! The pipeline, leaves first:
//! 1. **Key grammar** — one classifier for `<metric>_<seriesKey>_<millis>`
//!    daily keys and `<metric>_<seriesKey>` scalar keys
//! 2. **Series extractor** — daily-key filtering and value parsing
//! 3. **Gap-filling densifier** — one point per day on a fixed 24h grid,
//!    zero where the store has holes
//! 4. **Trailing-incompleteness trimmer** — drops a still-accumulating day
//! 5. **Trend comparator** — 5-day vs previous-5-day sum classification
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use counter_series_engine::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use counter_series_engine::core::config::Config;
//! use counter_series_engine::series::report::SeriesReport;
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod series;
pub mod store;

#[cfg(test)]
mod reconstruction_tests;
