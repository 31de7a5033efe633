//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use counter_series_engine::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{EngineError, Result};

// Store
pub use crate::store::CounterStore;
pub use crate::store::key::{KeyKind, classify, daily_key, scalar_key};
pub use crate::store::memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use crate::store::sqlite::SqliteStore;

// Series pipeline
pub use crate::series::DAY_MS;
pub use crate::series::densify::{DenseTable, densify};
pub use crate::series::extract::{ParsePolicy, extract_daily, extract_scalar};
pub use crate::series::report::{Reconstruction, SeriesReport, TrendStage, reconstruct};
pub use crate::series::trend::{TrendComparison, TrendDirection, WINDOW_DAYS, compare_trend};
pub use crate::series::trim::trim_trailing_incomplete;
