//! Series reconstruction pipeline: extract → densify → trim → trend.
//!
//! Everything here is a pure, synchronous computation over data already
//! fetched into memory. Invocations are self-contained and safe to run
//! concurrently for different series keys; there is no shared mutable state.

pub mod densify;
pub mod extract;
pub mod report;
pub mod trend;
pub mod trim;

/// One day on the reconstruction grid, in milliseconds.
///
/// The grid is anchored at the first observed day's timestamp, not at a
/// calendar epoch: every point's day is `first_day + n * DAY_MS`.
pub const DAY_MS: i64 = 86_400_000;
