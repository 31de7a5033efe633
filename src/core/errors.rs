//! CSE-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for the counter series engine.
///
/// Two absent states are deliberately *not* errors: an empty series (no data
/// for a series key) and insufficient history for the trend comparison. Both
/// are representable in the normal return types.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("[CSE-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[CSE-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[CSE-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[CSE-2001] non-numeric counter value {value:?} under daily key {key}")]
    ValueParse { key: String, value: String },

    #[error("[CSE-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[CSE-2102] SQL failure in {context}: {details}")]
    Sql {
        context: &'static str,
        details: String,
    },

    #[error("[CSE-3001] store read failure for {pattern}: {details}")]
    StoreRead { pattern: String, details: String },

    #[error("[CSE-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "CSE-1001",
            Self::MissingConfig { .. } => "CSE-1002",
            Self::ConfigParse { .. } => "CSE-1003",
            Self::ValueParse { .. } => "CSE-2001",
            Self::Serialization { .. } => "CSE-2101",
            Self::Sql { .. } => "CSE-2102",
            Self::StoreRead { .. } => "CSE-3001",
            Self::Io { .. } => "CSE-3002",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// Retry policy itself lives with the store client; the engine never
    /// retries internally.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreRead { .. } | Self::Sql { .. } | Self::Io { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for EngineError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql {
            context: "rusqlite",
            details: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
