//! KT-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, TallyError>;

/// Top-level error type for keytally.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("[KT-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[KT-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[KT-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[KT-2001] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[KT-2002] corrupt tally file {path}: {details}")]
    CorruptStore { path: PathBuf, details: String },

    #[error("[KT-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TallyError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "KT-1001",
            Self::MissingConfig { .. } => "KT-1002",
            Self::ConfigParse { .. } => "KT-1003",
            Self::Serialization { .. } => "KT-2001",
            Self::CorruptStore { .. } => "KT-2002",
            Self::Io { .. } => "KT-3001",
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for a tally file that exists but cannot be decoded.
    #[must_use]
    pub fn corrupt(path: impl AsRef<Path>, details: impl Into<String>) -> Self {
        Self::CorruptStore {
            path: path.as_ref().to_path_buf(),
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for TallyError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
