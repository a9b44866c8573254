//! Crate-wide error type.
//!
//! Every fallible operation in the engine returns [`Result`]. Validation
//! errors are raised at the offending call and never clamped or retried;
//! callers rebuild the object after fixing the input.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by tilesets, animations, particle systems and config loaders.
#[derive(Debug, Error)]
pub enum TilesparkError {
    /// An index or frame went past the end of its container.
    #[error("{what} index {index} out of range (len {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Counts, ranges or dimensions that can never produce a valid object.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Backing storage for a drawable (particle buffer, texture) could not be obtained.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// A configuration file or a named entry inside it is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A configuration value could not be parsed.
    #[error("failed to parse [{section}] {key}: {message}")]
    Parse {
        section: String,
        key: String,
        message: String,
    },

    /// Writing an output file (the frame report) failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output document could not be encoded.
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TilesparkError {
    pub(crate) fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Self::OutOfRange { what, index, len }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub(crate) fn parse(
        section: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            section: section.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TilesparkError>;
