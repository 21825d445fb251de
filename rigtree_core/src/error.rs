//! Fatal errors
//!
//! Only conditions that stop a parse or build outright live here. Everything
//! the pipeline can recover from is reported through [`crate::Diagnostics`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort parsing, tree construction or configuration loading
#[derive(Debug, Error)]
pub enum RigError {
    #[error("Malformed robot description: {0}")]
    MalformedDocument(#[from] roxmltree::Error),

    #[error("Cyclic robot description: link '{link}' is its own ancestor")]
    CyclicDescription { link: String },

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot attach tree: {0}")]
    InvalidAttachment(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl RigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the description text itself
    pub fn is_description_error(&self) -> bool {
        matches!(
            self,
            RigError::MalformedDocument(_) | RigError::CyclicDescription { .. }
        )
    }
}

/// Result type for rigtree operations
pub type RigResult<T> = Result<T, RigError>;
