//! Error types for splitroute.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitrouteError {
    /// A single textual entry could not be parsed. Callers skip it and count it.
    #[error("Malformed entry '{entry}': {reason}")]
    MalformedEntry { entry: String, reason: String },

    /// A configuration invariant does not hold. Nothing is computed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid feed payload: {0}")]
    Feed(String),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Failed to render output: {0}")]
    Render(String),
}

impl SplitrouteError {
    pub fn malformed(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    pub fn is_malformed_entry(&self) -> bool {
        matches!(self, Self::MalformedEntry { .. })
    }
}
