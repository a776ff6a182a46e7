//! Error types for Lattice Items.
//!
//! Normalization, value matching and flattening are infallible; errors only
//! arise when reading configuration text and from lazy child loaders.

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while reading an [`ItemConfig`](crate::model::ItemConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing or shape error.
    #[error("Invalid JSON item config: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing or shape error.
    #[error("Invalid TOML item config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors reported by a [`ChildLoader`](crate::model::ChildLoader).
///
/// The coordinator does not interpret these; they are handed back to the
/// caller of `expand` unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The loader ran and failed.
    #[error("Failed to load children: {0}")]
    Failed(String),

    /// The loader could not run (backend missing, offline, ...).
    #[error("Child loader unavailable")]
    Unavailable,
}

impl LoadError {
    /// Create a failure error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
