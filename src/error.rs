//! Error types for configuration and graph loading
//!
//! The engine itself has no fatal runtime states: `set_graph`, `tick` and the
//! gesture entry points never fail. Errors only arise when building an engine
//! from an invalid configuration or when a host loads files from disk.

use thiserror::Error;

/// Errors raised while loading or validating a [`LayoutConfig`](crate::LayoutConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A tunable has a value the simulation cannot run with
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The configuration file extension is not recognized
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The configuration file could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the library's fallible entry points
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The engine configuration was rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A graph file could not be parsed
    #[error("graph parse error: {0}")]
    GraphParse(#[from] serde_json::Error),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fallible layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;
