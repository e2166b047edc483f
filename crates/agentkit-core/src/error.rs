//! Error types for agentkit
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for agentkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for agentkit
#[derive(Error, Debug)]
pub enum Error {
    /// Input text that cannot be interpreted (addresses, prefixes, families)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A file could not be read
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path of the file being accessed
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Content was read but holds nothing usable (PEM, keypairs)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plugin lifecycle errors
    #[error("Plugin error ({plugin}): {message}")]
    Plugin {
        /// Plugin name
        plugin: String,
        /// Error message
        message: String,
    },

    /// Data synchronisation errors
    #[error("Data sync error: {0}")]
    DataSync(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a malformed input error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Create an I/O error carrying the offending path
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a plugin error
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create a data sync error
    pub fn data_sync(msg: impl Into<String>) -> Self {
        Self::DataSync(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = Error::io(
            "/etc/agent/ca.pem",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/etc/agent/ca.pem"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn plugin_error_format() {
        let err = Error::plugin("local-transport", "already closed");
        assert_eq!(
            err.to_string(),
            "Plugin error (local-transport): already closed"
        );
    }
}
