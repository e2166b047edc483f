//! Configuration types for agentkit
//!
//! This module defines the configuration structures shared across the
//! workspace. Values can be deserialized from any serde format or read
//! from environment variables.

use serde::{Deserialize, Serialize};

/// Client TLS settings
///
/// Consumed by `agentkit-tls` to assemble a client TLS configuration.
/// `enabled` is carried for the caller; the builder itself ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Whether the caller should use TLS at all
    pub enabled: bool,

    /// Skip server certificate verification
    pub skip_verify: bool,

    /// Path to the client certificate (PEM)
    pub cert_file: String,

    /// Path to the client private key (PEM)
    pub key_file: String,

    /// Path to the CA bundle (PEM)
    pub ca_file: String,
}

impl TlsConfig {
    /// Create a new, disabled configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable TLS
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enable or disable server certificate verification
    pub fn with_skip_verify(mut self, skip_verify: bool) -> Self {
        self.skip_verify = skip_verify;
        self
    }

    /// Set the client certificate and key paths
    pub fn with_client_cert(mut self, cert_file: impl Into<String>, key_file: impl Into<String>) -> Self {
        self.cert_file = cert_file.into();
        self.key_file = key_file.into();
        self
    }

    /// Set the CA bundle path
    pub fn with_ca_file(mut self, ca_file: impl Into<String>) -> Self {
        self.ca_file = ca_file.into();
        self
    }

    /// Whether both halves of a client keypair are configured
    pub fn has_client_cert(&self) -> bool {
        !self.cert_file.is_empty() && !self.key_file.is_empty()
    }

    /// Load configuration from environment variables
    ///
    /// Reads `{prefix}ENABLED`, `{prefix}SKIP_VERIFY`, `{prefix}CERT_FILE`,
    /// `{prefix}KEY_FILE` and `{prefix}CA_FILE`. Unset variables keep
    /// their defaults.
    ///
    /// # Example
    ///
    /// ```bash
    /// export AGENT_TLS_ENABLED=true
    /// export AGENT_TLS_CA_FILE=/etc/agent/ca.pem
    /// ```
    pub fn from_env(prefix: &str) -> Result<Self, crate::Error> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{prefix}{name}"));
        let flag = |name: &str| -> Result<bool, crate::Error> {
            match var(name) {
                Some(value) => parse_bool(&format!("{prefix}{name}"), &value),
                None => Ok(false),
            }
        };

        Ok(Self {
            enabled: flag("ENABLED")?,
            skip_verify: flag("SKIP_VERIFY")?,
            cert_file: var("CERT_FILE").unwrap_or_default(),
            key_file: var("KEY_FILE").unwrap_or_default(),
            ca_file: var("CA_FILE").unwrap_or_default(),
        })
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, crate::Error> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(crate::Error::config(format!(
            "{name} must be a boolean (true/false/1/0/yes/no). Got: '{other}'"
        ))),
    }
}
