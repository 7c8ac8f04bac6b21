//! TOML-based client configuration.
//!
//! All of the operator-supplied tunables live here, immutable for the life
//! of a session. The completeness check runs when the client is enabled,
//! not at load time, so a partially filled file can still be parsed and
//! reported on.

use std::path::Path;

use serde::Deserialize;

use ntriplink_proto::constants::{
    DEFAULT_BACKOFF_MS, DEFAULT_CASTER_PORT, DEFAULT_RECEIVE_TIMEOUT_MS,
    DEFAULT_RESPONSE_DONE_MS, DEFAULT_RESPONSE_TIMEOUT_MS,
};
use ntriplink_proto::BackoffSchedule;

use crate::error::ClientError;

/// Caster endpoint, identity, and timing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Caster host name.
    #[serde(default)]
    pub host: String,
    /// Caster TCP port. Typically 2101.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Correction stream to request, without the leading slash.
    #[serde(default)]
    pub mount_point: String,
    /// Caster account, usually an e-mail address. `None` means the field
    /// was never set; an empty string requests anonymous access.
    pub user: Option<String>,
    /// Password paired with `user`.
    #[serde(default)]
    pub password: String,

    /// Product identity sent in the User-Agent line.
    #[serde(default = "default_product")]
    pub product: String,
    /// Product version sent in the User-Agent line.
    #[serde(default = "default_product_version")]
    pub product_version: String,

    /// Reconnect backoff table, indexed by attempt count. Its length is the
    /// attempt cap per activation cycle.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: Vec<u64>,
    /// How long to wait for the first response byte after the handshake.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    /// Quiet time after the last response byte before classification.
    #[serde(default = "default_response_done_ms")]
    pub response_done_ms: u64,
    /// Steady-state timeout for correction bytes while connected.
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,
}

fn default_port() -> u16 {
    DEFAULT_CASTER_PORT
}

fn default_product() -> String {
    "ntriplink".to_string()
}

fn default_product_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_backoff_ms() -> Vec<u64> {
    DEFAULT_BACKOFF_MS.to_vec()
}

fn default_response_timeout_ms() -> u64 {
    DEFAULT_RESPONSE_TIMEOUT_MS
}

fn default_response_done_ms() -> u64 {
    DEFAULT_RESPONSE_DONE_MS
}

fn default_receive_timeout_ms() -> u64 {
    DEFAULT_RECEIVE_TIMEOUT_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            mount_point: String::new(),
            user: None,
            password: String::new(),
            product: default_product(),
            product_version: default_product_version(),
            backoff_ms: default_backoff_ms(),
            response_timeout_ms: default_response_timeout_ms(),
            response_done_ms: default_response_done_ms(),
            receive_timeout_ms: default_receive_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("failed to read config file: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ClientError> {
        toml::from_str(s).map_err(|e| ClientError::Config(format!("failed to parse config: {e}")))
    }

    /// Check that every field required to contact a caster is present.
    /// Evaluated when the client is enabled.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.host.is_empty() {
            return Err(ClientError::MissingHost);
        }
        if self.mount_point.is_empty() {
            return Err(ClientError::MissingMountPoint);
        }
        if self.user.is_none() {
            return Err(ClientError::MissingUser);
        }
        Ok(())
    }

    /// The backoff schedule built from the configured table.
    pub fn backoff(&self) -> BackoffSchedule {
        BackoffSchedule::new(self.backoff_ms.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = ClientConfig::parse(
            r#"
            host = "rtk2go.com"
            mount_point = "bldr_SparkFun1"
            user = "someone@example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.host, "rtk2go.com");
        assert_eq!(config.port, 2101);
        assert_eq!(config.mount_point, "bldr_SparkFun1");
        assert_eq!(config.user.as_deref(), Some("someone@example.com"));
        assert_eq!(config.password, "");
        assert_eq!(config.response_timeout_ms, 10_000);
        assert_eq!(config.response_done_ms, 1_000);
        assert_eq!(config.receive_timeout_ms, 60_000);
        assert_eq!(config.backoff_ms, DEFAULT_BACKOFF_MS.to_vec());
        config.validate().unwrap();
    }

    #[test]
    fn parse_overrides() {
        let config = ClientConfig::parse(
            r#"
            host = "caster.example"
            port = 2102
            mount_point = "MOUNT"
            user = ""
            backoff_ms = [0, 1000]
            receive_timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 2102);
        assert_eq!(config.backoff_ms, vec![0, 1000]);
        assert_eq!(config.receive_timeout_ms, 5000);
        assert_eq!(config.backoff().attempt_limit(), 2);
        // Empty user is anonymous access, still valid.
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut config = ClientConfig::default();
        assert!(matches!(config.validate(), Err(ClientError::MissingHost)));

        config.host = "caster.example".into();
        assert!(matches!(
            config.validate(),
            Err(ClientError::MissingMountPoint)
        ));

        config.mount_point = "MOUNT".into();
        assert!(matches!(config.validate(), Err(ClientError::MissingUser)));

        config.user = Some(String::new());
        config.validate().unwrap();
    }

    #[test]
    fn parse_error_is_config_error() {
        let err = ClientConfig::parse("host = [not toml").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
