//! Server configuration — parsed from TOML file + environment variable overrides.
//!
//! Priority: environment variables > config file > defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use styx_core::Address;

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// General server settings
    #[serde(default)]
    pub server: ServerSection,

    /// Transaction-history service settings
    #[serde(default)]
    pub service: ServiceSection,

    /// Wills to monitor
    #[serde(default)]
    pub wills: Vec<WillSection>,
}

/// General server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Check interval in seconds (default: 1 hour)
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            log_level: default_log_level(),
        }
    }
}

/// Transaction-history service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    /// Base URL of the safe transaction service
    #[serde(default = "default_service_url")]
    pub base_url: String,

    /// Wall-clock budget per liveness evaluation, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// A will whose claim window this daemon watches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WillSection {
    /// Human-readable label for this will
    #[serde(default = "default_will_label")]
    pub label: String,

    /// The safe the will is set on
    pub safe: Address,

    /// The owner whose inactivity opens the claim window
    pub owner: Address,

    /// Required inactivity duration in seconds
    pub timeframe_secs: u64,
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_check_interval() -> u64 {
    3600 // 1 hour
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_url() -> String {
    "https://safe-transaction-mainnet.safe.global".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_will_label() -> String {
    "will".to_string()
}

// ============================================================================
// Loading & environment override
// ============================================================================

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ServerConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `STYX_CHECK_INTERVAL`
    /// - `STYX_LOG_LEVEL`
    /// - `STYX_SERVICE_URL`
    /// - `STYX_REQUEST_TIMEOUT`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("STYX_CHECK_INTERVAL") {
            if let Ok(secs) = v.parse::<u64>() {
                self.server.check_interval_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("STYX_LOG_LEVEL") {
            self.server.log_level = v;
        }
        if let Ok(v) = std::env::var("STYX_SERVICE_URL") {
            self.service.base_url = v;
        }
        if let Ok(v) = std::env::var("STYX_REQUEST_TIMEOUT") {
            if let Ok(secs) = v.parse::<u64>() {
                self.service.request_timeout_secs = secs;
            }
        }
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.service.base_url.is_empty(),
            "service.base_url must not be empty"
        );

        anyhow::ensure!(
            self.server.check_interval_secs >= 60,
            "server.check_interval_secs must be >= 60"
        );

        anyhow::ensure!(!self.wills.is_empty(), "at least one [[wills]] entry is required");

        for will in &self.wills {
            anyhow::ensure!(
                !will.safe.is_zero(),
                "wills.safe must not be the zero address ({})",
                will.label
            );
            anyhow::ensure!(
                !will.owner.is_zero(),
                "wills.owner must not be the zero address ({})",
                will.label
            );
            anyhow::ensure!(
                will.timeframe_secs > 0,
                "wills.timeframe_secs must be > 0 ({})",
                will.label
            );
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn minimal_toml() -> &'static str {
        r#"
[[wills]]
safe = "0x5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe"
owner = "0x00000000000000000000000000000000000000aa"
timeframe_secs = 2592000
"#
    }

    fn full_toml() -> &'static str {
        r#"
[server]
check_interval_secs = 600
log_level = "debug"

[service]
base_url = "https://safe-transaction-goerli.safe.global"
request_timeout_secs = 10

[[wills]]
label = "family-safe"
safe = "0x5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe"
owner = "0x00000000000000000000000000000000000000aa"
timeframe_secs = 2592000

[[wills]]
label = "company-safe"
safe = "0x5afe5afe5afe5afe5afe5afe5afe5afe5afe5aff"
owner = "0x00000000000000000000000000000000000000bb"
timeframe_secs = 7776000
"#
    }

    #[test]
    fn test_parse_minimal_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", minimal_toml()).unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.check_interval_secs, 3600); // default
        assert_eq!(config.service.request_timeout_secs, 30); // default
        assert_eq!(config.wills.len(), 1);
        assert_eq!(config.wills[0].label, "will"); // default
        assert_eq!(config.wills[0].timeframe_secs, 2_592_000);
    }

    #[test]
    fn test_parse_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", full_toml()).unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();

        assert_eq!(config.server.check_interval_secs, 600);
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(
            config.service.base_url,
            "https://safe-transaction-goerli.safe.global"
        );
        assert_eq!(config.wills.len(), 2);
        assert_eq!(config.wills[0].label, "family-safe");
        assert_eq!(config.wills[1].timeframe_secs, 7_776_000);
    }

    #[test]
    fn test_rejects_malformed_address() {
        let toml = r#"
[[wills]]
safe = "not-an-address"
owner = "0x00000000000000000000000000000000000000aa"
timeframe_secs = 1000
"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", toml).unwrap();
        assert!(ServerConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", minimal_toml()).unwrap();

        let mut config = ServerConfig::from_file(file.path()).unwrap();

        std::env::set_var("STYX_CHECK_INTERVAL", "1800");
        std::env::set_var("STYX_SERVICE_URL", "https://svc.example.org");

        config.apply_env_overrides();

        assert_eq!(config.server.check_interval_secs, 1800);
        assert_eq!(config.service.base_url, "https://svc.example.org");

        std::env::remove_var("STYX_CHECK_INTERVAL");
        std::env::remove_var("STYX_SERVICE_URL");
    }

    #[test]
    fn test_validation_ok() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", full_toml()).unwrap();
        let config = ServerConfig::from_file(file.path()).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_no_wills() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeframe() {
        let toml = r#"
[[wills]]
safe = "0x5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe"
owner = "0x00000000000000000000000000000000000000aa"
timeframe_secs = 0
"#;
        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_check_interval_too_low() {
        let toml = r#"
[server]
check_interval_secs = 30

[[wills]]
safe = "0x5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe"
owner = "0x00000000000000000000000000000000000000aa"
timeframe_secs = 1000
"#;
        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", full_toml()).unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        let serialized = toml::to_string_pretty(&config).unwrap();

        let reparsed: ServerConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(reparsed.wills.len(), config.wills.len());
        assert_eq!(reparsed.service.base_url, config.service.base_url);
    }
}
