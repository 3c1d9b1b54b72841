//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespace to mirror; empty means all namespaces
    #[serde(default)]
    pub namespace: String,

    /// Resync configuration
    #[serde(default)]
    pub resync: ResyncConfig,

    /// Topology report configuration
    #[serde(default)]
    pub report: ReportConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Resync configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResyncConfig {
    /// Seconds between full listings
    #[serde(default = "default_resync_interval")]
    pub interval_seconds: u64,

    /// Apply incremental watch events between listings
    #[serde(default = "default_true")]
    pub watch: bool,
}

/// Topology report configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    /// Seconds between topology summaries in the log
    #[serde(default = "default_report_interval")]
    pub interval_seconds: u64,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Filter directive used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file; stderr when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_resync_interval() -> u64 {
    300
}

fn default_report_interval() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            resync: ResyncConfig::default(),
            report: ReportConfig::default(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Default for ResyncConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_resync_interval(),
            watch: default_true(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_report_interval(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}
