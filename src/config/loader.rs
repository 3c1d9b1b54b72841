//! Configuration loading and merging logic
//!
//! Layers, highest precedence first:
//! 1. Environment variable overrides
//! 2. Config file (explicit path, or the root config if present)
//! 3. Built-in defaults

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// An explicit `path` must exist; the root config is optional.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let config = match path {
            Some(path) => Self::load_file(path)?,
            None => {
                let root = paths::root_config_path();
                if root.exists() {
                    Self::load_file(&root)?
                } else {
                    Self::load_defaults()
                }
            }
        };

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check values that parse but cannot run
    pub fn validate(config: &Config) -> Result<()> {
        if config.resync.interval_seconds == 0 {
            return Err(anyhow::anyhow!("resync.intervalSeconds must be greater than 0"));
        }
        if config.report.interval_seconds == 0 {
            return Err(anyhow::anyhow!("report.intervalSeconds must be greater than 0"));
        }
        tracing_subscriber::EnvFilter::try_new(&config.logger.level)
            .with_context(|| format!("Invalid logger.level: {}", config.logger.level))?;

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
        if let Some(namespace) = var("SVCMAP_NAMESPACE") {
            config.namespace = namespace;
        }

        if let Some(interval) = var("SVCMAP_RESYNC_INTERVAL") {
            match interval.parse() {
                Ok(val) => config.resync.interval_seconds = val,
                Err(_) => tracing::warn!("Ignoring SVCMAP_RESYNC_INTERVAL={}", interval),
            }
        }

        if let Some(watch) = var("SVCMAP_WATCH") {
            if let Ok(val) = watch.parse::<bool>() {
                config.resync.watch = val;
            }
        }

        if let Some(level) = var("SVCMAP_LOG_LEVEL") {
            config.logger.level = level;
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
