//! Configuration system for svcmap
//!
//! Layered configuration: built-in defaults, a YAML file, then environment
//! overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, LoggerConfig, ReportConfig, ResyncConfig};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "namespace" => Ok(config.namespace.clone()),
        "resync.intervalSeconds" => Ok(config.resync.interval_seconds.to_string()),
        "resync.watch" => Ok(config.resync.watch.to_string()),
        "report.intervalSeconds" => Ok(config.report.interval_seconds.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        "logger.file" => Ok(config.logger.file.clone().unwrap_or_default()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "namespace" => {
            config.namespace = value.to_string();
        }
        "resync.intervalSeconds" => {
            config.resync.interval_seconds = value
                .parse()
                .context("resync.intervalSeconds must be a number")?;
        }
        "resync.watch" => {
            config.resync.watch = value
                .parse()
                .context("resync.watch must be 'true' or 'false'")?;
        }
        "report.intervalSeconds" => {
            config.report.interval_seconds = value
                .parse()
                .context("report.intervalSeconds must be a number")?;
        }
        "logger.level" => {
            config.logger.level = value.to_string();
        }
        "logger.file" => {
            if value.is_empty() {
                config.logger.file = None;
            } else {
                config.logger.file = Some(value.to_string());
            }
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip_keys() {
        let mut config = Config::default();
        set_config_value(&mut config, "resync.intervalSeconds", "90").unwrap();
        set_config_value(&mut config, "logger.file", "/tmp/svcmap.log").unwrap();

        assert_eq!(get_config_value(&config, "resync.intervalSeconds").unwrap(), "90");
        assert_eq!(get_config_value(&config, "logger.file").unwrap(), "/tmp/svcmap.log");

        set_config_value(&mut config, "logger.file", "").unwrap();
        assert!(config.logger.file.is_none());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(set_config_value(&mut config, "resync.watch", "maybe").is_err());
        assert!(set_config_value(&mut config, "report.intervalSeconds", "-1").is_err());
        assert!(set_config_value(&mut config, "ui.skin", "dark").is_err());
        assert!(get_config_value(&config, "ui.skin").is_err());
    }
}
