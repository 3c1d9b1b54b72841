//! Configuration path resolution
//!
//! Platform config directory from `directories`, overridable with
//! SVCMAP_CONFIG_DIR.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path
///
/// SVCMAP_CONFIG_DIR wins; otherwise the platform config directory
/// (`$XDG_CONFIG_HOME/svcmap` on Linux), or `./.svcmap` without a home.
pub fn config_dir() -> PathBuf {
    std::env::var("SVCMAP_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            ProjectDirs::from("", "", "svcmap")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".svcmap"))
        })
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_config_path_file_name() {
        assert!(root_config_path().ends_with("config.yaml"));
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Existing directory is fine
        ensure_dir(&nested).unwrap();
    }
}
