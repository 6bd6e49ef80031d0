//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::EmulatorConfig;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EmulatorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: EmulatorConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Create the source directories named in the configuration if absent.
pub fn ensure_source_dirs(config: &EmulatorConfig) -> Result<(), std::io::Error> {
    fs::create_dir_all(&config.sources.proto_dir)?;
    fs::create_dir_all(&config.sources.config_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[listener\nbind_address = broken").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn ensure_source_dirs_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EmulatorConfig::default();
        config.sources.proto_dir = dir.path().join("p").to_string_lossy().into_owned();
        config.sources.config_dir = dir.path().join("c").to_string_lossy().into_owned();
        ensure_source_dirs(&config).unwrap();
        assert!(dir.path().join("p").is_dir());
        assert!(dir.path().join("c").is_dir());
    }
}
