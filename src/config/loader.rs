// Configuration loader
// Loads settings from ~/.citewright/config.toml with env-var fallbacks

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;

/// Load configuration from the default location, falling back to
/// environment variables for vendor keys.
///
/// A missing config file is not an error: vendor keys may come entirely
/// from the environment, and per-user keys from the credential store.
pub fn load_config() -> Result<Config> {
    let path = default_config_path()?;
    load_config_from(&path)
}

/// Load configuration from an explicit path (e.g., `--config` override).
pub fn load_config_from(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?
    } else {
        tracing::debug!("No config file at {}, using defaults", path.display());
        Config::default()
    };

    config.vendors = config.vendors.with_env_fallbacks();

    if config.vendors.is_empty() {
        tracing::warn!(
            "No fallback vendor keys configured; only users with their own \
             API keys will be able to generate statements"
        );
    }

    Ok(config)
}

fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".citewright").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.server.bind_address, super::super::constants::DEFAULT_HTTP_ADDR);
    }

    #[test]
    fn test_file_values_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(
            f,
            "default_model = \"gemini-2.0-flash\"\n[server]\nbind_address = \"0.0.0.0:9000\""
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.default_model, "gemini-2.0-flash");
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not [ valid toml").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
