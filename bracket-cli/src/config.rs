//! Config file loading and creation
//!
//! Config lives at `~/.config/bracket/config.toml`. Every field is optional
//! and command-line flags win over it.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub batch_size: Option<usize>,
    pub role: Option<String>,
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<usize>,
    pub temperature: Option<f64>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# bracket configuration
# All values here can be overridden by command-line flags.

# OpenAI-compatible API endpoint
# endpoint = \"https://api.cerebras.ai\"

# Model ID
# model = \"qwen-3-32b\"

# API key: use BRACKET_API_KEY (or OPENAI_API_KEY) or --api-key (not stored here)

# Pairs per oracle call (must be even)
# batch_size = 4

# Role candidates are judged for
# role = \"software engineering\"

# Batches judged at once
# concurrency = 1

# Per-request timeout in seconds
# timeout_secs = 60

# Extra attempts after a network error, 429 or 5xx
# max_retries = 2

# Sampling temperature (left to the server when unset)
# temperature = 0.6
";

/// Default config path: `~/.config/bracket/config.toml`
pub fn config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("bracket").join("config.toml"))
}

/// Load config from a file. A missing file gives the empty default.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(e) => Err(e).with_context(|| format!("failed to read config at {}", path.display())),
    }
}

/// Write the commented default config. Errors if the file already exists.
pub fn create_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("config file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write config to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_load_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = \"llama\"\nbatch_size = 8\nconcurrency = 4\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.model.as_deref(), Some("llama"));
        assert_eq!(config.batch_size, Some(8));
        assert_eq!(config.concurrency, Some(4));
        assert_eq!(config.endpoint, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "batchsize = 8\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_default_template_parses_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        create_default_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), FileConfig::default());
        assert!(create_default_config(&path).is_err());
    }
}
