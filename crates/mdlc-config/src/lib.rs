//! `~/.config/mdlc/config.toml`.
//!
//! Every field has a default, so a missing file or a file with only some
//! keys still yields a usable [`Config`].

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_DIR: &str = "~/.config/mdlc";
const DATA_DIR: &str = "~/.local/share/mdlc";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted workspace (`files.json`, `blocks.json`, `images.json`)
    pub data_path: PathBuf,

    /// Force Apple (`true`) or Ctrl-based (`false`) shortcut matching;
    /// unset follows the host platform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apple_shortcuts: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: Self::default_data_path(),
            apple_shortcuts: None,
        }
    }
}

impl Config {
    pub fn new<P: Into<PathBuf>>(data_path: P) -> Self {
        Self {
            data_path: data_path.into(),
            ..Self::default()
        }
    }

    /// Read `path`, falling back to [`Config::default`] when it does not exist.
    /// `data_path` gets `~` and `$VAR` expansion.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.data_path = expand_path(&config.data_path);
        Ok(config)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    /// Write the config as TOML, creating the parent directory if needed
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        expand_path(Path::new(CONFIG_DIR)).join("config.toml")
    }

    pub fn default_data_path() -> PathBuf {
        expand_path(Path::new(DATA_DIR))
    }
}

/// Expand `~` and `$VAR`; paths that fail to expand are kept as written
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(&raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/mdlc/config.toml"));
    }

    #[test]
    fn test_default_data_path_is_expanded() {
        let path = Config::default_data_path();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with(".local/share/mdlc"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from_path(temp_dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data_path, Config::default_data_path());
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "apple_shortcuts = true\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap();

        assert_eq!(config.data_path, Config::default_data_path());
        assert_eq!(config.apple_shortcuts, Some(true));
    }

    #[test]
    fn test_apple_shortcuts_is_not_written_when_unset() {
        let toml_str = toml::to_string(&Config::new("/tmp/mdlc")).unwrap();
        assert!(toml_str.contains("data_path"));
        assert!(!toml_str.contains("apple_shortcuts"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = expand_path(Path::new("~/test/path"));

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_keeps_unexpandable_paths() {
        let path = Path::new("$MDLC_SURELY_UNSET_VAR/x");
        assert_eq!(expand_path(path), path.to_path_buf());
    }

    #[test]
    fn test_expand_path_leaves_plain_paths() {
        for raw in ["/absolute/path", "relative/path"] {
            assert_eq!(expand_path(Path::new(raw)), PathBuf::from(raw));
        }
    }

    #[test]
    fn test_load_invalid_toml_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "data_path = [").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_unreadable_path_is_a_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load_from_path(temp_dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            data_path: PathBuf::from("/tmp/mdlc-data"),
            apple_shortcuts: Some(false),
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_config_with_env_var_in_toml() {
        unsafe {
            env::set_var("MDLC_DATA_ROOT", "/custom/data");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, r#"data_path = "$MDLC_DATA_ROOT/mdlc""#).unwrap();

        let config = Config::load_from_path(&config_file).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/custom/data/mdlc"));

        unsafe {
            env::remove_var("MDLC_DATA_ROOT");
        }
    }
}
