//! Configuration management for the CLI.
//!
//! The file lives at `~/.dutywise/config.toml` unless `--config` says
//! otherwise. Every table is optional; missing keys take their defaults.
//!
//! ```toml
//! [store]
//! database = "/var/lib/dutywise/reference.db"
//! cache_capacity = 512
//!
//! [output]
//! format = "json"
//! color = false
//!
//! [pipeline.settings]
//! min_trust_for_rates = 0.6
//!
//! [pipeline.qualifier]
//! share_tolerance = 0.1
//! ```

use crate::error::{CliError, Result};
use dutywise_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reference database settings
    pub store: StoreSettings,

    /// Output settings
    pub output: OutputSettings,

    /// Engine configuration
    pub pipeline: PipelineConfig,
}

/// Reference database settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Database path; defaults to `~/.dutywise/reference.db`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Exact-lookup cache entries (0 disables the cache)
    pub cache_capacity: usize,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database: None,
            cache_capacity: 256,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Directory holding the default config file, database and snapshots.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".dutywise"))
    }

    /// The config file path, honoring an explicit override.
    pub fn path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(Self::home()?.join("config.toml")),
        }
    }

    /// Load configuration from file, or the defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// The database path: the override, then the config value, then the default.
    pub fn database_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        match &self.store.database {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::home()?.join("reference.db")),
        }
    }

    /// Where `watch` keeps the snapshot for a code.
    pub fn snapshot_path(code: &str) -> Result<PathBuf> {
        Ok(Self::home()?.join("snapshots").join(format!("{}.json", code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.output.color);
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.store.cache_capacity, 256);
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [output]
            format = "json"

            [pipeline.settings]
            min_trust_for_rates = 0.8
            "#,
        )
        .unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.color);
        assert_eq!(config.pipeline.settings.min_trust_for_rates, 0.8);
        assert_eq!(config.pipeline.settings.min_candidate_confidence, 40.0);
        assert_eq!(config.store.cache_capacity, 256);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.store.database = Some(dir.path().join("ref.db"));
        config.output.color = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_database_override_wins() {
        let mut config = Config::default();
        config.store.database = Some(PathBuf::from("/from/config.db"));
        let path = config.database_path(Some(Path::new("/from/flag.db"))).unwrap();
        assert_eq!(path, PathBuf::from("/from/flag.db"));
        let path = config.database_path(None).unwrap();
        assert_eq!(path, PathBuf::from("/from/config.db"));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(matches!(
            Config::from_toml("[output]\nformat = \"yaml\""),
            Err(CliError::Toml(_))
        ));
    }
}
