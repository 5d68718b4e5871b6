//! # Configuration
//!
//! Store settings live in `<root>/config.json`. Missing keys fall back to
//! compiled defaults, and a missing file means "all defaults".
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `file_ext` | `.json` | Extension of project files |
//! | `id_offset` | `100000` | Seed for the id counter of an empty store |
//! | `commit_mode` | `atomic` | `atomic` or `legacy` write path |
//! | `evict_on_delete` | `false` | Drop cache entries when a project is deleted |
//!
//! The root directory itself comes from [`StorePaths`].

use crate::error::{Result, StoreError};
use crate::ids::DEFAULT_ID_OFFSET;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILENAME: &str = "config.json";
const PROJECTS_DIRNAME: &str = "projects";
const DEFAULT_FILE_EXT: &str = ".json";

/// Environment variable overriding the data root.
pub const HOME_ENV: &str = "PROJSTORE_HOME";

/// How the write path commits staged records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitMode {
    /// Per-call staging files, promoted with a rename over the target.
    #[default]
    Atomic,
    /// Shared staging files named after the reserved ids. Creates write the
    /// final file in place and updates delete the old file before renaming,
    /// which leaves a window where the record exists only in staging.
    Legacy,
}

impl fmt::Display for CommitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitMode::Atomic => write!(f, "atomic"),
            CommitMode::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for CommitMode {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "atomic" => Ok(CommitMode::Atomic),
            "legacy" => Ok(CommitMode::Legacy),
            other => Err(StoreError::Config(format!("Unknown commit mode: {}", other))),
        }
    }
}

/// Configuration for the store, stored in `<root>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    #[serde(default = "default_file_ext")]
    pub file_ext: String,

    #[serde(default = "default_id_offset")]
    pub id_offset: u64,

    #[serde(default)]
    pub commit_mode: CommitMode,

    #[serde(default)]
    pub evict_on_delete: bool,
}

fn default_file_ext() -> String {
    DEFAULT_FILE_EXT.to_string()
}

fn default_id_offset() -> u64 {
    DEFAULT_ID_OFFSET
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file_ext: default_file_ext(),
            id_offset: DEFAULT_ID_OFFSET,
            commit_mode: CommitMode::default(),
            evict_on_delete: false,
        }
    }
}

impl StoreConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(StoreError::Io)?;
        let mut config: StoreConfig =
            serde_json::from_str(&content).map_err(StoreError::Serialization)?;
        let ext = config.file_ext.clone();
        config.set_file_ext(&ext);
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(StoreError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(StoreError::Serialization)?;
        fs::write(config_path, content).map_err(StoreError::Io)?;
        Ok(())
    }

    pub fn file_ext(&self) -> &str {
        &self.file_ext
    }

    /// Set the file extension (normalizes to start with a dot)
    pub fn set_file_ext(&mut self, ext: &str) {
        if ext.starts_with('.') {
            self.file_ext = ext.to_string();
        } else {
            self.file_ext = format!(".{}", ext);
        }
    }

    /// Read a setting by its CLI name.
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "file-ext" => Ok(self.file_ext.clone()),
            "id-offset" => Ok(self.id_offset.to_string()),
            "commit-mode" => Ok(self.commit_mode.to_string()),
            "evict-on-delete" => Ok(self.evict_on_delete.to_string()),
            other => Err(StoreError::Config(format!("Unknown config key: {}", other))),
        }
    }

    /// Update a setting by its CLI name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "file-ext" => self.set_file_ext(value),
            "id-offset" => {
                self.id_offset = value
                    .parse()
                    .map_err(|_| StoreError::Config(format!("Invalid id offset: {}", value)))?
            }
            "commit-mode" => self.commit_mode = value.parse()?,
            "evict-on-delete" => {
                self.evict_on_delete = value
                    .parse()
                    .map_err(|_| StoreError::Config(format!("Expected true/false: {}", value)))?
            }
            other => return Err(StoreError::Config(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["file-ext", "id-offset", "commit-mode", "evict-on-delete"]
    }
}

/// Where the store keeps its files.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the root: explicit override, then `PROJSTORE_HOME`, then the
    /// OS data directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = explicit {
            return Ok(Self::new(root));
        }
        if let Some(home) = std::env::var_os(HOME_ENV) {
            return Ok(Self::new(PathBuf::from(home)));
        }
        let dirs = ProjectDirs::from("com", "projstore", "projstore").ok_or_else(|| {
            StoreError::Config("Could not determine a data directory".to_string())
        })?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn config_dir(&self) -> &Path {
        &self.root
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIRNAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.file_ext, ".json");
        assert_eq!(config.id_offset, 100_000);
        assert_eq!(config.commit_mode, CommitMode::Atomic);
        assert!(!config.evict_on_delete);
    }

    #[test]
    fn test_set_file_ext_without_dot() {
        let mut config = StoreConfig::default();
        config.set_file_ext("xml");
        assert_eq!(config.file_ext(), ".xml");
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut config = StoreConfig::default();
        config.set("commit-mode", "legacy").unwrap();
        config.set("id-offset", "5000").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.commit_mode, CommitMode::Legacy);
        assert_eq!(loaded.id_offset, 5000);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"file_ext": "xml"}"#).unwrap();

        let loaded = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.file_ext, ".xml");
        assert_eq!(loaded.id_offset, 100_000);
        assert_eq!(loaded.commit_mode, CommitMode::Atomic);
    }

    #[test]
    fn test_get_and_set_by_key() {
        let mut config = StoreConfig::default();
        config.set("evict-on-delete", "true").unwrap();
        assert_eq!(config.get("evict-on-delete").unwrap(), "true");
        assert!(config.set("id-offset", "lots").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert!(config.get("colour").is_err());
    }

    #[test]
    fn test_commit_mode_parse() {
        assert_eq!("ATOMIC".parse::<CommitMode>().unwrap(), CommitMode::Atomic);
        assert!("fast".parse::<CommitMode>().is_err());
    }

    #[test]
    fn test_paths_layout() {
        let paths = StorePaths::resolve(Some(PathBuf::from("/data/ps"))).unwrap();
        assert_eq!(paths.config_dir(), Path::new("/data/ps"));
        assert_eq!(paths.projects_dir(), PathBuf::from("/data/ps/projects"));
    }
}
