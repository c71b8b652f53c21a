// Configuration loading

use crate::error::{Result, ResultExt, TodoError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR: &str = "todo";
const CONFIG_FILE: &str = "config.yaml";

/// Which medium holds the task titles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Newline-delimited text file
    #[default]
    File,
    /// SQLite table `todos(title)`
    Sqlite,
}

impl Backend {
    fn default_file_name(self) -> &'static str {
        match self {
            Backend::File => "todos.txt",
            Backend::Sqlite => "todos.db",
        }
    }
}

/// How the text backend replaces its content on remove
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    /// Truncate the file in place, then write the survivors. A crash
    /// between the two steps loses every task.
    #[default]
    Truncate,
    /// Write the survivors to a temporary file and rename it over the original
    Atomic,
}

/// Settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    /// Backing file; defaults to `~/dev/todo/todos.txt` (or `todos.db`)
    pub path: Option<PathBuf>,
    pub color: bool,
    /// Take an advisory lock on the text file for each operation
    pub lock: bool,
    pub rewrite: RewriteMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::File,
            path: None,
            color: true,
            lock: false,
            rewrite: RewriteMode::Truncate,
        }
    }
}

impl Config {
    /// Default config file location: `<config dir>/todo/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).file_context(format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&content).map_err(|message| TodoError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load from `path` if given, otherwise from the default location
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    fn from_yaml(content: &str) -> std::result::Result<Self, String> {
        // An empty document deserializes as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Resolve the backing file location
    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let home = dirs::home_dir().ok_or_else(|| {
            TodoError::Validation("Cannot determine home directory; set a todo file path".to_string())
        })?;
        Ok(home.join("dev").join("todo").join(self.backend.default_file_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::File);
        assert!(config.color);
        assert!(!config.lock);
        assert_eq!(config.rewrite, RewriteMode::Truncate);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("absent.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "backend: sqlite\npath: /tmp/list.db\ncolor: false\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.path, Some(PathBuf::from("/tmp/list.db")));
        assert!(!config.color);
        assert_eq!(config.rewrite, RewriteMode::Truncate);
    }

    #[test]
    fn test_load_rewrite_and_lock() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "rewrite: atomic\nlock: true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.rewrite, RewriteMode::Atomic);
        assert!(config.lock);
    }

    #[test]
    fn test_load_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "").unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_malformed_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "backend: floppy\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, TodoError::Config { .. }));
    }

    #[test]
    fn test_data_path_prefers_explicit_path() {
        let config = Config {
            path: Some(PathBuf::from("/srv/todos.txt")),
            ..Config::default()
        };
        assert_eq!(config.data_path().unwrap(), PathBuf::from("/srv/todos.txt"));
    }

    #[test]
    fn test_data_path_default_file_name() {
        let config = Config {
            backend: Backend::Sqlite,
            ..Config::default()
        };
        if let Ok(path) = config.data_path() {
            assert!(path.ends_with("dev/todo/todos.db"));
        }
    }
}
