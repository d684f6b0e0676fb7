//! # Configuration
//!
//! mynotes configuration is managed by [`confique`], which handles layered loading from a
//! TOML file and environment variables. The client applies its command-line flags on top.
//!
//! ## Resolution Order
//!
//! Highest priority first:
//! 1. **Command-line flags**: `--backend`, `--json-path`, ... (applied by the client).
//! 2. **Environment variables**: `MYNOTES_BACKEND`, `MYNOTES_JSON_PATH`, etc.
//! 3. **Config file**: `--config <path>`, or `mynotes.toml` in the OS config directory.
//! 4. **Compiled defaults**: `#[config(default = ...)]` and the OS data directory.
//!
//! ## Available Settings
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | `backend` | `MYNOTES_BACKEND` | `json` |
//! | `json.path` | `MYNOTES_JSON_PATH` | `<data>/notes.json` |
//! | `sqlite.path` | `MYNOTES_SQLITE_PATH` | `<data>/notes.sqlite3` |
//! | `surreal.endpoint` | `MYNOTES_SURREAL_ENDPOINT` | `surrealkv://<data>/notes.surrealkv` |
//! | `surreal.namespace` | `MYNOTES_SURREAL_NAMESPACE` | `mynotes` |
//! | `surreal.database` | `MYNOTES_SURREAL_DATABASE` | `notes` |
//! | `log.level` | `MYNOTES_LOG_LEVEL` | `debug` in debug builds, `info` otherwise |
//! | `log.dir` | `MYNOTES_LOG_DIR` | `<data>/logs` |
//!
//! `<data>` is the OS data directory (via the `directories` crate), or `MYNOTES_DATA_DIR`
//! when that is set.

use crate::error::{NotesError, Result};
use crate::logging::default_log_level;
use crate::store::surreal::{DEFAULT_DATABASE, DEFAULT_NAMESPACE};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "mynotes.toml";

/// Which storage technology backs the notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Json,
    Sqlite,
    Surreal,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "file" => Ok(BackendKind::Json),
            "sqlite" | "sql" => Ok(BackendKind::Sqlite),
            "surreal" | "surrealdb" | "document" => Ok(BackendKind::Surreal),
            other => Err(format!(
                "unsupported backend `{other}`; expected json|sqlite|surreal"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for BackendKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Json => "json",
            BackendKind::Sqlite => "sqlite",
            BackendKind::Surreal => "surreal",
        };
        f.write_str(name)
    }
}

/// Configuration for mynotes, stored in `mynotes.toml`.
#[derive(Config, Debug, Clone, PartialEq)]
pub struct NotesConfig {
    /// Storage backend: json, sqlite or surreal.
    #[config(env = "MYNOTES_BACKEND", default = "json")]
    pub backend: BackendKind,

    #[config(nested)]
    pub json: JsonConfig,

    #[config(nested)]
    pub sqlite: SqliteConfig,

    #[config(nested)]
    pub surreal: SurrealConfig,

    #[config(nested)]
    pub log: LogConfig,
}

#[derive(Config, Debug, Clone, PartialEq)]
pub struct JsonConfig {
    /// Path of the notes document.
    #[config(env = "MYNOTES_JSON_PATH")]
    pub path: Option<PathBuf>,
}

#[derive(Config, Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Path of the SQLite database file.
    #[config(env = "MYNOTES_SQLITE_PATH")]
    pub path: Option<PathBuf>,
}

#[derive(Config, Debug, Clone, PartialEq)]
pub struct SurrealConfig {
    /// Endpoint such as `mem://`, `surrealkv:///path/to/dir` or `ws://host:8000`.
    #[config(env = "MYNOTES_SURREAL_ENDPOINT")]
    pub endpoint: Option<String>,

    #[config(env = "MYNOTES_SURREAL_NAMESPACE", default = "mynotes")]
    pub namespace: String,

    #[config(env = "MYNOTES_SURREAL_DATABASE", default = "notes")]
    pub database: String,
}

#[derive(Config, Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// trace|debug|info|warn|error
    #[config(env = "MYNOTES_LOG_LEVEL")]
    pub level: Option<String>,

    /// Directory for rotated log files. Must be absolute.
    #[config(env = "MYNOTES_LOG_DIR")]
    pub dir: Option<PathBuf>,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Json,
            json: JsonConfig { path: None },
            sqlite: SqliteConfig { path: None },
            surreal: SurrealConfig {
                endpoint: None,
                namespace: DEFAULT_NAMESPACE.to_string(),
                database: DEFAULT_DATABASE.to_string(),
            },
            log: LogConfig {
                level: None,
                dir: None,
            },
        }
    }
}

impl NotesConfig {
    /// Loads environment variables layered over a config file.
    ///
    /// An explicit `path` must exist. Without one, `mynotes.toml` in the OS config directory
    /// is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(NotesError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                builder = builder.file(path);
            }
            None => {
                if let Some(default_path) = default_config_file() {
                    builder = builder.file(default_path);
                }
            }
        }
        builder
            .load()
            .map_err(|err| NotesError::Config(err.to_string()))
    }

    pub fn json_path(&self) -> Result<PathBuf> {
        match &self.json.path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("notes.json")),
        }
    }

    pub fn sqlite_path(&self) -> Result<PathBuf> {
        match &self.sqlite.path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("notes.sqlite3")),
        }
    }

    pub fn surreal_endpoint(&self) -> Result<String> {
        match &self.surreal.endpoint {
            Some(endpoint) => Ok(endpoint.clone()),
            None => Ok(format!(
                "surrealkv://{}",
                data_dir()?.join("notes.surrealkv").display()
            )),
        }
    }

    pub fn log_level(&self) -> String {
        self.log
            .level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string())
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.log.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("logs")),
        }
    }
}

/// Base directory for everything mynotes stores.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("MYNOTES_DATA_DIR") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    ProjectDirs::from("com", "mynotes", "mynotes")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| NotesError::Config("could not determine the data directory".to_string()))
}

fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("com", "mynotes", "mynotes")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = NotesConfig::default();
        assert_eq!(config.backend, BackendKind::Json);
        assert_eq!(config.surreal.namespace, "mynotes");
        assert_eq!(config.surreal.database, "notes");
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("JSON".parse::<BackendKind>(), Ok(BackendKind::Json));
        assert_eq!(" sqlite ".parse::<BackendKind>(), Ok(BackendKind::Sqlite));
        assert_eq!("surrealdb".parse::<BackendKind>(), Ok(BackendKind::Surreal));
        assert!("mongo".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_backend_kind_display_round_trip() {
        for kind in [BackendKind::Json, BackendKind::Sqlite, BackendKind::Surreal] {
            assert_eq!(kind.to_string().parse::<BackendKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_explicit_paths_win() {
        let config = NotesConfig {
            json: JsonConfig {
                path: Some(PathBuf::from("/tmp/a.json")),
            },
            sqlite: SqliteConfig {
                path: Some(PathBuf::from("/tmp/a.sqlite3")),
            },
            surreal: SurrealConfig {
                endpoint: Some("mem://".to_string()),
                ..NotesConfig::default().surreal
            },
            ..Default::default()
        };
        assert_eq!(config.json_path().unwrap(), PathBuf::from("/tmp/a.json"));
        assert_eq!(
            config.sqlite_path().unwrap(),
            PathBuf::from("/tmp/a.sqlite3")
        );
        assert_eq!(config.surreal_endpoint().unwrap(), "mem://");
    }

    #[test]
    fn test_log_level_falls_back_to_build_default() {
        let config = NotesConfig::default();
        assert_eq!(config.log_level(), default_log_level());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "backend = \"sqlite\"\n\n[sqlite]\npath = \"/tmp/notes.db\"\n\n[surreal]\nnamespace = \"work\"\n",
        )
        .unwrap();

        let config = NotesConfig::load(Some(&path)).unwrap();
        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.sqlite.path, Some(PathBuf::from("/tmp/notes.db")));
        assert_eq!(config.surreal.namespace, "work");
        assert_eq!(config.surreal.database, "notes");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = NotesConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, NotesError::Config(_)));
    }
}
