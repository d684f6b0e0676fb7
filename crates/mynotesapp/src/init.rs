//! # Backend Selection
//!
//! Turns a [`NotesConfig`] into a ready [`NotesApi`]. The three backends are interchangeable;
//! the client never names a concrete type and holds a `Box<dyn Database>`.
//!
//! ## File-backed Load Faults
//!
//! Opening the file-backed store can fail in three distinct ways:
//! - [`NotesError::StoreMissing`]: no document yet
//! - [`NotesError::StoreEmpty`]: the document has no content
//! - [`NotesError::StoreMalformed`]: the document does not parse
//!
//! [`open_backend`] returns these unchanged. The client decides whether to recover by
//! calling [`initialize_json`], which writes the default document, or to give up.

use crate::api::NotesApi;
use crate::config::{BackendKind, NotesConfig};
use crate::error::Result;
use crate::store::fs_backend::FsBackend;
use crate::store::json_store::JsonDatabase;
use crate::store::sqlite::SqliteDatabase;
use crate::store::surreal::SurrealDatabase;
use crate::store::Database;
use log::info;
use std::path::Path;

pub struct NotesContext {
    pub api: NotesApi<Box<dyn Database>>,
    pub config: NotesConfig,
    /// Human-readable description of where the notes live.
    pub location: String,
}

/// Opens the configured backend and wraps it in a [`NotesContext`].
pub fn initialize(config: NotesConfig) -> Result<NotesContext> {
    let db = open_backend(&config)?;
    context(db, config)
}

/// Wraps an already opened backend.
pub fn context(db: Box<dyn Database>, config: NotesConfig) -> Result<NotesContext> {
    let location = describe_location(&config)?;
    info!(
        "event=backend_ready module=init status=ok backend={} location={}",
        config.backend, location
    );
    Ok(NotesContext {
        api: NotesApi::new(db),
        config,
        location,
    })
}

/// Opens whichever backend `config` selects.
pub fn open_backend(config: &NotesConfig) -> Result<Box<dyn Database>> {
    match config.backend {
        BackendKind::Json => {
            let db = JsonDatabase::load(FsBackend::new(config.json_path()?))?;
            Ok(Box::new(db))
        }
        BackendKind::Sqlite => Ok(Box::new(SqliteDatabase::open(config.sqlite_path()?)?)),
        BackendKind::Surreal => {
            let endpoint = config.surreal_endpoint()?;
            ensure_local_parent(&endpoint)?;
            let db = SurrealDatabase::connect(
                &endpoint,
                &config.surreal.namespace,
                &config.surreal.database,
            )?;
            Ok(Box::new(db))
        }
    }
}

/// Writes the default notes document, replacing whatever is at the configured path.
pub fn initialize_json(config: &NotesConfig) -> Result<Box<dyn Database>> {
    let db = JsonDatabase::initialize(FsBackend::new(config.json_path()?))?;
    Ok(Box::new(db))
}

pub fn describe_location(config: &NotesConfig) -> Result<String> {
    let location = match config.backend {
        BackendKind::Json => config.json_path()?.display().to_string(),
        BackendKind::Sqlite => config.sqlite_path()?.display().to_string(),
        BackendKind::Surreal => config.surreal_endpoint()?,
    };
    Ok(location)
}

/// Creates the parent directory of a `surrealkv://` store.
fn ensure_local_parent(endpoint: &str) -> Result<()> {
    if let Some(path) = endpoint.strip_prefix("surrealkv://") {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JsonConfig, SqliteConfig, SurrealConfig};
    use crate::error::NotesError;
    use tempfile::tempdir;

    fn json_config(path: &Path) -> NotesConfig {
        NotesConfig {
            json: JsonConfig {
                path: Some(path.to_path_buf()),
            },
            ..NotesConfig::default()
        }
    }

    #[test]
    fn json_missing_then_initialized() {
        let dir = tempdir().unwrap();
        let config = json_config(&dir.path().join("notes.json"));

        let err = open_backend(&config).err().unwrap();
        assert!(matches!(err, NotesError::StoreMissing(_)));

        initialize_json(&config).unwrap();
        let db = open_backend(&config).unwrap();
        assert_eq!(db.get_all_groups().unwrap(), vec!["Home"]);
    }

    #[test]
    fn json_empty_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "").unwrap();

        let err = open_backend(&json_config(&path)).err().unwrap();
        assert!(matches!(err, NotesError::StoreEmpty(_)));
    }

    #[test]
    fn sqlite_backend_opens_and_persists() {
        let dir = tempdir().unwrap();
        let config = NotesConfig {
            backend: BackendKind::Sqlite,
            sqlite: SqliteConfig {
                path: Some(dir.path().join("data").join("notes.sqlite3")),
            },
            ..NotesConfig::default()
        };

        {
            let mut ctx = initialize(config.clone()).unwrap();
            ctx.api.create_group("Work").unwrap();
        }
        let ctx = initialize(config).unwrap();
        assert_eq!(ctx.api.list_groups().unwrap().groups, vec!["Home", "Work"]);
    }

    #[test]
    fn surreal_backend_in_memory() {
        let config = NotesConfig {
            backend: BackendKind::Surreal,
            surreal: SurrealConfig {
                endpoint: Some("mem://".to_string()),
                ..NotesConfig::default().surreal
            },
            ..NotesConfig::default()
        };
        let ctx = initialize(config).unwrap();
        assert_eq!(ctx.location, "mem://");
        assert_eq!(ctx.api.list_groups().unwrap().groups, vec!["Home"]);
    }
}
