use super::backend::DocumentBackend;
use crate::error::{NotesError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Keeps the notes document in a single file on disk.
pub struct FsBackend {
    path: PathBuf,
}

impl FsBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(NotesError::Io)?;
            }
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("notes.json");
        self.path
            .with_file_name(format!(".{}-{}.tmp", name, Uuid::new_v4()))
    }
}

impl DocumentBackend for FsBackend {
    fn read_document(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(NotesError::Io(err)),
        }
    }

    fn write_document(&self, content: &str) -> Result<()> {
        self.ensure_parent()?;

        // Atomic write
        let tmp_path = self.tmp_path();
        if let Err(err) = fs::write(&tmp_path, content) {
            let _ = fs::remove_file(&tmp_path);
            return Err(NotesError::Persist(format!(
                "{}: {}",
                self.path.display(),
                err
            )));
        }
        fs::rename(&tmp_path, &self.path).map_err(|err| {
            let _ = fs::remove_file(&tmp_path);
            NotesError::Persist(format!("{}: {}", self.path.display(), err))
        })?;

        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let backend = FsBackend::new(dir.path().join("notes.json"));
        assert!(backend.read_document().unwrap().is_none());
    }

    #[test]
    fn write_creates_parent_and_leaves_no_tmp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.json");
        let backend = FsBackend::new(&path);

        backend.write_document("{}").unwrap();
        backend.write_document("{\"a\":1}").unwrap();

        assert_eq!(backend.read_document().unwrap().unwrap(), "{\"a\":1}");
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_into_unwritable_location_is_persist_error() {
        let dir = tempdir().unwrap();
        // A regular file cannot act as a parent directory
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let backend = FsBackend::new(blocker.join("notes.json"));

        let err = backend.write_document("{}").unwrap_err();
        assert!(matches!(err, NotesError::Io(_) | NotesError::Persist(_)));
    }
}
