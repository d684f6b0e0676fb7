use super::backend::DocumentBackend;
use crate::error::{NotesError, Result};
use std::cell::RefCell;
use std::path::PathBuf;

/// In-memory document backend for testing.
///
/// Uses `RefCell` for interior mutability since mynotes is single-threaded.
pub struct MemBackend {
    document: RefCell<Option<String>>,
    writes: RefCell<usize>,
    simulate_write_error: RefCell<bool>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self {
            document: RefCell::new(None),
            writes: RefCell::new(0),
            simulate_write_error: RefCell::new(false),
        }
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an existing document, as if read from disk.
    pub fn with_document(content: impl Into<String>) -> Self {
        let backend = Self::default();
        *backend.document.borrow_mut() = Some(content.into());
        backend
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl DocumentBackend for MemBackend {
    fn read_document(&self) -> Result<Option<String>> {
        Ok(self.document.borrow().clone())
    }

    fn write_document(&self, content: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(NotesError::Persist("Simulated write error".to_string()));
        }
        *self.document.borrow_mut() = Some(content.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("memory://notes.json")
    }
}
