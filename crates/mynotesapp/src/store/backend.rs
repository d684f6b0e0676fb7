use crate::error::Result;
use std::path::PathBuf;

/// Abstract interface for raw document I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while JsonDatabase handles the "what" (groups, notes, invariants).
pub trait DocumentBackend {
    /// Read the raw notes document.
    /// Returns Ok(None) if the document does not exist yet.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read_document(&self) -> Result<Option<String>>;

    /// Replace the notes document.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write_document(&self, content: &str) -> Result<()>;

    /// Where the document lives.
    /// For FsBackend, this is the real path. For MemBackend, a virtual path.
    fn location(&self) -> PathBuf;
}
