//! # Storage Layer
//!
//! This module defines the persistence façade for mynotes. The [`Database`] trait is the only
//! thing the command layer knows about storage; three interchangeable implementations sit
//! behind it.
//!
//! ## Implementations
//!
//! - [`json_store::JsonDatabase`]: The whole store as one JSON document.
//!   - The document is loaded once and kept resident.
//!   - Every mutation rewrites the full document (write-to-temp, then rename).
//!   - Generic over a [`backend::DocumentBackend`], so tests run without a filesystem
//!     ([`mem_backend::MemBackend`]) and production uses [`fs_backend::FsBackend`].
//!
//! - [`sqlite::SqliteDatabase`]: Relational storage in three tables
//!   (`groups`, `notes`, `groups_notes`), one transaction per call.
//!
//! - [`surreal::SurrealDatabase`]: Document storage in two collections (`groups`, `notes`)
//!   where each note carries its group's id.
//!
//! ## Consistency Contract
//!
//! Callers must not be able to tell the backends apart. All of them:
//!
//! - Return groups and notes in creation order.
//! - Treat "not found" as an empty answer, never as an error. The one exception is
//!   [`Database::create_note`] into a group that does not exist, which fails with
//!   [`crate::error::NotesError::GroupNotFound`]. Renaming, deleting or updating something
//!   that is not there changes nothing.
//! - Reject a group title that another group already has, and a note title that any other
//!   note already has, with [`crate::error::NotesError::DuplicateTitle`]. A missing group
//!   is reported before a duplicate title.
//! - Cascade [`Database::delete_group`] to every note in the group, atomically.
//! - Stamp `creation_date == last_change_date` on create and refresh `last_change_date` on
//!   every [`Database::update_note`].
//! - Key everything on immutable ids, so [`Database::rename_group`] is a single write.
//!
//! Beyond title uniqueness the façade performs no validation: empty titles and selection
//! state are the command layer's job (see [`crate::commands`]).

use crate::error::Result;
use crate::listing::{grouped_listing, ListingLine};
use crate::model::{Note, NoteField, NoteId};

pub mod backend;
pub mod fs_backend;
pub mod json_store;
pub mod mem_backend;
pub mod sqlite;
pub mod surreal;

/// Abstract interface for note storage.
pub trait Database {
    /// Titles of all groups, in store order.
    fn get_all_groups(&self) -> Result<Vec<String>>;

    /// Titles of all notes across all groups, in store order.
    fn get_all_notes(&self) -> Result<Vec<String>>;

    /// Titles of the notes in `group`. Empty if the group is empty or unknown.
    fn get_attached_group_notes(&self, group: &str) -> Result<Vec<String>>;

    /// Whether a group with this title exists.
    fn check_group(&self, title: &str) -> Result<bool>;

    /// The note with this title, searched across the whole store.
    fn check_note(&self, title: &str) -> Result<Option<Note>>;

    /// Insert an empty group.
    fn create_group(&mut self, title: &str) -> Result<()>;

    /// Change a group's title. Its notes stay attached.
    fn rename_group(&mut self, old_title: &str, new_title: &str) -> Result<()>;

    /// Remove a group together with every note it contains.
    fn delete_group(&mut self, title: &str) -> Result<()>;

    /// Append a new note to `group` and return the stored record.
    fn create_note(&mut self, group: &str, title: &str, text: &str) -> Result<Note>;

    /// Replace the title or text of a note and refresh its change date.
    fn update_note(&mut self, group: &str, id: &NoteId, value: &str, field: NoteField)
        -> Result<()>;

    /// Remove a note from its group.
    fn delete_note(&mut self, group: &str, id: &NoteId) -> Result<()>;

    /// Groups and their notes flattened into display lines.
    fn get_grouped_notes(&self) -> Result<Vec<ListingLine>> {
        let mut groups = Vec::new();
        for title in self.get_all_groups()? {
            let notes = self.get_attached_group_notes(&title)?;
            groups.push((title, notes));
        }
        Ok(grouped_listing(groups))
    }
}

impl<D: Database + ?Sized> Database for Box<D> {
    fn get_all_groups(&self) -> Result<Vec<String>> {
        (**self).get_all_groups()
    }

    fn get_all_notes(&self) -> Result<Vec<String>> {
        (**self).get_all_notes()
    }

    fn get_attached_group_notes(&self, group: &str) -> Result<Vec<String>> {
        (**self).get_attached_group_notes(group)
    }

    fn check_group(&self, title: &str) -> Result<bool> {
        (**self).check_group(title)
    }

    fn check_note(&self, title: &str) -> Result<Option<Note>> {
        (**self).check_note(title)
    }

    fn create_group(&mut self, title: &str) -> Result<()> {
        (**self).create_group(title)
    }

    fn rename_group(&mut self, old_title: &str, new_title: &str) -> Result<()> {
        (**self).rename_group(old_title, new_title)
    }

    fn delete_group(&mut self, title: &str) -> Result<()> {
        (**self).delete_group(title)
    }

    fn create_note(&mut self, group: &str, title: &str, text: &str) -> Result<Note> {
        (**self).create_note(group, title, text)
    }

    fn update_note(
        &mut self,
        group: &str,
        id: &NoteId,
        value: &str,
        field: NoteField,
    ) -> Result<()> {
        (**self).update_note(group, id, value, field)
    }

    fn delete_note(&mut self, group: &str, id: &NoteId) -> Result<()> {
        (**self).delete_note(group, id)
    }

    fn get_grouped_notes(&self) -> Result<Vec<ListingLine>> {
        (**self).get_grouped_notes()
    }
}
