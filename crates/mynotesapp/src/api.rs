//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single entry point
//! for every mynotes operation, regardless of the UI in front of it.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns** the storage backend and the [`Session`]
//! - **Dispatches** to the matching function in [`crate::commands`]
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **I/O operations**: no stdout, stderr or prompts
//!
//! ## Generic Over Database
//!
//! `NotesApi<D: Database>` is generic over the storage backend:
//! - Production: `NotesApi<Box<dyn Database>>`, picked at startup from configuration
//! - Testing: `NotesApi<InMemoryDatabase>`

use crate::commands::{self, CmdResult, Session};
use crate::error::Result;
use crate::store::Database;

/// The main API facade for mynotes operations.
pub struct NotesApi<D: Database> {
    db: D,
    session: Session,
}

impl<D: Database> NotesApi<D> {
    pub fn new(db: D) -> Self {
        Self {
            db,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn database(&self) -> &D {
        &self.db
    }

    pub fn list_groups(&self) -> Result<CmdResult> {
        commands::groups::list(&self.db)
    }

    pub fn list_notes(&self) -> Result<CmdResult> {
        commands::listing::run(&self.db)
    }

    pub fn select_group(&mut self, title: &str) -> Result<CmdResult> {
        commands::groups::select(&self.db, &mut self.session, title)
    }

    pub fn create_group(&mut self, title: &str) -> Result<CmdResult> {
        commands::groups::create(&mut self.db, &mut self.session, title)
    }

    pub fn rename_group(&mut self, new_title: &str) -> Result<CmdResult> {
        commands::groups::rename(&mut self.db, &mut self.session, new_title)
    }

    /// Validates a group deletion without performing it.
    pub fn check_delete_group(&self, title: &str) -> Result<()> {
        commands::groups::check_delete(&self.db, title).map(|_| ())
    }

    pub fn delete_group(&mut self, title: &str) -> Result<CmdResult> {
        commands::groups::delete(&mut self.db, &mut self.session, title)
    }

    pub fn select_note(&mut self, title: &str) -> Result<CmdResult> {
        commands::notes::select(&self.db, &mut self.session, title)
    }

    /// Validates a new note title without creating anything.
    pub fn check_create_note(&self, title: &str) -> Result<()> {
        commands::notes::check_create(&self.db, &self.session, title).map(|_| ())
    }

    pub fn create_note(&mut self, title: &str, text: &str) -> Result<CmdResult> {
        commands::notes::create(&mut self.db, &mut self.session, title, text)
    }

    pub fn read_note(&self) -> Result<CmdResult> {
        commands::notes::read(&self.session)
    }

    pub fn note_info(&self) -> Result<CmdResult> {
        commands::notes::info(&self.session)
    }

    pub fn edit_note_text(&mut self, text: &str) -> Result<CmdResult> {
        commands::notes::edit_text(&mut self.db, &mut self.session, text)
    }

    pub fn edit_note_title(&mut self, new_title: &str) -> Result<CmdResult> {
        commands::notes::edit_title(&mut self.db, &mut self.session, new_title)
    }

    pub fn delete_note(&mut self) -> Result<CmdResult> {
        commands::notes::delete(&mut self.db, &mut self.session)
    }

    pub fn completions(&self) -> Result<CmdResult> {
        commands::listing::completions(&self.db, &self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingLine;
    use crate::store::json_store::InMemoryDatabase;

    fn api() -> NotesApi<InMemoryDatabase> {
        NotesApi::new(InMemoryDatabase::in_memory().unwrap())
    }

    #[test]
    fn session_starts_detached() {
        let api = api();
        assert!(api.session().group().is_none());
        assert!(api.session().note().is_none());
    }

    #[test]
    fn group_and_note_flow() {
        let mut api = api();
        api.create_group("Work").unwrap();
        api.create_note("Plan", "draft text").unwrap();
        assert_eq!(api.read_note().unwrap().note.unwrap().text, "draft text");

        api.edit_note_text("final").unwrap();
        api.rename_group("Projects").unwrap();

        let listing = api.list_notes().unwrap().listing;
        assert!(listing.contains(&ListingLine::Group("Projects".into())));
        assert!(listing.contains(&ListingLine::Note {
            position: 1,
            title: "Plan".into()
        }));

        api.delete_note().unwrap();
        assert!(api.read_note().is_err());
    }

    #[test]
    fn works_through_a_boxed_backend() {
        let boxed: Box<dyn Database> = Box::new(InMemoryDatabase::in_memory().unwrap());
        let mut api = NotesApi::new(boxed);
        api.create_group("Work").unwrap();
        assert_eq!(api.list_groups().unwrap().groups, vec!["Home", "Work"]);
        assert!(api.database().check_group("Work").unwrap());
    }
}
