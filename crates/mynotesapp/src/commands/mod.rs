//! # Command Layer
//!
//! This module contains the **application logic** of mynotes: the checks a request must pass
//! before it reaches storage, and the session state that says which group and note the user
//! is working on.
//!
//! ## Role and Responsibilities
//!
//! - Validate every request (non-empty titles, existence, duplicates, selection state).
//!   The [`crate::store::Database`] façade assumes valid input and checks nothing.
//! - Keep the [`Session`] in step with storage (attach, re-attach after a rename, detach
//!   after a delete).
//! - Return structured [`CmdResult`] values. Commands are UI-agnostic.
//!
//! ## What Commands Do NOT Do
//!
//! - **Any I/O**: no stdout, no prompts, no screen clearing.
//! - **Confirmation**: destructive commands run when called; asking first is the client's job.
//!
//! ## Errors
//!
//! A request that fails validation returns [`NotesError::Api`] carrying the message to show.
//! Storage faults pass through unchanged.
//!
//! ## Testing Strategy
//!
//! Command tests use [`crate::store::json_store::InMemoryDatabase`] so they never touch the
//! filesystem. Backend behavior is covered by the store tests and the contract suite.
//!
//! ## Command Modules
//!
//! - [`groups`]: list, select, create, rename and delete groups
//! - [`notes`]: select, create, read, edit and delete notes
//! - [`listing`]: grouped listing and completion candidates

use crate::error::{NotesError, Result};
use crate::listing::ListingLine;
use crate::model::Note;
use crate::store::Database;
use serde::Serialize;

pub mod groups;
pub mod listing;
pub mod notes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub messages: Vec<CmdMessage>,
    /// Group titles, for `groups`.
    pub groups: Vec<String>,
    /// Display lines, for `notes`.
    pub listing: Vec<ListingLine>,
    /// The note a command selected, created or read.
    pub note: Option<Note>,
    /// Words the client may offer as completions.
    pub completions: Vec<String>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_listing(mut self, listing: Vec<ListingLine>) -> Self {
        self.listing = listing;
        self
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.note = Some(note);
        self
    }
}

/// Which group and note the user is working on.
///
/// Commands that act on "the current note" read it from here. A note is only ever
/// attached while its group is attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    group: Option<String>,
    note: Option<Note>,
}

impl Session {
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn note(&self) -> Option<&Note> {
        self.note.as_ref()
    }

    /// Attaches `title` and drops any attached note.
    pub(crate) fn attach_group(&mut self, title: impl Into<String>) {
        self.group = Some(title.into());
        self.note = None;
    }

    pub(crate) fn detach_group(&mut self) {
        self.group = None;
        self.note = None;
    }

    /// Renames the attached group in place, keeping the attached note.
    pub(crate) fn retitle_group(&mut self, title: impl Into<String>) {
        self.group = Some(title.into());
    }

    pub(crate) fn attach_note(&mut self, note: Note) {
        self.note = Some(note);
    }

    pub(crate) fn detach_note(&mut self) {
        self.note = None;
    }
}

fn invalid(message: impl Into<String>) -> NotesError {
    NotesError::Api(message.into())
}

/// Trims `title` and rejects it when nothing is left.
pub(crate) fn require_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(invalid("Title shouldn't be empty"));
    }
    Ok(title)
}

pub(crate) fn require_group(session: &Session) -> Result<String> {
    session
        .group()
        .map(str::to_string)
        .ok_or_else(|| invalid("No group selected"))
}

pub(crate) fn require_note(session: &Session) -> Result<Note> {
    session
        .note()
        .cloned()
        .ok_or_else(|| invalid("No note selected"))
}

pub(crate) fn require_existing_group<D: Database + ?Sized>(db: &D, title: &str) -> Result<()> {
    if !db.check_group(title)? {
        return Err(invalid(format!("Group '{}' doesn't exist", title)));
    }
    Ok(())
}

pub(crate) fn require_unused_group<D: Database + ?Sized>(db: &D, title: &str) -> Result<()> {
    if db.check_group(title)? {
        return Err(invalid(format!("Group '{}' already exists", title)));
    }
    Ok(())
}

/// Note titles are unique across the whole store, not only inside one group.
pub(crate) fn require_unused_note<D: Database + ?Sized>(db: &D, title: &str) -> Result<()> {
    if db.check_note(title)?.is_some() {
        return Err(invalid(format!("Note '{}' already exists", title)));
    }
    Ok(())
}
