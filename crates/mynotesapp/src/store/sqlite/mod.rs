//! Relational store on SQLite.
//!
//! # Responsibility
//! - Map groups and notes onto `groups`, `notes` and the `groups_notes` junction.
//! - Run every façade call inside one transaction; commit on success, roll back on any error.
//!
//! # Invariants
//! - Rows are keyed on immutable UUID text ids. A rename updates one row and never touches
//!   a foreign key.
//! - Deleting a group deletes its notes in the same transaction. The junction rows follow
//!   through `ON DELETE CASCADE`.
//! - Store order is the `position` column of each table.
//! - All user input is passed as bound parameters.

mod open;

pub use open::{open_db, open_db_in_memory, SCHEMA_VERSION};

use super::Database;
use crate::error::{NotesError, Result};
use crate::model::{GroupId, Note, NoteField, NoteId};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;

pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already bootstrapped connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `f` inside an immediate transaction.
    ///
    /// The transaction commits only when `f` succeeds. Any error rolls back every statement
    /// `f` executed and is returned unchanged.
    fn in_transaction<T>(
        &mut self,
        op: &str,
        f: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                debug!("event={} module=sqlite status=ok", op);
                Ok(value)
            }
            Err(err) => {
                warn!(
                    "event={} module=sqlite status=rollback error={}",
                    op, err
                );
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event={} module=sqlite status=error error_code=rollback_failed error={}",
                        op, rollback_err
                    );
                }
                Err(err)
            }
        }
    }
}

impl Database for SqliteDatabase {
    fn get_all_groups(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title FROM groups ORDER BY position ASC;")?;
        let mut rows = stmt.query([])?;
        let mut titles = Vec::new();
        while let Some(row) = rows.next()? {
            titles.push(row.get("title")?);
        }
        Ok(titles)
    }

    fn get_all_notes(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT n.title
             FROM notes n
             INNER JOIN groups_notes gn ON gn.note_id = n.id
             INNER JOIN groups g ON g.id = gn.group_id
             ORDER BY g.position ASC, n.position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut titles = Vec::new();
        while let Some(row) = rows.next()? {
            titles.push(row.get("title")?);
        }
        Ok(titles)
    }

    fn get_attached_group_notes(&self, group: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT n.title
             FROM notes n
             INNER JOIN groups_notes gn ON gn.note_id = n.id
             INNER JOIN groups g ON g.id = gn.group_id
             WHERE g.title = ?1
             ORDER BY n.position ASC;",
        )?;
        let mut rows = stmt.query([group])?;
        let mut titles = Vec::new();
        while let Some(row) = rows.next()? {
            titles.push(row.get("title")?);
        }
        Ok(titles)
    }

    fn check_group(&self, title: &str) -> Result<bool> {
        Ok(group_id(&self.conn, title)?.is_some())
    }

    fn check_note(&self, title: &str) -> Result<Option<Note>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, text, creation_date, last_change_date
                 FROM notes
                 WHERE title = ?1;",
                [title],
                |row| {
                    Ok(NoteRow {
                        id: row.get("id")?,
                        title: row.get("title")?,
                        text: row.get("text")?,
                        creation_date: row.get("creation_date")?,
                        last_change_date: row.get("last_change_date")?,
                    })
                },
            )
            .optional()?;
        row.map(NoteRow::into_note).transpose()
    }

    fn create_group(&mut self, title: &str) -> Result<()> {
        self.in_transaction("group_create", |tx| {
            if group_id(tx, title)?.is_some() {
                return Err(NotesError::DuplicateTitle(title.to_string()));
            }
            let position = next_position(tx, "groups")?;
            tx.execute(
                "INSERT INTO groups (id, title, position) VALUES (?1, ?2, ?3);",
                params![GroupId::generate().to_string(), title, position],
            )?;
            Ok(())
        })
    }

    fn rename_group(&mut self, old_title: &str, new_title: &str) -> Result<()> {
        self.in_transaction("group_rename", |tx| {
            if group_id(tx, old_title)?.is_none() || old_title == new_title {
                return Ok(());
            }
            if group_id(tx, new_title)?.is_some() {
                return Err(NotesError::DuplicateTitle(new_title.to_string()));
            }
            tx.execute(
                "UPDATE groups SET title = ?2 WHERE title = ?1;",
                params![old_title, new_title],
            )?;
            Ok(())
        })
    }

    fn delete_group(&mut self, title: &str) -> Result<()> {
        self.in_transaction("group_delete", |tx| {
            let Some(group_id) = group_id(tx, title)? else {
                return Ok(());
            };
            let notes = tx.execute(
                "DELETE FROM notes
                 WHERE id IN (SELECT note_id FROM groups_notes WHERE group_id = ?1);",
                [group_id.as_str()],
            )?;
            tx.execute("DELETE FROM groups WHERE id = ?1;", [group_id.as_str()])?;
            debug!(
                "event=group_delete module=sqlite status=cascade notes_deleted={}",
                notes
            );
            Ok(())
        })
    }

    fn create_note(&mut self, group: &str, title: &str, text: &str) -> Result<Note> {
        let note = Note::new(title, text);
        self.in_transaction("note_create", |tx| {
            let group_id =
                group_id(tx, group)?.ok_or_else(|| NotesError::GroupNotFound(group.to_string()))?;
            if note_id_by_title(tx, title)?.is_some() {
                return Err(NotesError::DuplicateTitle(title.to_string()));
            }
            let position = next_position(tx, "notes")?;
            let note_id = note.id.to_string();
            tx.execute(
                "INSERT INTO notes (id, title, text, creation_date, last_change_date, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    note_id,
                    note.title,
                    note.text,
                    format_timestamp(&note.creation_date),
                    format_timestamp(&note.last_change_date),
                    position
                ],
            )?;
            tx.execute(
                "INSERT INTO groups_notes (group_id, note_id) VALUES (?1, ?2);",
                params![group_id, note_id],
            )?;
            Ok(())
        })?;
        Ok(note)
    }

    fn update_note(
        &mut self,
        group: &str,
        id: &NoteId,
        value: &str,
        field: NoteField,
    ) -> Result<()> {
        self.in_transaction("note_update", |tx| {
            let Some(mut note) = note_in_group(tx, group, id)? else {
                return Ok(());
            };
            if field == NoteField::Title {
                if let Some(other) = note_id_by_title(tx, value)? {
                    if other != id.to_string() {
                        return Err(NotesError::DuplicateTitle(value.to_string()));
                    }
                }
            }
            note.apply(field, value);
            tx.execute(
                "UPDATE notes SET title = ?2, text = ?3, last_change_date = ?4 WHERE id = ?1;",
                params![
                    note.id.to_string(),
                    note.title,
                    note.text,
                    format_timestamp(&note.last_change_date)
                ],
            )?;
            Ok(())
        })
    }

    fn delete_note(&mut self, group: &str, id: &NoteId) -> Result<()> {
        self.in_transaction("note_delete", |tx| {
            tx.execute(
                "DELETE FROM notes
                 WHERE id = ?2
                   AND id IN (
                       SELECT gn.note_id
                       FROM groups_notes gn
                       INNER JOIN groups g ON g.id = gn.group_id
                       WHERE g.title = ?1
                   );",
                params![group, id.to_string()],
            )?;
            Ok(())
        })
    }
}

struct NoteRow {
    id: String,
    title: String,
    text: String,
    creation_date: String,
    last_change_date: String,
}

impl NoteRow {
    fn into_note(self) -> Result<Note> {
        Ok(Note {
            id: parse_note_id(&self.id)?,
            title: self.title,
            text: self.text,
            creation_date: parse_timestamp(&self.creation_date, "notes.creation_date")?,
            last_change_date: parse_timestamp(&self.last_change_date, "notes.last_change_date")?,
        })
    }
}

fn group_id(conn: &Connection, title: &str) -> Result<Option<String>> {
    let id = conn
        .query_row("SELECT id FROM groups WHERE title = ?1;", [title], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(id)
}

fn note_id_by_title(conn: &Connection, title: &str) -> Result<Option<String>> {
    let id = conn
        .query_row("SELECT id FROM notes WHERE title = ?1;", [title], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(id)
}

fn note_in_group(conn: &Connection, group: &str, id: &NoteId) -> Result<Option<Note>> {
    let row = conn
        .query_row(
            "SELECT n.id, n.title, n.text, n.creation_date, n.last_change_date
             FROM notes n
             INNER JOIN groups_notes gn ON gn.note_id = n.id
             INNER JOIN groups g ON g.id = gn.group_id
             WHERE g.title = ?1 AND n.id = ?2;",
            params![group, id.to_string()],
            |row| {
                Ok(NoteRow {
                    id: row.get("id")?,
                    title: row.get("title")?,
                    text: row.get("text")?,
                    creation_date: row.get("creation_date")?,
                    last_change_date: row.get("last_change_date")?,
                })
            },
        )
        .optional()?;
    row.map(NoteRow::into_note).transpose()
}

/// Next value of the `position` column. `table` is always one of our own table names.
fn next_position(conn: &Connection, table: &'static str) -> Result<i64> {
    let position = conn.query_row(
        &format!("SELECT COALESCE(MAX(position), 0) + 1 FROM {};", table),
        [],
        |row| row.get(0),
    )?;
    Ok(position)
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str, column: &'static str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| NotesError::InvalidData(format!("invalid timestamp `{value}` in {column}")))
}

fn parse_note_id(value: &str) -> Result<NoteId> {
    NoteId::parse(value)
        .ok_or_else(|| NotesError::InvalidData(format!("invalid uuid `{value}` in notes.id")))
}
