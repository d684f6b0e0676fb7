//! Document store on SurrealDB.
//!
//! Two collections, `groups` and `notes`. Each document carries its own `uid` (the
//! [`GroupId`]/[`NoteId`] text) and a `seq` counter that fixes store order. A note points
//! at its group through `group_id`, which holds the group's `uid`, so renaming a group is a
//! single write to `groups`.
//!
//! Deleting a group touches both collections and runs as one SurrealDB transaction.
//!
//! The façade is synchronous. The store owns a current-thread Tokio runtime and blocks on
//! each query. Endpoints go through the `any` engine: `mem://` for tests,
//! `surrealkv://<path>` for a local persistent store and `ws://`/`wss://` for a server.

use super::Database;
use crate::error::{NotesError, Result};
use crate::model::{GroupId, Note, NoteField, NoteId, DEFAULT_GROUP};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::future::Future;
use std::time::Instant;
use surrealdb::engine::any::{self, Any};
use surrealdb::Surreal;
use tokio::runtime::{Builder, Runtime};

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "mynotes";
/// Database used when none is configured.
pub const DEFAULT_DATABASE: &str = "notes";

pub struct SurrealDatabase {
    db: Surreal<Any>,
    rt: Runtime,
}

#[derive(Debug, Deserialize)]
struct GroupDoc {
    uid: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct NoteUidDoc {
    uid: String,
}

#[derive(Debug, Deserialize)]
struct NoteTitleDoc {
    title: String,
    group_id: String,
}

#[derive(Debug, Deserialize)]
struct NoteDoc {
    uid: String,
    title: String,
    text: String,
    creation_date: String,
    last_change_date: String,
}

#[derive(Debug, Deserialize)]
struct SeqDoc {
    seq: i64,
}

#[derive(Debug, Deserialize)]
struct BootstrapDoc {
    #[allow(dead_code)]
    seeded_at: String,
}

impl NoteDoc {
    fn into_note(self) -> Result<Note> {
        Ok(Note {
            id: NoteId::parse(&self.uid).ok_or_else(|| {
                NotesError::InvalidData(format!("invalid uuid `{}` in notes.uid", self.uid))
            })?,
            title: self.title,
            text: self.text,
            creation_date: parse_timestamp(&self.creation_date, "notes.creation_date")?,
            last_change_date: parse_timestamp(&self.last_change_date, "notes.last_change_date")?,
        })
    }
}

impl SurrealDatabase {
    /// Connects to `endpoint`, selects the namespace and database, and seeds the default
    /// group the first time the database is used.
    pub fn connect(endpoint: &str, namespace: &str, database: &str) -> Result<Self> {
        let started_at = Instant::now();
        info!("event=db_open module=surreal status=start endpoint={}", endpoint);

        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| NotesError::Runtime(e.to_string()))?;

        let connected = rt.block_on(async {
            let db = any::connect(endpoint).await?;
            db.use_ns(namespace).use_db(database).await?;
            Ok::<_, surrealdb::Error>(db)
        });
        let db = match connected {
            Ok(db) => db,
            Err(err) => {
                error!(
                    "event=db_open module=surreal status=error endpoint={} duration_ms={} error_code=db_open_failed error={}",
                    endpoint,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        let store = Self { db, rt };
        if let Err(err) = store.bootstrap() {
            error!(
                "event=db_open module=surreal status=error endpoint={} duration_ms={} error_code=db_bootstrap_failed error={}",
                endpoint,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }

        info!(
            "event=db_open module=surreal status=ok endpoint={} duration_ms={}",
            endpoint,
            started_at.elapsed().as_millis()
        );
        Ok(store)
    }

    /// A private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::connect("mem://", DEFAULT_NAMESPACE, DEFAULT_DATABASE)
    }

    /// Drives one unit of work to completion on the owned runtime.
    fn block_on<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        self.rt.block_on(work)
    }

    fn bootstrap(&self) -> Result<()> {
        self.block_on(async {
            let marker: Vec<BootstrapDoc> = self
                .db
                .query("SELECT seeded_at FROM meta:bootstrap;")
                .await?
                .check()?
                .take(0)?;
            if !marker.is_empty() {
                return Ok(());
            }

            self.db
                .query(
                    "BEGIN TRANSACTION;
                     CREATE groups SET uid = $uid, title = $title, seq = 1;
                     CREATE meta:bootstrap SET seeded_at = $now;
                     COMMIT TRANSACTION;",
                )
                .bind(("uid", GroupId::generate().to_string()))
                .bind(("title", DEFAULT_GROUP.to_string()))
                .bind(("now", format_timestamp(&Utc::now())))
                .await?
                .check()?;
            info!("event=db_seed module=surreal status=ok group={}", DEFAULT_GROUP);
            Ok(())
        })
    }

    async fn groups(&self) -> Result<Vec<GroupDoc>> {
        let groups: Vec<GroupDoc> = self
            .db
            .query("SELECT uid, title, seq FROM groups ORDER BY seq ASC;")
            .await?
            .check()?
            .take(0)?;
        Ok(groups)
    }

    async fn group_uid(&self, title: &str) -> Result<Option<String>> {
        let found: Vec<GroupDoc> = self
            .db
            .query("SELECT uid, title FROM groups WHERE title = $title LIMIT 1;")
            .bind(("title", title.to_string()))
            .await?
            .check()?
            .take(0)?;
        Ok(found.into_iter().next().map(|group| group.uid))
    }

    async fn note_uid(&self, title: &str) -> Result<Option<String>> {
        let found: Vec<NoteUidDoc> = self
            .db
            .query("SELECT uid FROM notes WHERE title = $title LIMIT 1;")
            .bind(("title", title.to_string()))
            .await?
            .check()?
            .take(0)?;
        Ok(found.into_iter().next().map(|note| note.uid))
    }

    async fn next_seq(&self, collection: &'static str) -> Result<i64> {
        let last: Vec<SeqDoc> = self
            .db
            .query(format!(
                "SELECT seq FROM {} ORDER BY seq DESC LIMIT 1;",
                collection
            ))
            .await?
            .check()?
            .take(0)?;
        Ok(last.first().map_or(1, |doc| doc.seq + 1))
    }

    fn log_mutation<T>(&self, op: &str, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => debug!("event={} module=surreal status=ok", op),
            Err(err) => warn!("event={} module=surreal status=error error={}", op, err),
        }
        result
    }
}

impl Database for SurrealDatabase {
    fn get_all_groups(&self) -> Result<Vec<String>> {
        self.block_on(async {
            Ok(self
                .groups()
                .await?
                .into_iter()
                .map(|group| group.title)
                .collect())
        })
    }

    fn get_all_notes(&self) -> Result<Vec<String>> {
        self.block_on(async {
            let groups = self.groups().await?;
            let notes: Vec<NoteTitleDoc> = self
                .db
                .query("SELECT title, group_id, seq FROM notes ORDER BY seq ASC;")
                .await?
                .check()?
                .take(0)?;

            let mut titles = Vec::with_capacity(notes.len());
            for group in &groups {
                titles.extend(
                    notes
                        .iter()
                        .filter(|note| note.group_id == group.uid)
                        .map(|note| note.title.clone()),
                );
            }
            Ok(titles)
        })
    }

    fn get_attached_group_notes(&self, group: &str) -> Result<Vec<String>> {
        self.block_on(async {
            let Some(gid) = self.group_uid(group).await? else {
                return Ok(Vec::new());
            };
            let notes: Vec<NoteTitleDoc> = self
                .db
                .query(
                    "SELECT title, group_id, seq FROM notes WHERE group_id = $gid ORDER BY seq ASC;",
                )
                .bind(("gid", gid))
                .await?
                .check()?
                .take(0)?;
            Ok(notes.into_iter().map(|note| note.title).collect())
        })
    }

    fn check_group(&self, title: &str) -> Result<bool> {
        self.block_on(async { Ok(self.group_uid(title).await?.is_some()) })
    }

    fn check_note(&self, title: &str) -> Result<Option<Note>> {
        self.block_on(async {
            let found: Vec<NoteDoc> = self
                .db
                .query(
                    "SELECT uid, title, text, creation_date, last_change_date
                     FROM notes WHERE title = $title LIMIT 1;",
                )
                .bind(("title", title.to_string()))
                .await?
                .check()?
                .take(0)?;
            found.into_iter().next().map(NoteDoc::into_note).transpose()
        })
    }

    fn create_group(&mut self, title: &str) -> Result<()> {
        let result = self.block_on(async {
            if self.group_uid(title).await?.is_some() {
                return Err(NotesError::DuplicateTitle(title.to_string()));
            }
            let seq = self.next_seq("groups").await?;
            self.db
                .query("CREATE groups SET uid = $uid, title = $title, seq = $seq;")
                .bind(("uid", GroupId::generate().to_string()))
                .bind(("title", title.to_string()))
                .bind(("seq", seq))
                .await?
                .check()?;
            Ok(())
        });
        self.log_mutation("group_create", result)
    }

    fn rename_group(&mut self, old_title: &str, new_title: &str) -> Result<()> {
        let result = self.block_on(async {
            if self.group_uid(old_title).await?.is_none() || old_title == new_title {
                return Ok(());
            }
            if self.group_uid(new_title).await?.is_some() {
                return Err(NotesError::DuplicateTitle(new_title.to_string()));
            }
            self.db
                .query("UPDATE groups SET title = $new WHERE title = $old;")
                .bind(("old", old_title.to_string()))
                .bind(("new", new_title.to_string()))
                .await?
                .check()?;
            Ok(())
        });
        self.log_mutation("group_rename", result)
    }

    fn delete_group(&mut self, title: &str) -> Result<()> {
        let result = self.block_on(async {
            let Some(gid) = self.group_uid(title).await? else {
                return Ok(());
            };
            self.db
                .query(
                    "BEGIN TRANSACTION;
                     DELETE notes WHERE group_id = $gid;
                     DELETE groups WHERE uid = $gid;
                     COMMIT TRANSACTION;",
                )
                .bind(("gid", gid))
                .await?
                .check()?;
            Ok(())
        });
        self.log_mutation("group_delete", result)
    }

    fn create_note(&mut self, group: &str, title: &str, text: &str) -> Result<Note> {
        let note = Note::new(title, text);
        let result = self.block_on(async {
            let gid = self
                .group_uid(group)
                .await?
                .ok_or_else(|| NotesError::GroupNotFound(group.to_string()))?;
            if self.note_uid(title).await?.is_some() {
                return Err(NotesError::DuplicateTitle(title.to_string()));
            }
            let seq = self.next_seq("notes").await?;
            self.db
                .query(
                    "CREATE notes SET uid = $uid, group_id = $gid, title = $title, text = $text,
                     creation_date = $created, last_change_date = $changed, seq = $seq;",
                )
                .bind(("uid", note.id.to_string()))
                .bind(("gid", gid))
                .bind(("title", note.title.clone()))
                .bind(("text", note.text.clone()))
                .bind(("created", format_timestamp(&note.creation_date)))
                .bind(("changed", format_timestamp(&note.last_change_date)))
                .bind(("seq", seq))
                .await?
                .check()?;
            Ok(())
        });
        self.log_mutation("note_create", result)?;
        Ok(note)
    }

    fn update_note(
        &mut self,
        group: &str,
        id: &NoteId,
        value: &str,
        field: NoteField,
    ) -> Result<()> {
        let result = self.block_on(async {
            let Some(gid) = self.group_uid(group).await? else {
                return Ok(());
            };
            let found: Vec<NoteDoc> = self
                .db
                .query(
                    "SELECT uid, title, text, creation_date, last_change_date
                     FROM notes WHERE uid = $uid AND group_id = $gid LIMIT 1;",
                )
                .bind(("uid", id.to_string()))
                .bind(("gid", gid))
                .await?
                .check()?
                .take(0)?;
            let Some(doc) = found.into_iter().next() else {
                return Ok(());
            };
            if field == NoteField::Title {
                let other = self.note_uid(value).await?;
                if other.is_some_and(|uid| uid != doc.uid) {
                    return Err(NotesError::DuplicateTitle(value.to_string()));
                }
            }

            let mut note = doc.into_note()?;
            note.apply(field, value);
            self.db
                .query(
                    "UPDATE notes SET title = $title, text = $text, last_change_date = $changed
                     WHERE uid = $uid;",
                )
                .bind(("uid", note.id.to_string()))
                .bind(("title", note.title))
                .bind(("text", note.text))
                .bind(("changed", format_timestamp(&note.last_change_date)))
                .await?
                .check()?;
            Ok(())
        });
        self.log_mutation("note_update", result)
    }

    fn delete_note(&mut self, group: &str, id: &NoteId) -> Result<()> {
        let result = self.block_on(async {
            let Some(gid) = self.group_uid(group).await? else {
                return Ok(());
            };
            self.db
                .query("DELETE notes WHERE uid = $uid AND group_id = $gid;")
                .bind(("uid", id.to_string()))
                .bind(("gid", gid))
                .await?
                .check()?;
            Ok(())
        });
        self.log_mutation("note_delete", result)
    }
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str, field: &'static str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| NotesError::InvalidData(format!("invalid timestamp `{value}` in {field}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> SurrealDatabase {
        SurrealDatabase::in_memory().unwrap()
    }

    #[test]
    fn starts_with_home() {
        let db = setup();
        assert_eq!(db.get_all_groups().unwrap(), vec!["Home".to_string()]);
    }

    #[test]
    fn bootstrap_runs_once() {
        let db = setup();
        db.bootstrap().unwrap();
        assert_eq!(db.get_all_groups().unwrap(), vec!["Home".to_string()]);
    }

    #[test]
    fn rename_keeps_notes_attached() {
        let mut db = setup();
        db.create_group("X").unwrap();
        db.create_note("X", "Plan", "").unwrap();
        db.create_note("X", "Budget", "").unwrap();

        db.rename_group("X", "Y").unwrap();

        assert!(db.get_attached_group_notes("X").unwrap().is_empty());
        assert_eq!(
            db.get_attached_group_notes("Y").unwrap(),
            vec!["Plan".to_string(), "Budget".to_string()]
        );
    }

    #[test]
    fn delete_group_removes_its_notes_only() {
        let mut db = setup();
        db.create_group("Work").unwrap();
        db.create_note("Work", "Plan", "").unwrap();
        db.create_note("Home", "Keep", "").unwrap();

        db.delete_group("Work").unwrap();

        assert!(db.check_note("Plan").unwrap().is_none());
        assert!(db.check_note("Keep").unwrap().is_some());
        assert_eq!(db.get_all_notes().unwrap(), vec!["Keep".to_string()]);
    }

    #[test]
    fn failed_group_delete_keeps_group_and_notes() {
        let mut db = setup();
        db.create_group("Work").unwrap();
        db.create_note("Work", "Plan", "").unwrap();
        db.rt
            .block_on(async {
                db.db
                    .query(
                        "DEFINE EVENT block_group_delete ON TABLE groups
                         WHEN $event = 'DELETE' THEN { THROW 'boom' };",
                    )
                    .await
            })
            .unwrap()
            .check()
            .unwrap();

        assert!(db.delete_group("Work").is_err());

        assert_eq!(
            db.get_all_groups().unwrap(),
            vec!["Home".to_string(), "Work".to_string()]
        );
        assert_eq!(
            db.get_attached_group_notes("Work").unwrap(),
            vec!["Plan".to_string()]
        );
    }

    #[test]
    fn duplicate_titles_are_rejected() {
        let mut db = setup();
        db.create_group("Work").unwrap();
        let plan = db.create_note("Work", "Plan", "").unwrap();
        db.create_note("Home", "Budget", "").unwrap();

        assert!(matches!(
            db.create_group("Work"),
            Err(NotesError::DuplicateTitle(_))
        ));
        assert!(matches!(
            db.rename_group("Work", "Home"),
            Err(NotesError::DuplicateTitle(_))
        ));
        assert!(matches!(
            db.update_note("Work", &plan.id, "Budget", NoteField::Title),
            Err(NotesError::DuplicateTitle(_))
        ));
        assert_eq!(db.get_all_notes().unwrap(), vec!["Budget", "Plan"]);
    }

    #[test]
    fn timestamps_survive_storage() {
        let mut db = setup();
        let created = db.create_note("Home", "Plan", "draft").unwrap();
        assert_eq!(db.check_note("Plan").unwrap().unwrap(), created);
    }

    #[test]
    fn notes_follow_group_order() {
        let mut db = setup();
        db.create_group("Work").unwrap();
        db.create_note("Work", "W1", "").unwrap();
        db.create_note("Home", "H1", "").unwrap();

        assert_eq!(
            db.get_all_notes().unwrap(),
            vec!["H1".to_string(), "W1".to_string()]
        );
    }
}
