//! # Domain Model: Groups, Notes and the Store
//!
//! The data exchanged across the [`crate::store::Database`] boundary. These are plain values;
//! no type here knows how it is persisted.
//!
//! ```text
//! Store
//! └── Group "Home"            (title unique across the store)
//!     ├── Note "Plan"         (title unique across the store)
//!     └── Note "Groceries"
//! ```
//!
//! ## Identity
//!
//! Every group and note carries a UUID generated once at creation ([`GroupId`], [`NoteId`]).
//! Titles are display names and can change freely; the ids never do. Backends key their
//! relations on the ids, so renaming a group never has to touch the notes it owns.
//!
//! ## Timestamps
//!
//! - `creation_date` is set once by [`Note::new`].
//! - `last_change_date` starts equal to `creation_date` and is refreshed by [`Note::touch`]
//!   on every title or text change. It never moves before `creation_date`.
//!
//! ## Persisted Shape
//!
//! The serde attributes describe the document written by the JSON backend:
//!
//! ```text
//! { "groups_list": [ { "group_id": "...", "name": "Home", "notes_list": [
//!     { "note_id": "...", "title": "...", "text": "...",
//!       "creation_date": "2024-01-01T10:00:00Z", "last_change_date": "..." } ] } ] }
//! ```
//!
//! Older documents named the group field `title` and had no `group_id`; both are accepted.
//! Their `note_id` was the note title or an integer, which is replaced by a fresh UUID, and
//! their timestamps carried no offset, which is read as UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Title of the group every fresh store starts with.
pub const DEFAULT_GROUP: &str = "Home";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

/// Older documents used the note title or a per-group integer as `note_id`. Those ids get a
/// fresh UUID on load; it is written back with the next change.
impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StoredId {
            Text(String),
            Number(i64),
        }

        Ok(match StoredId::deserialize(deserializer)? {
            StoredId::Text(raw) => Self::parse(&raw).unwrap_or_else(Self::generate),
            StoredId::Number(_) => Self::generate(),
        })
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which field of a note an update replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Title,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "note_id")]
    pub id: NoteId,
    pub title: String,
    pub text: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub creation_date: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub last_change_date: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::generate(),
            title: title.into(),
            text: text.into(),
            creation_date: now,
            last_change_date: now,
        }
    }

    /// Refreshes `last_change_date`, clamped so it never precedes `creation_date`.
    pub fn touch(&mut self) {
        self.last_change_date = Utc::now().max(self.creation_date);
    }

    /// Replaces one field and refreshes the change date.
    pub fn apply(&mut self, field: NoteField, value: &str) {
        match field {
            NoteField::Title => self.title = value.to_string(),
            NoteField::Text => self.text = value.to_string(),
        }
        self.touch();
    }

    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count() + 1
    }

    pub fn symbol_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "group_id", default = "GroupId::generate")]
    pub id: GroupId,
    #[serde(rename = "name", alias = "title")]
    pub title: String,
    #[serde(rename = "notes_list", default)]
    pub notes: Vec<Note>,
}

impl Group {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: GroupId::generate(),
            title: title.into(),
            notes: Vec::new(),
        }
    }

    pub fn note_titles(&self) -> Vec<String> {
        self.notes.iter().map(|note| note.title.clone()).collect()
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == *id)
    }

    pub fn note_mut(&mut self, id: &NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == *id)
    }

    pub fn remove_note(&mut self, id: &NoteId) -> Option<Note> {
        let position = self.notes.iter().position(|note| note.id == *id)?;
        Some(self.notes.remove(position))
    }
}

/// The root aggregate: every group, in creation order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "groups_list")]
    pub groups: Vec<Group>,
}

impl Store {
    /// The content of a freshly initialized store: one empty `Home` group.
    pub fn with_default_group() -> Self {
        Self {
            groups: vec![Group::new(DEFAULT_GROUP)],
        }
    }

    pub fn group(&self, title: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.title == title)
    }

    pub fn group_mut(&mut self, title: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|group| group.title == title)
    }

    pub fn group_titles(&self) -> Vec<String> {
        self.groups.iter().map(|group| group.title.clone()).collect()
    }

    pub fn note_titles(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|group| group.notes.iter().map(|note| note.title.clone()))
            .collect()
    }

    /// Store-wide lookup; titles are unique across groups.
    pub fn find_note(&self, title: &str) -> Option<&Note> {
        self.groups
            .iter()
            .flat_map(|group| group.notes.iter())
            .find(|note| note.title == title)
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.groups
            .iter()
            .flat_map(|group| group.notes.iter())
            .find(|note| note.id == *id)
    }
}

/// Reads RFC 3339 timestamps, and offset-less ones (`2024-01-01T10:00:00.123456`) as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_note_has_equal_dates() {
        let note = Note::new("Plan", "draft");
        assert_eq!(note.creation_date, note.last_change_date);
    }

    #[test]
    fn apply_text_keeps_title() {
        let mut note = Note::new("Plan", "draft");
        note.apply(NoteField::Text, "final");
        assert_eq!(note.title, "Plan");
        assert_eq!(note.text, "final");
        assert!(note.last_change_date >= note.creation_date);
    }

    #[test]
    fn touch_never_precedes_creation() {
        let mut note = Note::new("Plan", "");
        // Simulate a clock that went backwards relative to the creation stamp
        note.creation_date = Utc::now() + Duration::hours(1);
        note.touch();
        assert_eq!(note.last_change_date, note.creation_date);
    }

    #[test]
    fn note_counts() {
        let note = Note::new("Poem", "one\ntwo\nthree");
        assert_eq!(note.line_count(), 3);
        assert_eq!(note.symbol_count(), 13);
        assert_eq!(Note::new("Empty", "").line_count(), 1);
    }

    #[test]
    fn find_note_searches_every_group() {
        let mut store = Store::with_default_group();
        let mut work = Group::new("Work");
        work.notes.push(Note::new("Plan", ""));
        store.groups.push(work);

        assert_eq!(store.find_note("Plan").unwrap().title, "Plan");
        assert!(store.find_note("Missing").is_none());
        assert_eq!(store.note_titles(), vec!["Plan".to_string()]);

        let id = store.find_note("Plan").unwrap().id;
        assert_eq!(store.note(&id).unwrap().title, "Plan");
        assert!(store.note(&NoteId::generate()).is_none());
    }

    #[test]
    fn remove_note_by_id() {
        let mut group = Group::new("Work");
        let note = Note::new("Plan", "");
        let id = note.id;
        group.notes.push(note);

        assert!(group.remove_note(&id).is_some());
        assert!(group.remove_note(&id).is_none());
        assert!(group.notes.is_empty());
    }

    #[test]
    fn legacy_group_shape_is_accepted() {
        let raw = r#"{"groups_list": [{"title": "Home", "notes_list": []}]}"#;
        let store: Store = serde_json::from_str(raw).unwrap();
        assert_eq!(store.group_titles(), vec!["Home".to_string()]);
    }

    #[test]
    fn legacy_note_ids_are_replaced() {
        let raw = r#"{"groups_list": [{"name": "Home", "notes_list": [
            {"note_id": "Plan", "title": "Plan", "text": "",
             "creation_date": "2024-03-01T10:00:00Z", "last_change_date": "2024-03-01T10:00:00Z"},
            {"note_id": 0, "title": "Budget", "text": "",
             "creation_date": "2024-03-01T10:00:00Z", "last_change_date": "2024-03-01T10:00:00Z"}
        ]}]}"#;
        let store: Store = serde_json::from_str(raw).unwrap();
        let notes = &store.groups[0].notes;
        assert_eq!(notes.len(), 2);
        assert_ne!(notes[0].id, notes[1].id);
    }

    #[test]
    fn uuid_note_ids_are_kept() {
        let note = Note::new("Plan", "");
        let raw = serde_json::to_string(&note).unwrap();
        let parsed: Note = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.id, note.id);
    }

    #[test]
    fn offsetless_timestamps_read_as_utc() {
        let expected = DateTime::parse_from_rfc3339("2024-03-01T10:15:30.250Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(timestamp::parse("2024-03-01T10:15:30.250"), Some(expected));
        assert_eq!(timestamp::parse("2024-03-01 10:15:30.250"), Some(expected));
        assert_eq!(timestamp::parse("2024-03-01T10:15:30.250+00:00"), Some(expected));
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn serialized_shape_uses_document_field_names() {
        let store = Store::with_default_group();
        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value["groups_list"][0]["name"], "Home");
        assert!(value["groups_list"][0]["notes_list"].is_array());
    }
}
