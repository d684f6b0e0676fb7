use super::backend::DocumentBackend;
use super::mem_backend::MemBackend;
use super::Database;
use crate::error::{NotesError, Result};
use crate::model::{Group, Note, NoteField, NoteId, Store};
use log::{debug, info, warn};

/// The file-backed store: the whole [`Store`] kept resident and mirrored to one JSON document.
pub struct JsonDatabase<B: DocumentBackend> {
    /// The underlying document medium.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    store: Store,
}

/// A file-backed store that never touches the disk. Used by controller tests.
pub type InMemoryDatabase = JsonDatabase<MemBackend>;

impl<B: DocumentBackend> JsonDatabase<B> {
    /// Reads and parses the document.
    ///
    /// A missing document, an empty one and one that does not parse are three distinct
    /// faults, so the caller can offer a different recovery for each.
    pub fn load(backend: B) -> Result<Self> {
        let path = backend.location();
        let raw = match backend.read_document()? {
            Some(raw) => raw,
            None => {
                info!(
                    "event=json_load module=json status=error error_code=missing path={}",
                    path.display()
                );
                return Err(NotesError::StoreMissing(path));
            }
        };

        if raw.trim().is_empty() {
            info!(
                "event=json_load module=json status=error error_code=empty path={}",
                path.display()
            );
            return Err(NotesError::StoreEmpty(path));
        }

        let store: Store = serde_json::from_str(&raw).map_err(|source| {
            warn!(
                "event=json_load module=json status=error error_code=malformed path={} error={}",
                path.display(),
                source
            );
            NotesError::StoreMalformed {
                path: path.clone(),
                source,
            }
        })?;

        info!(
            "event=json_load module=json status=ok path={} groups={}",
            path.display(),
            store.groups.len()
        );
        Ok(Self { backend, store })
    }

    /// Writes the default document (one empty `Home` group) and opens it.
    pub fn initialize(backend: B) -> Result<Self> {
        let store = Store::with_default_group();
        write_store(&backend, &store)?;
        info!(
            "event=json_init module=json status=ok path={}",
            backend.location().display()
        );
        Ok(Self { backend, store })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Runs `f` against a copy of the store and commits the copy only once it is on disk.
    ///
    /// When the write fails, both the resident store and the document keep their previous
    /// content. A mutation that leaves the store unchanged does not write at all.
    fn transact<T>(&mut self, op: &str, f: impl FnOnce(&mut Store) -> Result<T>) -> Result<T> {
        let mut next = self.store.clone();
        let value = f(&mut next)?;

        if next == self.store {
            debug!("event={} module=json status=noop", op);
            return Ok(value);
        }

        if let Err(err) = write_store(&self.backend, &next) {
            warn!("event={} module=json status=error error={}", op, err);
            return Err(err);
        }
        self.store = next;
        debug!("event={} module=json status=ok", op);
        Ok(value)
    }

    /// Locates a group by title and applies `f` to it inside [`Self::transact`].
    /// Returns `None` when no group has that title.
    fn update_group<T>(
        &mut self,
        op: &str,
        title: &str,
        f: impl FnOnce(&mut Group) -> T,
    ) -> Result<Option<T>> {
        self.transact(op, |store| Ok(store.group_mut(title).map(f)))
    }
}

impl InMemoryDatabase {
    /// A freshly initialized store held in memory.
    pub fn in_memory() -> Result<Self> {
        Self::initialize(MemBackend::new())
    }
}

fn write_store<B: DocumentBackend>(backend: &B, store: &Store) -> Result<()> {
    let content =
        serde_json::to_string_pretty(store).map_err(|err| NotesError::Persist(err.to_string()))?;
    backend.write_document(&content)
}

impl<B: DocumentBackend> Database for JsonDatabase<B> {
    fn get_all_groups(&self) -> Result<Vec<String>> {
        Ok(self.store.group_titles())
    }

    fn get_all_notes(&self) -> Result<Vec<String>> {
        Ok(self.store.note_titles())
    }

    fn get_attached_group_notes(&self, group: &str) -> Result<Vec<String>> {
        Ok(self
            .store
            .group(group)
            .map(Group::note_titles)
            .unwrap_or_default())
    }

    fn check_group(&self, title: &str) -> Result<bool> {
        Ok(self.store.group(title).is_some())
    }

    fn check_note(&self, title: &str) -> Result<Option<Note>> {
        Ok(self.store.find_note(title).cloned())
    }

    fn create_group(&mut self, title: &str) -> Result<()> {
        self.transact("group_create", |store| {
            if store.group(title).is_some() {
                return Err(NotesError::DuplicateTitle(title.to_string()));
            }
            store.groups.push(Group::new(title));
            Ok(())
        })
    }

    fn rename_group(&mut self, old_title: &str, new_title: &str) -> Result<()> {
        self.transact("group_rename", |store| {
            if store.group(old_title).is_none() || old_title == new_title {
                return Ok(());
            }
            if store.group(new_title).is_some() {
                return Err(NotesError::DuplicateTitle(new_title.to_string()));
            }
            if let Some(group) = store.group_mut(old_title) {
                group.title = new_title.to_string();
            }
            Ok(())
        })
    }

    fn delete_group(&mut self, title: &str) -> Result<()> {
        self.transact("group_delete", |store| {
            store.groups.retain(|group| group.title != title);
            Ok(())
        })
    }

    fn create_note(&mut self, group: &str, title: &str, text: &str) -> Result<Note> {
        let note = Note::new(title, text);
        let stored = note.clone();
        self.transact("note_create", |store| {
            if store.group(group).is_none() {
                return Err(NotesError::GroupNotFound(group.to_string()));
            }
            if store.find_note(title).is_some() {
                return Err(NotesError::DuplicateTitle(title.to_string()));
            }
            if let Some(target) = store.group_mut(group) {
                target.notes.push(note);
            }
            Ok(())
        })?;
        Ok(stored)
    }

    fn update_note(
        &mut self,
        group: &str,
        id: &NoteId,
        value: &str,
        field: NoteField,
    ) -> Result<()> {
        self.transact("note_update", |store| {
            if field == NoteField::Title {
                let taken = store
                    .find_note(value)
                    .is_some_and(|other| other.id != *id);
                let owned = store.group(group).is_some_and(|g| g.note(id).is_some());
                if taken && owned {
                    return Err(NotesError::DuplicateTitle(value.to_string()));
                }
            }
            if let Some(note) = store.group_mut(group).and_then(|g| g.note_mut(id)) {
                note.apply(field, value);
            }
            Ok(())
        })
    }

    fn delete_note(&mut self, group: &str, id: &NoteId) -> Result<()> {
        self.update_group("note_delete", group, |group| {
            group.remove_note(id);
        })?;
        Ok(())
    }
}
