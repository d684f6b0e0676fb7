use crate::commands::{
    invalid, require_group, require_note, require_title, require_unused_note, CmdMessage,
    CmdResult, Session,
};
use crate::error::Result;
use crate::model::{Note, NoteField};
use crate::store::Database;

/// Date layout used by `note info`.
pub const DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Attaches a note of the attached group.
pub fn select<D: Database>(db: &D, session: &mut Session, title: &str) -> Result<CmdResult> {
    let title = require_title(title)?;
    let group = require_group(session)?;

    let titles = db.get_attached_group_notes(&group)?;
    if titles.is_empty() {
        return Err(invalid(format!("Group '{}' is empty", group)));
    }
    if !titles.iter().any(|candidate| candidate == title) {
        return Err(invalid(format!("Note '{}' doesn't exist", title)));
    }
    let note = db
        .check_note(title)?
        .ok_or_else(|| invalid(format!("Note '{}' doesn't exist", title)))?;

    session.attach_note(note.clone());
    Ok(CmdResult::default().with_note(note))
}

/// Runs the checks of [`create`] so a client can reject a title before asking for text.
pub fn check_create<'a, D: Database>(
    db: &D,
    session: &Session,
    title: &'a str,
) -> Result<(&'a str, String)> {
    let title = require_title(title)?;
    let group = require_group(session)?;
    require_unused_note(db, title)?;
    Ok((title, group))
}

/// Creates a note in the attached group and attaches it.
pub fn create<D: Database>(
    db: &mut D,
    session: &mut Session,
    title: &str,
    text: &str,
) -> Result<CmdResult> {
    let (title, group) = check_create(db, session, title)?;

    let note = db.create_note(&group, title, text)?;
    session.attach_note(note.clone());

    let mut result = CmdResult::default().with_note(note);
    result.add_message(CmdMessage::success(format!(
        "Note '{}' was successfully created",
        title
    )));
    Ok(result)
}

pub fn read(session: &Session) -> Result<CmdResult> {
    Ok(CmdResult::default().with_note(require_note(session)?))
}

/// The attached note together with its size and dates.
pub fn info(session: &Session) -> Result<CmdResult> {
    let note = require_note(session)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!("Title: {}", note.title)));
    result.add_message(CmdMessage::info(format!("Lines: {}", note.line_count())));
    result.add_message(CmdMessage::info(format!(
        "Symbols: {}",
        note.symbol_count()
    )));
    result.add_message(CmdMessage::info(format!(
        "Created: {}",
        note.creation_date.format(DATE_FORMAT)
    )));
    result.add_message(CmdMessage::info(format!(
        "Last change: {}",
        note.last_change_date.format(DATE_FORMAT)
    )));
    Ok(result.with_note(note))
}

pub fn edit_text<D: Database>(db: &mut D, session: &mut Session, text: &str) -> Result<CmdResult> {
    let note = require_note(session)?;
    let group = require_group(session)?;

    db.update_note(&group, &note.id, text, NoteField::Text)?;
    let refreshed = reattach(db, session, &note.title)?;

    let mut result = CmdResult::default();
    if let Some(note) = refreshed {
        result = result.with_note(note);
    }
    result.add_message(CmdMessage::success("Note text was successfully changed"));
    Ok(result)
}

pub fn edit_title<D: Database>(
    db: &mut D,
    session: &mut Session,
    new_title: &str,
) -> Result<CmdResult> {
    let note = require_note(session)?;
    let new_title = require_title(new_title)?;
    let group = require_group(session)?;
    require_unused_note(db, new_title)?;

    db.update_note(&group, &note.id, new_title, NoteField::Title)?;
    let refreshed = reattach(db, session, new_title)?;

    let mut result = CmdResult::default();
    if let Some(note) = refreshed {
        result = result.with_note(note);
    }
    result.add_message(CmdMessage::success(format!(
        "Note title was successfully changed to '{}'",
        new_title
    )));
    Ok(result)
}

pub fn delete<D: Database>(db: &mut D, session: &mut Session) -> Result<CmdResult> {
    let note = require_note(session)?;
    let group = require_group(session)?;

    db.delete_note(&group, &note.id)?;
    session.detach_note();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Note '{}' was successfully deleted",
        note.title
    )));
    Ok(result)
}

/// Reloads the attached note after an edit so the session sees the stored dates.
fn reattach<D: Database>(db: &D, session: &mut Session, title: &str) -> Result<Option<Note>> {
    match db.check_note(title)? {
        Some(note) => {
            session.attach_note(note.clone());
            Ok(Some(note))
        }
        None => {
            session.detach_note();
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::groups;
    use crate::store::json_store::InMemoryDatabase;

    fn setup() -> (InMemoryDatabase, Session) {
        let db = InMemoryDatabase::in_memory().unwrap();
        let mut session = Session::default();
        groups::select(&db, &mut session, "Home").unwrap();
        (db, session)
    }

    #[test]
    fn create_requires_attached_group() {
        let mut db = InMemoryDatabase::in_memory().unwrap();
        let mut session = Session::default();
        let err = create(&mut db, &mut session, "Plan", "").unwrap_err();
        assert_eq!(err.to_string(), "No group selected");
    }

    #[test]
    fn create_attaches_note_with_equal_dates() {
        let (mut db, mut session) = setup();
        let result = create(&mut db, &mut session, "Plan", "draft").unwrap();

        let note = result.note.unwrap();
        assert_eq!(note.creation_date, note.last_change_date);
        assert_eq!(session.note(), Some(&note));
        assert_eq!(db.check_note("Plan").unwrap(), Some(note));
    }

    #[test]
    fn create_rejects_title_used_in_another_group() {
        let (mut db, mut session) = setup();
        create(&mut db, &mut session, "Plan", "").unwrap();
        groups::create(&mut db, &mut session, "Work").unwrap();

        let err = create(&mut db, &mut session, "Plan", "").unwrap_err();
        assert_eq!(err.to_string(), "Note 'Plan' already exists");
        assert!(db.get_attached_group_notes("Work").unwrap().is_empty());
    }

    #[test]
    fn check_create_touches_nothing() {
        let (db, session) = setup();
        assert_eq!(
            check_create(&db, &session, " Plan ").unwrap(),
            ("Plan", "Home".to_string())
        );
        assert!(db.get_all_notes().unwrap().is_empty());
    }

    #[test]
    fn select_in_empty_group() {
        let (db, mut session) = setup();
        let err = select(&db, &mut session, "Plan").unwrap_err();
        assert_eq!(err.to_string(), "Group 'Home' is empty");
    }

    #[test]
    fn select_is_scoped_to_attached_group() {
        let (mut db, mut session) = setup();
        create(&mut db, &mut session, "Plan", "").unwrap();
        groups::create(&mut db, &mut session, "Work").unwrap();
        create(&mut db, &mut session, "Budget", "").unwrap();

        let err = select(&db, &mut session, "Plan").unwrap_err();
        assert_eq!(err.to_string(), "Note 'Plan' doesn't exist");

        select(&db, &mut session, "Budget").unwrap();
        assert_eq!(session.note().unwrap().title, "Budget");
    }

    #[test]
    fn read_and_info_require_selection() {
        let session = Session::default();
        assert!(read(&session).is_err());
        assert!(info(&session).is_err());
    }

    #[test]
    fn info_reports_counts() {
        let (mut db, mut session) = setup();
        create(&mut db, &mut session, "Poem", "one\ntwo\nthree").unwrap();

        let result = info(&session).unwrap();
        let lines: Vec<&str> = result.messages.iter().map(|m| m.content.as_str()).collect();
        assert!(lines.contains(&"Lines: 3"));
        assert!(lines.contains(&"Symbols: 13"));
    }

    #[test]
    fn edit_text_keeps_title_and_refreshes_session() {
        let (mut db, mut session) = setup();
        create(&mut db, &mut session, "Plan", "draft").unwrap();
        let before = session.note().unwrap().clone();

        edit_text(&mut db, &mut session, "final").unwrap();

        let stored = db.check_note("Plan").unwrap().unwrap();
        assert_eq!(stored.text, "final");
        assert_eq!(stored.title, "Plan");
        assert!(stored.last_change_date >= before.last_change_date);
        assert_eq!(session.note(), Some(&stored));
    }

    #[test]
    fn edit_title_keeps_text() {
        let (mut db, mut session) = setup();
        create(&mut db, &mut session, "Plan", "draft").unwrap();

        edit_title(&mut db, &mut session, "Roadmap").unwrap();

        assert!(db.check_note("Plan").unwrap().is_none());
        let stored = db.check_note("Roadmap").unwrap().unwrap();
        assert_eq!(stored.text, "draft");
        assert_eq!(session.note().unwrap().title, "Roadmap");
    }

    #[test]
    fn edit_title_rejects_duplicates() {
        let (mut db, mut session) = setup();
        create(&mut db, &mut session, "Plan", "").unwrap();
        create(&mut db, &mut session, "Budget", "").unwrap();

        let err = edit_title(&mut db, &mut session, "Plan").unwrap_err();
        assert_eq!(err.to_string(), "Note 'Plan' already exists");
        assert_eq!(session.note().unwrap().title, "Budget");
    }

    #[test]
    fn delete_detaches_note() {
        let (mut db, mut session) = setup();
        create(&mut db, &mut session, "Plan", "").unwrap();

        delete(&mut db, &mut session).unwrap();

        assert!(session.note().is_none());
        assert_eq!(session.group(), Some("Home"));
        assert!(db.check_note("Plan").unwrap().is_none());
    }
}
