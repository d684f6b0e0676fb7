use crate::commands::{
    require_existing_group, require_group, require_title, require_unused_group, CmdMessage,
    CmdResult, Session,
};
use crate::error::Result;
use crate::store::Database;

pub fn list<D: Database>(db: &D) -> Result<CmdResult> {
    Ok(CmdResult::default().with_groups(db.get_all_groups()?))
}

pub fn select<D: Database>(db: &D, session: &mut Session, title: &str) -> Result<CmdResult> {
    let title = require_title(title)?;
    require_existing_group(db, title)?;

    session.attach_group(title);
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!("Group '{}' selected", title)));
    Ok(result)
}

pub fn create<D: Database>(db: &mut D, session: &mut Session, title: &str) -> Result<CmdResult> {
    let title = require_title(title)?;
    require_unused_group(db, title)?;

    db.create_group(title)?;
    session.attach_group(title);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "New group '{}' was successfully created",
        title
    )));
    Ok(result)
}

/// Renames the attached group.
pub fn rename<D: Database>(db: &mut D, session: &mut Session, new_title: &str) -> Result<CmdResult> {
    let current = require_group(session)?;
    let new_title = require_title(new_title)?;
    require_unused_group(db, new_title)?;

    db.rename_group(&current, new_title)?;
    session.retitle_group(new_title);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Group title was successfully changed to '{}'",
        new_title
    )));
    Ok(result)
}

/// Runs the checks of [`delete`] without deleting, so a client can confirm first.
pub fn check_delete<'a, D: Database>(db: &D, title: &'a str) -> Result<&'a str> {
    let title = require_title(title)?;
    require_existing_group(db, title)?;
    Ok(title)
}

/// Deletes a group with all its notes. Detaches it when it was the attached group.
pub fn delete<D: Database>(db: &mut D, session: &mut Session, title: &str) -> Result<CmdResult> {
    let title = check_delete(db, title)?;

    db.delete_group(title)?;
    if session.group() == Some(title) {
        session.detach_group();
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Group '{}' was successfully deleted",
        title
    )));
    Ok(result)
}
