use crate::commands::{CmdResult, Session};
use crate::error::Result;
use crate::store::Database;

/// Every group with its notes, as display lines.
pub fn run<D: Database>(db: &D) -> Result<CmdResult> {
    Ok(CmdResult::default().with_listing(db.get_grouped_notes()?))
}

/// Group titles followed by the attached group's note titles.
pub fn completions<D: Database>(db: &D, session: &Session) -> Result<CmdResult> {
    let mut words = db.get_all_groups()?;
    if let Some(group) = session.group() {
        words.extend(db.get_attached_group_notes(group)?);
    }
    Ok(CmdResult {
        completions: words,
        ..CmdResult::default()
    })
}
