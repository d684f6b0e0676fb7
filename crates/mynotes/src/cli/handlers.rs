//! Command handlers for the mynotes loop.
//!
//! Each handler calls the API, renders the `CmdResult` and returns. Validation errors come
//! back from the API as `Err` and are printed by the loop. Handlers that ask for more input
//! (text, a new title, a confirmation) run the API's checks first, so the user is never
//! asked to type something that will be rejected anyway.

use super::console::{Confirmation, Console};
use super::render;
use super::setup::{GroupAction, GroupField, NoteAction, NoteField as EditField, ReplCommand};
use anyhow::Result;
use mynotesapp::api::NotesApi;
use mynotesapp::store::Database;
use std::io::{BufRead, Write};

const DELETE_QUESTION: &str = "Are you sure to delete this [Y/N]?";

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn dispatch<D, R, W>(
    api: &mut NotesApi<D>,
    console: &mut Console<R, W>,
    command: ReplCommand,
) -> Result<Flow>
where
    D: Database,
    R: BufRead,
    W: Write,
{
    match command {
        ReplCommand::Help { topic } => render::help(console.out(), topic)?,
        ReplCommand::Cls => console.clear_screen()?,
        ReplCommand::Quit => return Ok(Flow::Quit),
        ReplCommand::Groups => list_groups(api, console)?,
        ReplCommand::Notes => list_notes(api, console)?,
        ReplCommand::Group { action } => match action {
            GroupAction::Select(arg) => select_group(api, console, &arg.title())?,
            GroupAction::Create(arg) => {
                let result = api.create_group(&arg.title())?;
                render::messages(console.out(), &result.messages)?;
            }
            GroupAction::Delete(arg) => delete_group(api, console, &arg.title())?,
            GroupAction::Edit {
                field: GroupField::Title,
            } => rename_group(api, console)?,
        },
        ReplCommand::Note { action } => match action {
            NoteAction::Select(arg) => select_note(api, console, &arg.title())?,
            NoteAction::Create(arg) => create_note(api, console, &arg.title())?,
            NoteAction::Read => {
                if let Some(note) = api.read_note()?.note {
                    render::note(console.out(), &note)?;
                }
            }
            NoteAction::Info => {
                let result = api.note_info()?;
                render::messages(console.out(), &result.messages)?;
            }
            NoteAction::Edit {
                field: EditField::Text,
            } => edit_note_text(api, console)?,
            NoteAction::Edit {
                field: EditField::Title,
            } => edit_note_title(api, console)?,
            NoteAction::Delete => delete_note(api, console)?,
        },
    }
    Ok(Flow::Continue)
}

fn list_groups<D: Database, R: BufRead, W: Write>(
    api: &NotesApi<D>,
    console: &mut Console<R, W>,
) -> Result<()> {
    let result = api.list_groups()?;
    render::groups(console.out(), &result.groups, api.session().group())?;
    Ok(())
}

fn list_notes<D: Database, R: BufRead, W: Write>(
    api: &NotesApi<D>,
    console: &mut Console<R, W>,
) -> Result<()> {
    let result = api.list_notes()?;
    let attached = api.session().note().map(|note| note.title.as_str());
    render::listing(console.out(), &result.listing, attached)?;
    Ok(())
}

fn select_group<D: Database, R: BufRead, W: Write>(
    api: &mut NotesApi<D>,
    console: &mut Console<R, W>,
    title: &str,
) -> Result<()> {
    match api.select_group(title) {
        Ok(result) => render::messages(console.out(), &result.messages)?,
        Err(err) => {
            render::error(console.out(), &err.to_string())?;
            render::suggestions(console.out(), api)?;
        }
    }
    Ok(())
}

fn select_note<D: Database, R: BufRead, W: Write>(
    api: &mut NotesApi<D>,
    console: &mut Console<R, W>,
    title: &str,
) -> Result<()> {
    match api.select_note(title) {
        Ok(result) => render::messages(console.out(), &result.messages)?,
        Err(err) => {
            render::error(console.out(), &err.to_string())?;
            render::suggestions(console.out(), api)?;
        }
    }
    Ok(())
}

fn rename_group<D: Database, R: BufRead, W: Write>(
    api: &mut NotesApi<D>,
    console: &mut Console<R, W>,
) -> Result<()> {
    writeln!(console.out(), "Enter the new group title:")?;
    let title = console.read_title()?;
    let result = api.rename_group(&title)?;
    render::messages(console.out(), &result.messages)?;
    Ok(())
}

fn delete_group<D: Database, R: BufRead, W: Write>(
    api: &mut NotesApi<D>,
    console: &mut Console<R, W>,
    title: &str,
) -> Result<()> {
    api.check_delete_group(title)?;
    if confirm_delete(console)? {
        let result = api.delete_group(title)?;
        render::messages(console.out(), &result.messages)?;
    }
    Ok(())
}

fn create_note<D: Database, R: BufRead, W: Write>(
    api: &mut NotesApi<D>,
    console: &mut Console<R, W>,
    title: &str,
) -> Result<()> {
    api.check_create_note(title)?;
    writeln!(
        console.out(),
        "Enter the note text, finish with a line holding a single '.':"
    )?;
    let text = console.read_text()?;
    let result = api.create_note(title, &text)?;
    render::messages(console.out(), &result.messages)?;
    Ok(())
}

fn edit_note_text<D: Database, R: BufRead, W: Write>(
    api: &mut NotesApi<D>,
    console: &mut Console<R, W>,
) -> Result<()> {
    if let Some(note) = api.read_note()?.note {
        render::note(console.out(), &note)?;
    }
    writeln!(
        console.out(),
        "Enter the new text, finish with a line holding a single '.':"
    )?;
    let text = console.read_text()?;
    let result = api.edit_note_text(&text)?;
    render::messages(console.out(), &result.messages)?;
    Ok(())
}

fn edit_note_title<D: Database, R: BufRead, W: Write>(
    api: &mut NotesApi<D>,
    console: &mut Console<R, W>,
) -> Result<()> {
    api.read_note()?;
    writeln!(console.out(), "Enter the new note title:")?;
    let title = console.read_title()?;
    let result = api.edit_note_title(&title)?;
    render::messages(console.out(), &result.messages)?;
    Ok(())
}

fn delete_note<D: Database, R: BufRead, W: Write>(
    api: &mut NotesApi<D>,
    console: &mut Console<R, W>,
) -> Result<()> {
    api.read_note()?;
    if confirm_delete(console)? {
        let result = api.delete_note()?;
        render::messages(console.out(), &result.messages)?;
    }
    Ok(())
}

fn confirm_delete<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<bool> {
    match console.confirm(DELETE_QUESTION)? {
        Confirmation::Yes => Ok(true),
        Confirmation::No => {
            render::status(console.out(), "The deletion was rejected")?;
            Ok(false)
        }
        Confirmation::Invalid => {
            render::error(console.out(), "Invalid input")?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::setup::parse_line;
    use mynotesapp::store::json_store::InMemoryDatabase;
    use std::io::Cursor;

    type TestConsole = Console<Cursor<Vec<u8>>, Vec<u8>>;

    fn setup(input: &str) -> (NotesApi<InMemoryDatabase>, TestConsole) {
        colored::control::set_override(false);
        let api = NotesApi::new(InMemoryDatabase::in_memory().unwrap());
        let console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        (api, console)
    }

    fn run(
        api: &mut NotesApi<InMemoryDatabase>,
        console: &mut TestConsole,
        line: &str,
    ) -> Result<Flow> {
        dispatch(api, console, parse_line(line).unwrap())
    }

    fn output(console: TestConsole) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn quit_ends_the_loop() {
        let (mut api, mut console) = setup("");
        assert_eq!(run(&mut api, &mut console, "quit").unwrap(), Flow::Quit);
        assert_eq!(run(&mut api, &mut console, "groups").unwrap(), Flow::Continue);
    }

    #[test]
    fn create_note_reads_text_until_dot() {
        let (mut api, mut console) = setup("line one\nline two\n.\n");
        run(&mut api, &mut console, "group select Home").unwrap();
        run(&mut api, &mut console, "note create Shopping list").unwrap();

        let note = api.read_note().unwrap().note.unwrap();
        assert_eq!(note.title, "Shopping list");
        assert_eq!(note.text, "line one\nline two");
        assert!(output(console).contains("Note 'Shopping list' was successfully created"));
    }

    #[test]
    fn create_note_is_checked_before_text_entry() {
        let (mut api, mut console) = setup("should stay unread\n");
        let err = run(&mut api, &mut console, "note create Plan").unwrap_err();
        assert_eq!(err.to_string(), "No group selected");
        assert_eq!(console.read_line().unwrap().as_deref(), Some("should stay unread"));
    }

    #[test]
    fn delete_group_asks_first() {
        let (mut api, mut console) = setup("n\ny\n");
        run(&mut api, &mut console, "group create Work").unwrap();

        run(&mut api, &mut console, "group delete Work").unwrap();
        assert!(api.list_groups().unwrap().groups.contains(&"Work".to_string()));

        run(&mut api, &mut console, "group delete Work").unwrap();
        assert_eq!(api.list_groups().unwrap().groups, vec!["Home"]);

        let text = output(console);
        assert!(text.contains("The deletion was rejected"));
        assert!(text.contains("Group 'Work' was successfully deleted"));
    }

    #[test]
    fn unknown_group_is_rejected_without_prompt() {
        let (mut api, mut console) = setup("");
        let err = run(&mut api, &mut console, "group delete Nowhere").unwrap_err();
        assert_eq!(err.to_string(), "Group 'Nowhere' doesn't exist");
        assert!(!output(console).contains(DELETE_QUESTION));
    }

    #[test]
    fn failed_select_lists_known_titles() {
        let (mut api, mut console) = setup("");
        run(&mut api, &mut console, "group select Nowhere").unwrap();
        let text = output(console);
        assert!(text.contains("Group 'Nowhere' doesn't exist"));
        assert!(text.contains("Known titles: Home"));
    }

    #[test]
    fn rename_group_prompts_for_title() {
        let (mut api, mut console) = setup("Projects\n");
        run(&mut api, &mut console, "group create Work").unwrap();
        run(&mut api, &mut console, "group edit title").unwrap();

        assert_eq!(api.session().group(), Some("Projects"));
        assert!(output(console).contains("Group title was successfully changed to 'Projects'"));
    }

    #[test]
    fn edit_text_without_note_fails_before_prompt() {
        let (mut api, mut console) = setup("");
        let err = run(&mut api, &mut console, "note edit text").unwrap_err();
        assert_eq!(err.to_string(), "No note selected");
    }

    #[test]
    fn notes_listing_points_at_attached_note() {
        let (mut api, mut console) = setup(".\n");
        run(&mut api, &mut console, "group select Home").unwrap();
        run(&mut api, &mut console, "note create Plan").unwrap();
        run(&mut api, &mut console, "notes").unwrap();
        assert!(output(console).contains("Group: Home\n  1. Plan  <--\n"));
    }
}
