//! # Rendering Module
//!
//! Turns `CmdResult` pieces into colored terminal lines. Every function writes to a
//! caller-supplied `Write`, so tests render into a `Vec<u8>`.
//!
//! Colors: status messages green, errors red, warnings yellow, group and note names cyan.
//! `colored` honors `NO_COLOR`, which the end-to-end tests set.

use super::setup::HelpTopic;
use chrono::{DateTime, Utc};
use colored::Colorize;
use mynotesapp::api::NotesApi;
use mynotesapp::commands::{CmdMessage, MessageLevel, Session};
use mynotesapp::listing::ListingLine;
use mynotesapp::model::Note;
use mynotesapp::store::Database;
use std::io::{self, Write};

pub const POINTER: &str = "<--";
const RULE: &str = "--------------------------------";
const COMMAND_WIDTH: usize = 30;

const MAIN_COMMANDS: &[(&str, &str)] = &[
    ("help", "Show main commands"),
    ("cls", "Clear terminal screen"),
    ("help groups", "Show group commands"),
    ("help notes", "Show note commands"),
    ("quit", "Exit the program"),
];

const GROUP_COMMANDS: &[(&str, &str)] = &[
    ("groups", "Show list of groups"),
    ("group select <title>", "Select a group"),
    ("group create <title>", "Create a new group"),
    ("group edit title", "Rename selected group"),
    ("group delete <title>", "Delete a group and its notes"),
];

const NOTE_COMMANDS: &[(&str, &str)] = &[
    ("notes", "Show every group with its notes"),
    ("note select <title>", "Select a note of the selected group"),
    ("note read", "Show text"),
    ("note info", "Show size and dates"),
    ("note create <title>", "Create a note in the selected group"),
    ("note edit title", "Rename selected note"),
    ("note edit text", "Replace text of selected note"),
    ("note delete", "Delete selected note"),
];

pub fn welcome(out: &mut impl Write, location: &str) -> io::Result<()> {
    writeln!(out, "Welcome to MyNotes!")?;
    writeln!(out, "{}", format!("Notes are stored in {}", location).dimmed())?;
    writeln!(out, "Enter 'help' to show the commands")
}

pub fn messages(out: &mut impl Write, messages: &[CmdMessage]) -> io::Result<()> {
    for message in messages {
        match message.level {
            MessageLevel::Info => writeln!(out, "{}", message.content)?,
            MessageLevel::Success => writeln!(out, "{}", message.content.green())?,
            MessageLevel::Warning => writeln!(out, "{}", message.content.yellow())?,
            MessageLevel::Error => writeln!(out, "{}", message.content.red())?,
        }
    }
    Ok(())
}

pub fn status(out: &mut impl Write, text: &str) -> io::Result<()> {
    writeln!(out, "{}", text.green())
}

pub fn error(out: &mut impl Write, text: &str) -> io::Result<()> {
    writeln!(out, "{}", text.red())
}

/// The line printed above every prompt.
pub fn attached(out: &mut impl Write, session: &Session) -> io::Result<()> {
    match (session.group(), session.note()) {
        (Some(group), Some(note)) => writeln!(
            out,
            "\nAttached group: {} Attached note: {}",
            group.cyan(),
            note.title.cyan()
        ),
        (Some(group), None) => writeln!(out, "\nAttached group: {}", group.cyan()),
        _ => writeln!(out, "\n{}", "No group selected".cyan()),
    }
}

pub fn groups(out: &mut impl Write, groups: &[String], attached: Option<&str>) -> io::Result<()> {
    writeln!(out, "Groups:")?;
    for (index, title) in groups.iter().enumerate() {
        let line = format!("{}. {}", index + 1, title);
        if attached == Some(title.as_str()) {
            writeln!(out, "  {}  {}", line, POINTER.cyan())?;
        } else {
            writeln!(out, "  {}", line)?;
        }
    }
    Ok(())
}

pub fn listing(
    out: &mut impl Write,
    lines: &[ListingLine],
    attached_note: Option<&str>,
) -> io::Result<()> {
    for line in lines {
        match line {
            ListingLine::Group(_) => writeln!(out, "{}", line.to_string().cyan())?,
            ListingLine::Note { title, .. } if attached_note == Some(title.as_str()) => {
                writeln!(out, "  {}  {}", line, POINTER.cyan())?
            }
            ListingLine::Note { .. } => writeln!(out, "  {}", line)?,
            ListingLine::Empty => writeln!(out, "  {}", line.to_string().dimmed())?,
            ListingLine::Separator => writeln!(out)?,
        }
    }
    Ok(())
}

pub fn note(out: &mut impl Write, note: &Note) -> io::Result<()> {
    writeln!(
        out,
        "{}  {}",
        note.title.bold(),
        format!("edited {}", format_time_ago(note.last_change_date)).dimmed()
    )?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "{}", note.text.trim_end())
}

pub fn help(out: &mut impl Write, topic: Option<HelpTopic>) -> io::Result<()> {
    let (heading, rows) = match topic {
        None => ("Main commands:", MAIN_COMMANDS),
        Some(HelpTopic::Groups) => ("Group commands:", GROUP_COMMANDS),
        Some(HelpTopic::Notes) => ("Note commands:", NOTE_COMMANDS),
    };
    writeln!(out, "{}", heading.cyan())?;
    for (command, description) in rows {
        writeln!(
            out,
            "  {:<width$}{}",
            command,
            description,
            width = COMMAND_WIDTH
        )?;
    }
    Ok(())
}

/// Titles the user could have meant, shown after a failed selection.
pub fn suggestions<D: Database>(out: &mut impl Write, api: &NotesApi<D>) -> io::Result<()> {
    if let Ok(result) = api.completions() {
        if !result.completions.is_empty() {
            let known = result.completions.join(", ");
            writeln!(out, "{}", format!("Known titles: {}", known).dimmed())?;
        }
    }
    Ok(())
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    timeago::Formatter::new().convert(duration.to_std().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        colored::control::set_override(false);
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn groups_point_at_attached() {
        let titles = vec!["Home".to_string(), "Work".to_string()];
        let text = render(|out| groups(out, &titles, Some("Work")));
        assert_eq!(text, "Groups:\n  1. Home\n  2. Work  <--\n");
    }

    #[test]
    fn listing_layout() {
        let lines = vec![
            ListingLine::Group("Home".into()),
            ListingLine::Empty,
            ListingLine::Separator,
            ListingLine::Group("Work".into()),
            ListingLine::Note {
                position: 1,
                title: "Plan".into(),
            },
        ];
        let text = render(|out| listing(out, &lines, Some("Plan")));
        assert_eq!(
            text,
            "Group: Home\n  empty group\n\nGroup: Work\n  1. Plan  <--\n"
        );
    }

    #[test]
    fn attached_line_variants() {
        let session = Session::default();
        assert_eq!(
            render(|out| attached(out, &session)),
            "\nNo group selected\n"
        );
    }

    #[test]
    fn note_shows_title_rule_and_text() {
        let note = Note::new("Plan", "first\nsecond\n");
        let text = render(|out| super::note(out, &note));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Plan  edited "));
        assert_eq!(lines[1], RULE);
        assert_eq!(&lines[2..], ["first", "second"]);
    }

    #[test]
    fn help_lists_topic_commands() {
        let text = render(|out| help(out, Some(HelpTopic::Notes)));
        assert!(text.starts_with("Note commands:\n"));
        assert!(text.contains("note edit text"));
        assert!(!text.contains("group create"));
    }
}
