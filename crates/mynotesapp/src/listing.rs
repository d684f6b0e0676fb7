//! The grouped notes listing shown by the `notes` command.
//!
//! Every backend produces the same sequence: a header per group, the group's notes numbered
//! from 1, an [`ListingLine::Empty`] marker for a group without notes, and a separator between
//! groups (never after the last one).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingLine {
    Group(String),
    Note { position: usize, title: String },
    Empty,
    Separator,
}

impl fmt::Display for ListingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingLine::Group(title) => write!(f, "Group: {}", title),
            ListingLine::Note { position, title } => write!(f, "{}. {}", position, title),
            ListingLine::Empty => write!(f, "empty group"),
            ListingLine::Separator => Ok(()),
        }
    }
}

/// Builds the listing from `(group title, note titles)` pairs in store order.
pub fn grouped_listing<I>(groups: I) -> Vec<ListingLine>
where
    I: IntoIterator<Item = (String, Vec<String>)>,
{
    let mut lines = Vec::new();
    for (title, notes) in groups {
        if !lines.is_empty() {
            lines.push(ListingLine::Separator);
        }
        lines.push(ListingLine::Group(title));
        if notes.is_empty() {
            lines.push(ListingLine::Empty);
        } else {
            lines.extend(
                notes
                    .into_iter()
                    .enumerate()
                    .map(|(index, title)| ListingLine::Note {
                        position: index + 1,
                        title,
                    }),
            );
        }
    }
    lines
}
