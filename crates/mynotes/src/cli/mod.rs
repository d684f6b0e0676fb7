//! # CLI Behavior
//!
//! This is **one possible UI client** for mynotes, not the application itself.
//! It is the only place that knows about terminal I/O, exit codes and output formatting.
//!
//! ## Session Flow
//!
//! 1. Process arguments pick the backend and override configuration.
//! 2. The backend is opened. For the JSON backend a missing file offers to create it, an
//!    empty file offers to initialize it, and an unreadable file aborts with the parse error.
//! 3. A command loop reads one command per line until `quit` or end of input.
//!
//! Before every prompt the loop prints which group and note are attached.
//!
//! ## Commands
//!
//! Lines are split on whitespace and parsed by a multicall clap parser, so the first word is
//! the command. Titles may span several words; they are joined with single spaces.
//! Anything that does not parse prints `Wrong command, try again`.
//!
//! ## Text Entry
//!
//! Note text is entered line by line and ends at a line holding a single `.` or at end of
//! input. Titles typed at a prompt are cut to [`console::TITLE_LIMIT`] characters and text
//! lines to [`console::LINE_LIMIT`].
//!
//! ## Errors
//!
//! A failing command prints its message and the loop carries on. Only startup failures
//! (bad configuration, an unreadable store) end the process with a non-zero status.
//!
//! ## Module Structure
//!
//! - `commands`: startup and the command loop
//! - `console`: line-oriented input and prompts over any `BufRead`/`Write` pair
//! - `handlers`: one function per command, calling the API and rendering the result
//! - `render`: colored output
//! - `setup`: clap definitions for process arguments and loop commands

mod commands;
mod console;
mod handlers;
mod render;
pub mod setup;

pub use commands::run;
