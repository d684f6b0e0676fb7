//! # mynotes Architecture
//!
//! mynotes keeps notes in named groups and can persist them to one of three interchangeable
//! backends: a JSON document, a SQLite database or a SurrealDB store. This crate is the
//! UI-agnostic core; the `mynotes` binary is one client of it.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (crates/mynotes)                                    │
//! │  - argument parsing, command loop, prompts, rendering       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - owns the backend and the session                         │
//! │  - returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*)                                 │
//! │  - precondition checks and user-facing messages             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/*)                                    │
//! │  - the `Database` trait and its three implementations       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing below the client touches stdout, stdin or process exit codes.
//!
//! ## Picking a Backend
//!
//! [`config::NotesConfig`] names the backend; [`init::initialize`] opens it and hands back a
//! [`api::NotesApi`] over a `Box<dyn Database>`. Every backend passes the same contract suite
//! in `tests/backend_contract.rs`.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod listing;
pub mod logging;
pub mod model;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
