//! # mynotes CLI Architecture
//!
//! The binary is intentionally thin: the client lives in `src/cli/`, while this file only
//! invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/mynotesapp/`: UI-agnostic library (storage backends, commands, config)
//! - `crates/mynotes/`: this interactive client
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/mynotes/src/cli/)                        │
//! │  - process arguments and command-line parsing (setup.rs)    │
//! │  - line input, prompts, confirmations (console.rs)          │
//! │  - one handler per command (handlers.rs)                    │
//! │  - colored terminal output (render.rs)                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (mynotesapp::api::NotesApi)                      │
//! │  - validation, session, structured `CmdResult` values       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI layer owns every user-facing concern: argument parsing, backend selection,
//! load-fault recovery, dispatch, error display and rendering.
//!
//! ## Testing Approach
//!
//! - **Library**: command, backend and contract tests live in `mynotesapp`.
//! - **CLI**: parsing and rendering are unit tested against in-memory buffers; the
//!   whole loop is driven end to end through stdin in `tests/repl_e2e.rs`.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
