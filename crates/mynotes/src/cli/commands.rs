use super::console::{Confirmation, Console};
use super::handlers::{self, Flow};
use super::render;
use super::setup::{parse_line, Cli};
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use log::{info, warn};
use mynotesapp::api::NotesApi;
use mynotesapp::config::NotesConfig;
use mynotesapp::error::NotesError;
use mynotesapp::init::{self, NotesContext};
use mynotesapp::store::Database;
use std::io::{self, BufRead, Write};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = NotesConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    start_logging(&config);

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());

    let Some(db) = open_database(&config, &mut console)? else {
        return Ok(());
    };
    let NotesContext {
        mut api, location, ..
    } = init::context(db, config)?;
    repl(&mut api, &mut console, &location)
}

/// Logging problems are reported but never stop the program.
fn start_logging(config: &NotesConfig) {
    let level = config.log_level();
    let outcome = config
        .log_dir()
        .and_then(|dir| mynotesapp::init_logging(&level, &dir));
    if let Err(err) = outcome {
        eprintln!("{}", format!("Logging disabled: {}", err).yellow());
    }
}

/// Opens the configured backend, offering to create or initialize a missing or empty notes
/// file. `None` means the user declined.
fn open_database<R: BufRead, W: Write>(
    config: &NotesConfig,
    console: &mut Console<R, W>,
) -> Result<Option<Box<dyn Database>>> {
    match init::open_backend(config) {
        Ok(db) => Ok(Some(db)),
        Err(NotesError::StoreMissing(path)) => offer_initialize(
            config,
            console,
            &format!(
                "The notes file {} doesn't exist. Create it [Y/N]?",
                path.display()
            ),
        ),
        Err(NotesError::StoreEmpty(path)) => offer_initialize(
            config,
            console,
            &format!(
                "The notes file {} is empty. Fill it with default content [Y/N]?",
                path.display()
            ),
        ),
        Err(err) => Err(err.into()),
    }
}

fn offer_initialize<R: BufRead, W: Write>(
    config: &NotesConfig,
    console: &mut Console<R, W>,
    question: &str,
) -> Result<Option<Box<dyn Database>>> {
    if console.confirm(question)? == Confirmation::Yes {
        let db = init::initialize_json(config)?;
        render::status(console.out(), "The notes file is ready")?;
        Ok(Some(db))
    } else {
        render::error(console.out(), "Nothing to load, closing MyNotes")?;
        Ok(None)
    }
}

/// Reads and runs commands until `quit` or end of input.
pub fn repl<D, R, W>(
    api: &mut NotesApi<D>,
    console: &mut Console<R, W>,
    location: &str,
) -> Result<()>
where
    D: Database,
    R: BufRead,
    W: Write,
{
    render::welcome(console.out(), location)?;
    info!("event=session_start module=cli status=ok");

    loop {
        render::attached(console.out(), api.session())?;
        let Some(line) = console.prompt()? else {
            writeln!(console.out())?;
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(_) => {
                render::error(console.out(), "Wrong command, try again")?;
                continue;
            }
        };

        match handlers::dispatch(api, console, command) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(err) => {
                warn!("event=command module=cli status=error error={}", err);
                render::error(console.out(), &err.to_string())?;
            }
        }
    }

    info!("event=session_end module=cli status=ok");
    render::status(console.out(), "Goodbye!")?;
    Ok(())
}
