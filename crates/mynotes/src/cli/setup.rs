use clap::{Args, Parser, Subcommand, ValueEnum};
use mynotesapp::config::{BackendKind, NotesConfig};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.4.0"
/// Format for dev builds: "v0.4.0\ndev: abc1234 2024-01-15 14:30"
pub fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

/// Process arguments. Every option overrides the matching configuration key.
#[derive(Parser, Debug)]
#[command(
    name = "mynotes",
    bin_name = "mynotes",
    version = get_version(),
    about = "Interactive terminal notes, kept in groups",
    long_about = None
)]
pub struct Cli {
    /// Storage backend: json, sqlite or surreal
    #[arg(long, help_heading = "Storage")]
    pub backend: Option<BackendKind>,

    /// Path of the JSON notes document
    #[arg(long, help_heading = "Storage")]
    pub json_path: Option<PathBuf>,

    /// Path of the SQLite database
    #[arg(long, help_heading = "Storage")]
    pub sqlite_path: Option<PathBuf>,

    /// SurrealDB endpoint, e.g. mem:// or surrealkv:///path/to/dir
    #[arg(long, help_heading = "Storage")]
    pub surreal_endpoint: Option<String>,

    /// Configuration file to use instead of the default one
    #[arg(long, help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, help_heading = "Options")]
    pub log_level: Option<String>,

    /// Directory for log files (absolute)
    #[arg(long, help_heading = "Options")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Layers the command-line overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut NotesConfig) {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(path) = &self.json_path {
            config.json.path = Some(path.clone());
        }
        if let Some(path) = &self.sqlite_path {
            config.sqlite.path = Some(path.clone());
        }
        if let Some(endpoint) = &self.surreal_endpoint {
            config.surreal.endpoint = Some(endpoint.clone());
        }
        if let Some(level) = &self.log_level {
            config.log.level = Some(level.clone());
        }
        if let Some(dir) = &self.log_dir {
            config.log.dir = Some(dir.clone());
        }
    }
}

/// One line typed at the prompt. The first word names the command.
#[derive(Parser, Debug)]
#[command(multicall = true, disable_help_subcommand = true)]
pub struct Repl {
    #[command(subcommand)]
    pub command: ReplCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ReplCommand {
    /// Show the main commands, or the group or note commands
    Help {
        #[arg(value_enum)]
        topic: Option<HelpTopic>,
    },
    /// Clear the terminal screen
    Cls,
    /// Exit the program
    #[command(alias = "exit")]
    Quit,
    /// Show the list of groups
    Groups,
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },
    /// Show every group with its notes
    Notes,
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum HelpTopic {
    Groups,
    Notes,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum GroupAction {
    Select(TitleArg),
    Create(TitleArg),
    Delete(TitleArg),
    Edit {
        #[command(subcommand)]
        field: GroupField,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum GroupField {
    Title,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum NoteAction {
    Select(TitleArg),
    Create(TitleArg),
    Read,
    Info,
    Edit {
        #[command(subcommand)]
        field: NoteField,
    },
    Delete,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum NoteField {
    Text,
    Title,
}

/// A title given as trailing words.
#[derive(Args, Debug, PartialEq, Eq)]
pub struct TitleArg {
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub words: Vec<String>,
}

impl TitleArg {
    pub fn title(&self) -> String {
        self.words.join(" ")
    }
}

/// Parses one prompt line.
pub fn parse_line(line: &str) -> Result<ReplCommand, clap::Error> {
    Repl::try_parse_from(line.split_whitespace()).map(|repl| repl.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(words: &[&str]) -> TitleArg {
        TitleArg {
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_line("groups").unwrap(), ReplCommand::Groups);
        assert_eq!(parse_line("  notes ").unwrap(), ReplCommand::Notes);
        assert_eq!(parse_line("quit").unwrap(), ReplCommand::Quit);
        assert_eq!(parse_line("cls").unwrap(), ReplCommand::Cls);
    }

    #[test]
    fn parses_help_topics() {
        assert_eq!(
            parse_line("help").unwrap(),
            ReplCommand::Help { topic: None }
        );
        assert_eq!(
            parse_line("help notes").unwrap(),
            ReplCommand::Help {
                topic: Some(HelpTopic::Notes)
            }
        );
    }

    #[test]
    fn multi_word_titles_are_joined() {
        let command = parse_line("group create   Big   Plans").unwrap();
        assert_eq!(
            command,
            ReplCommand::Group {
                action: GroupAction::Create(title(&["Big", "Plans"]))
            }
        );
        if let ReplCommand::Group {
            action: GroupAction::Create(arg),
        } = command
        {
            assert_eq!(arg.title(), "Big Plans");
        }
    }

    #[test]
    fn missing_title_parses_as_empty() {
        let command = parse_line("note select").unwrap();
        assert_eq!(
            command,
            ReplCommand::Note {
                action: NoteAction::Select(title(&[]))
            }
        );
    }

    #[test]
    fn parses_edit_commands() {
        assert_eq!(
            parse_line("group edit title").unwrap(),
            ReplCommand::Group {
                action: GroupAction::Edit {
                    field: GroupField::Title
                }
            }
        );
        assert_eq!(
            parse_line("note edit text").unwrap(),
            ReplCommand::Note {
                action: NoteAction::Edit {
                    field: NoteField::Text
                }
            }
        );
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(parse_line("launch rockets").is_err());
        assert!(parse_line("note fly").is_err());
        assert!(parse_line("group edit colour").is_err());
    }

    #[test]
    fn overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "mynotes",
            "--backend",
            "sqlite",
            "--sqlite-path",
            "/tmp/notes.db",
            "--log-level",
            "warn",
        ])
        .unwrap();
        let mut config = NotesConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.sqlite.path, Some(PathBuf::from("/tmp/notes.db")));
        assert_eq!(config.log.level.as_deref(), Some("warn"));
        assert_eq!(config.json.path, None);
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["mynotes", "--backend", "mongo"]).is_err());
    }
}
