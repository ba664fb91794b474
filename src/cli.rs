//! CLI module
//!
//! This module provides the command-line interface for Ren: an interactive
//! chat by default, plus a few one-shot subcommands.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::{
    config::{Config, DEFAULT_DATA_DIR, DEFAULT_NOTES_FILE, DEFAULT_TASKS_FILE},
    guide::{get_guide_string, GuideMode},
    models::{Core, Reply, Session},
    error::StorageError,
    storage::Storage,
    ui,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the tasks and notes files
    #[arg(short, long, env = "REN_DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,

    /// Name of the tasks file inside the data directory
    #[arg(long, env = "REN_TASKS_FILE", default_value = DEFAULT_TASKS_FILE, global = true)]
    tasks_file: String,

    /// Name of the notes file inside the data directory
    #[arg(long, env = "REN_NOTES_FILE", default_value = DEFAULT_NOTES_FILE, global = true)]
    notes_file: String,

    /// Only save when the chat ends
    #[arg(long, global = true)]
    no_autosave: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log more to stderr (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with Ren (the default)
    Chat,

    /// Run a single chat command, e.g. `ren exec todo read book`
    Exec {
        /// The command and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Print all tasks and notes as JSON
    Export {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Interactive guide on how to use Ren
    Guide,

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            data_dir: self.data_dir.clone(),
            tasks_file: self.tasks_file.clone(),
            notes_file: self.notes_file.clone(),
            autosave: !self.no_autosave,
        }
    }
}

/// Run the CLI application
pub async fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.config();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let storage = Storage::open(&config)?;
            let core = load_core(&storage)?;
            let input = BufReader::new(tokio::io::stdin());
            chat(core, storage, config.autosave, input).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Exec { words } => {
            let storage = Storage::open(&config)?;
            let core = load_core(&storage)?;

            let reply = exec(&core, &storage, &words.join(" "))?;
            print_reply(&reply);
            Ok(exit_status(&reply))
        }

        Commands::Export { pretty } => {
            let storage = Storage::open(&config)?;
            let snapshot = storage.load()?;
            let json = if pretty {
                serde_json::to_string_pretty(&snapshot)?
            } else {
                serde_json::to_string(&snapshot)?
            };
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Guide => {
            println!("{}", get_guide_string(GuideMode::Cli));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Completions { shell } => {
            // Generate completions for the specified shell
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so they never interleave with the chat on stdout
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn load_core(storage: &Storage) -> Result<Core, Box<dyn std::error::Error>> {
    let snapshot = storage.load()?;
    tracing::info!(
        tasks = snapshot.tasks.len(),
        notes = snapshot.notes.len(),
        "Loaded data from {}",
        storage.tasks_path().display()
    );
    Ok(Core::new(Session::from(snapshot)))
}

/// Runs one command, saving only if it changed something
fn exec(core: &Core, storage: &Storage, line: &str) -> Result<Reply, StorageError> {
    let reply = core.handle(line);
    if reply.changed {
        storage.save(&core.snapshot())?;
    }
    Ok(reply)
}

fn exit_status(reply: &Reply) -> ExitCode {
    if reply.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Reads commands from `input` until `bye` or end of input, then saves
async fn chat<R>(
    core: Core,
    storage: Storage,
    autosave: bool,
    input: R,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let storage = Arc::new(storage);
    let saver = autosave.then(|| spawn_autosave(core.clone(), storage.clone()));

    print_chat_reply(&Reply::new(ui::greet()));

    let mut lines = input.lines();
    loop {
        print_prompt()?;

        let Some(line) = lines.next_line().await? else {
            // End of input counts as saying goodbye
            println!();
            print_chat_reply(&core.handle("bye"));
            break;
        };

        if line.trim().is_empty() {
            continue;
        }

        let reply = core.handle(&line);
        print_chat_reply(&reply);

        if reply.exit {
            break;
        }
    }

    if let Some(saver) = saver {
        saver.abort();
    }
    storage.save(&core.snapshot())?;
    tracing::info!("Session ended, data saved");

    Ok(())
}

/// Saves after every change announced by the core
fn spawn_autosave(core: Core, storage: Arc<Storage>) -> JoinHandle<()> {
    let mut updates = core.subscribe();

    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(()) | Err(RecvError::Lagged(_)) => {
                    if let Err(e) = storage.save(&core.snapshot()) {
                        tracing::warn!("Autosave failed: {}", e);
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn print_prompt() -> io::Result<()> {
    print!("{} ", ">".bold());
    io::stdout().flush()
}

fn print_chat_reply(reply: &Reply) {
    let divider = "─".repeat(60);
    println!("{}", divider.dimmed());
    print_reply(reply);
    println!("{}", divider.dimmed());
}

fn print_reply(reply: &Reply) {
    if reply.is_error() {
        println!("{}", reply.message.red());
    } else {
        println!("{}", reply.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteList, TaskList};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};
    use tokio::io::AsyncWriteExt;

    fn open_storage() -> (TempDir, Storage) {
        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().join("data"),
            ..Config::default()
        };
        let storage = Storage::open(&config).unwrap();
        (dir, storage)
    }

    fn empty_core() -> Core {
        Core::new(Session::new(TaskList::new(), NoteList::new()))
    }

    fn saved_tasks(storage: &Storage) -> String {
        fs::read_to_string(storage.tasks_path()).unwrap()
    }

    #[tokio::test]
    async fn test_chat_autosaves_before_bye() {
        let (_dir, storage) = open_storage();
        let tasks_path = storage.tasks_path().to_path_buf();
        let (mut keyboard, input) = tokio::io::duplex(64);

        let typist = tokio::spawn(async move {
            keyboard.write_all(b"todo water plants\n").await.unwrap();
            let mut seen = String::new();
            for _ in 0..200 {
                seen = fs::read_to_string(&tasks_path).unwrap();
                if !seen.is_empty() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            keyboard.write_all(b"bye\n").await.unwrap();
            seen
        });

        chat(empty_core(), storage.clone(), true, BufReader::new(input))
            .await
            .unwrap();

        assert_eq!(typist.await.unwrap(), "T | 0 | water plants\n");
        assert_eq!(saved_tasks(&storage), "T | 0 | water plants\n");
    }

    #[tokio::test]
    async fn test_chat_saves_at_end_of_input() {
        let (_dir, storage) = open_storage();
        let input: &[u8] = b"todo read book\nnote buy milk\n";

        chat(empty_core(), storage.clone(), false, input).await.unwrap();

        assert_eq!(saved_tasks(&storage), "T | 0 | read book\n");
        assert_eq!(
            fs::read_to_string(storage.notes_path()).unwrap(),
            "buy milk\n"
        );
    }

    #[tokio::test]
    async fn test_chat_stops_reading_after_bye() {
        let (_dir, storage) = open_storage();
        let input: &[u8] = b"todo read book\n\nbye\ntodo never added\n";

        chat(empty_core(), storage.clone(), false, input).await.unwrap();

        assert_eq!(saved_tasks(&storage), "T | 0 | read book\n");
    }

    #[test]
    fn test_exec_saves_only_changes() {
        let (_dir, storage) = open_storage();
        let core = empty_core();

        let reply = exec(&core, &storage, "list").unwrap();
        assert!(!reply.changed);
        assert_eq!(saved_tasks(&storage), "");

        let reply = exec(&core, &storage, "todo read book").unwrap();
        assert!(reply.changed);
        assert_eq!(saved_tasks(&storage), "T | 0 | read book\n");
        assert_eq!(exit_status(&reply), ExitCode::SUCCESS);
    }

    #[test]
    fn test_exec_error_fails_without_saving() {
        let (_dir, storage) = open_storage();
        let core = empty_core();

        let reply = exec(&core, &storage, "mark 1").unwrap();
        assert!(reply.is_error());
        assert!(!reply.changed);
        assert_eq!(saved_tasks(&storage), "");
        assert_eq!(exit_status(&reply), ExitCode::FAILURE);
    }
}
