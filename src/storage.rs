//! Flat-file persistence for tasks and notes
//!
//! Tasks are stored one per line as `KIND | DONE | FIELD...`:
//!
//! ```text
//! T | 1 | read book
//! D | 0 | return book | 2019-06-06
//! E | 0 | project meeting | 2019-08-06 1400 | 2019-08-06 1600
//! ```
//!
//! Notes are stored one per line, verbatim. Both files are loaded eagerly and
//! rewritten whole on save. Lines holding only whitespace are skipped on load
//! in either file, rather than reported as corrupt.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::StorageError;
use crate::models::{Note, NoteList, Snapshot, Task, TaskKind, TaskList};
use crate::schedule::When;

const DELIMITER: char = '|';

/// The pair of data files backing a session
#[derive(Debug, Clone)]
pub struct Storage {
    tasks_path: PathBuf,
    notes_path: PathBuf,
}

impl Storage {
    /// Opens the data files named by `config`, creating the directory and
    /// empty files when they do not exist yet
    pub fn open(config: &Config) -> Result<Self, StorageError> {
        if !config.data_dir.is_dir() {
            fs::create_dir_all(&config.data_dir)
                .map_err(|e| StorageError::io(&config.data_dir, e))?;
            tracing::info!("Created data directory {}", config.data_dir.display());
        }

        let storage = Self {
            tasks_path: config.tasks_path(),
            notes_path: config.notes_path(),
        };
        ensure_file(&storage.tasks_path)?;
        ensure_file(&storage.notes_path)?;

        Ok(storage)
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    pub fn notes_path(&self) -> &Path {
        &self.notes_path
    }

    pub fn load_tasks(&self) -> Result<TaskList, StorageError> {
        let contents = read(&self.tasks_path)?;
        let mut tasks = TaskList::new();

        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let task = decode_task(line).map_err(|reason| StorageError::Corrupt {
                path: self.tasks_path.clone(),
                line: number + 1,
                reason,
            })?;
            tasks.add(task);
        }

        tracing::debug!(
            "Loaded {} tasks from {}",
            tasks.len(),
            self.tasks_path.display()
        );
        Ok(tasks)
    }

    pub fn load_notes(&self) -> Result<NoteList, StorageError> {
        let contents = read(&self.notes_path)?;
        let notes: Vec<Note> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Note::new)
            .collect();

        tracing::debug!(
            "Loaded {} notes from {}",
            notes.len(),
            self.notes_path.display()
        );
        Ok(NoteList::from(notes))
    }

    pub fn save_tasks(&self, tasks: &TaskList) -> Result<(), StorageError> {
        let contents: String = tasks
            .iter()
            .map(|task| encode_task(task) + "\n")
            .collect();
        write(&self.tasks_path, &contents)?;

        tracing::debug!("Saved {} tasks to {}", tasks.len(), self.tasks_path.display());
        Ok(())
    }

    pub fn save_notes(&self, notes: &NoteList) -> Result<(), StorageError> {
        let contents: String = notes.iter().map(|note| format!("{}\n", note)).collect();
        write(&self.notes_path, &contents)?;

        tracing::debug!("Saved {} notes to {}", notes.len(), self.notes_path.display());
        Ok(())
    }

    /// Loads both files
    pub fn load(&self) -> Result<Snapshot, StorageError> {
        Ok(Snapshot {
            tasks: self.load_tasks()?,
            notes: self.load_notes()?,
        })
    }

    /// Rewrites both files
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        self.save_tasks(&snapshot.tasks)?;
        self.save_notes(&snapshot.notes)
    }
}

/// Renders a task as one line of the tasks file, without the line break
pub fn encode_task(task: &Task) -> String {
    let done = if task.is_done() { 1 } else { 0 };
    let mut line = format!("{} | {} | {}", task.kind().tag(), done, task.description());

    match task.kind() {
        TaskKind::Todo => {}
        TaskKind::Deadline { by } => {
            line.push_str(" | ");
            line.push_str(by.raw());
        }
        TaskKind::Event { from, to } => {
            line.push_str(" | ");
            line.push_str(from.raw());
            line.push_str(" | ");
            line.push_str(to.raw());
        }
    }

    line
}

/// Parses one line of the tasks file. The error is a human-readable reason.
pub fn decode_task(line: &str) -> Result<Task, String> {
    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if fields.len() < 3 {
        return Err(format!(
            "expected at least 3 '{}'-separated fields, found {}",
            DELIMITER,
            fields.len()
        ));
    }

    let done = match fields[1] {
        "1" => true,
        "0" => false,
        other => return Err(format!("done flag must be 0 or 1, found '{}'", other)),
    };
    if fields[2].is_empty() {
        return Err("task description is empty".to_string());
    }

    let mut task = match (fields[0], &fields[2..]) {
        ("T", [description]) => Task::todo(*description),
        ("D", [description, by]) => Task::deadline(*description, When::new(*by)),
        ("E", [description, from, to]) => {
            Task::event(*description, When::new(*from), When::new(*to))
        }
        (kind @ ("T" | "D" | "E"), rest) => {
            return Err(format!(
                "wrong number of fields for a '{}' task: {}",
                kind,
                rest.len() + 2
            ))
        }
        (kind, _) => return Err(format!("unknown task kind '{}'", kind)),
    };

    if done {
        task.mark_done();
    }
    Ok(task)
}

fn ensure_file(path: &Path) -> Result<(), StorageError> {
    if path.is_file() {
        return Ok(());
    }
    // Never truncates an existing file
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StorageError::io(path, e))?;
    tracing::info!("Created data file {}", path.display());
    Ok(())
}

fn read(path: &Path) -> Result<String, StorageError> {
    fs::read_to_string(path).map_err(|e| StorageError::io(path, e))
}

fn write(path: &Path, contents: &str) -> Result<(), StorageError> {
    fs::write(path, contents).map_err(|e| StorageError::io(path, e))
}
