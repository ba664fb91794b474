//! Core models for Ren
//!
//! This module contains the task and note records, the session that holds
//! them in memory, and `Core`, the shared handle the front ends talk to.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::RenError;
use crate::schedule::When;

/// The three kinds of task Ren knows about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    Todo,
    Deadline { by: When },
    Event { from: When, to: When },
}

impl TaskKind {
    /// Single-letter tag used on screen and in the data file
    pub fn tag(&self) -> char {
        match self {
            TaskKind::Todo => 'T',
            TaskKind::Deadline { .. } => 'D',
            TaskKind::Event { .. } => 'E',
        }
    }

    /// The command word that creates this kind of task
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Todo => "todo",
            TaskKind::Deadline { .. } => "deadline",
            TaskKind::Event { .. } => "event",
        }
    }
}

/// Represents a task on the user's list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    description: String,
    done: bool,
    #[serde(flatten)]
    kind: TaskKind,
}

impl Task {
    fn new(description: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            description: description.into(),
            done: false,
            kind,
        }
    }

    /// Creates a task with only a description
    pub fn todo(description: impl Into<String>) -> Self {
        Self::new(description, TaskKind::Todo)
    }

    /// Creates a task that is due by the given time
    pub fn deadline(description: impl Into<String>, by: When) -> Self {
        Self::new(description, TaskKind::Deadline { by })
    }

    /// Creates a task that spans the given start and end
    pub fn event(description: impl Into<String>, from: When, to: When) -> Self {
        Self::new(description, TaskKind::Event { from, to })
    }

    /// Marks this task as done
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Marks this task as not done
    pub fn mark_undone(&mut self) {
        self.done = false;
    }

    /// Gets the description of this task
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Checks if this task is done
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Gets the kind of this task, along with its dates
    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    /// Case-insensitive substring match on the description
    pub fn matches(&self, keyword: &str) -> bool {
        self.description
            .to_lowercase()
            .contains(&keyword.to_lowercase())
    }

    /// Whether a deadline is due on `date`, or an event runs through it.
    ///
    /// Only dates Ren recognised take part; free-form text never matches.
    pub fn falls_on(&self, date: NaiveDate) -> bool {
        match &self.kind {
            TaskKind::Todo => false,
            TaskKind::Deadline { by } => by.date() == Some(date),
            TaskKind::Event { from, to } => match (from.date(), to.date()) {
                (Some(start), Some(end)) => start <= date && date <= end,
                (Some(day), None) | (None, Some(day)) => day == date,
                (None, None) => false,
            },
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.done { 'X' } else { ' ' };
        write!(f, "[{}][{}] {}", self.kind.tag(), status, self.description)?;
        match &self.kind {
            TaskKind::Todo => Ok(()),
            TaskKind::Deadline { by } => write!(f, " (by: {})", by),
            TaskKind::Event { from, to } => write!(f, " (from: {} to: {})", from, to),
        }
    }
}

/// A free-form, single-line note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Note {
    text: String,
}

impl Note {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The ordered list of tasks. Positions are 0-based here; the chat shows
/// them 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Removes and returns the task at `index`
    pub fn remove(&mut self, index: usize) -> Result<Task, RenError> {
        self.check(index)?;
        Ok(self.tasks.remove(index))
    }

    pub fn get(&self, index: usize) -> Result<&Task, RenError> {
        self.check(index)?;
        Ok(&self.tasks[index])
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Task, RenError> {
        self.check(index)?;
        Ok(&mut self.tasks[index])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Tasks whose description contains `keyword`, with their positions
    pub fn find(&self, keyword: &str) -> Vec<(usize, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.matches(keyword))
            .collect()
    }

    /// Deadlines and events falling on `date`, with their positions
    pub fn on(&self, date: NaiveDate) -> Vec<(usize, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.falls_on(date))
            .collect()
    }

    fn check(&self, index: usize) -> Result<(), RenError> {
        if index < self.tasks.len() {
            Ok(())
        } else {
            Err(RenError::TaskOutOfRange {
                index: index.saturating_add(1),
                len: self.tasks.len(),
            })
        }
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

/// The ordered list of notes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteList {
    notes: Vec<Note>,
}

impl NoteList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Removes and returns the note at `index`
    pub fn remove(&mut self, index: usize) -> Result<Note, RenError> {
        if index >= self.notes.len() {
            return Err(RenError::NoteOutOfRange {
                index: index.saturating_add(1),
                len: self.notes.len(),
            });
        }
        Ok(self.notes.remove(index))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }
}

impl From<Vec<Note>> for NoteList {
    fn from(notes: Vec<Note>) -> Self {
        Self { notes }
    }
}

/// Everything Ren persists: the tasks and the notes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tasks: TaskList,
    pub notes: NoteList,
}

/// Represents a single state transition event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub details: Option<String>,
}

impl TransitionLogEntry {
    pub fn new(action: String, details: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            details,
        }
    }
}

// Define the maximum size for the history buffer
const MAX_HISTORY_SIZE: usize = 20;

/// The in-memory state of one chat session
pub struct Session {
    tasks: TaskList,
    notes: NoteList,
    history: VecDeque<TransitionLogEntry>,
    finished: bool,
}

impl Session {
    /// Creates a new session over previously loaded tasks and notes
    pub fn new(tasks: TaskList, notes: NoteList) -> Self {
        Self {
            tasks,
            notes,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            finished: false,
        }
    }

    /// Logs a state transition, maintaining the history buffer size.
    fn log_transition(&mut self, action: &str, details: Option<String>) {
        tracing::debug!(action, details = details.as_deref(), "transition");
        if self.history.len() == MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history
            .push_back(TransitionLogEntry::new(action.to_string(), details));
    }

    /// Parses and runs one line of input
    pub fn handle(&mut self, input: &str) -> Result<Reply, RenError> {
        let command: Command = input.parse()?;
        command.execute(self)
    }

    pub fn add_task(&mut self, task: Task) -> Task {
        self.log_transition("add_task", Some(format!("Added {}", task)));
        self.tasks.add(task.clone());
        task
    }

    pub fn delete_task(&mut self, index: usize) -> Result<Task, RenError> {
        let removed = self.tasks.remove(index)?;
        self.log_transition(
            "delete_task",
            Some(format!("Removed task {}: {}", index + 1, removed)),
        );
        Ok(removed)
    }

    pub fn mark_task(&mut self, index: usize) -> Result<Task, RenError> {
        let task = self.tasks.get_mut(index)?;
        task.mark_done();
        let task = task.clone();
        self.log_transition("mark_task", Some(format!("Marked task {} done", index + 1)));
        Ok(task)
    }

    pub fn unmark_task(&mut self, index: usize) -> Result<Task, RenError> {
        let task = self.tasks.get_mut(index)?;
        task.mark_undone();
        let task = task.clone();
        self.log_transition(
            "unmark_task",
            Some(format!("Marked task {} not done", index + 1)),
        );
        Ok(task)
    }

    pub fn add_note(&mut self, note: Note) -> Note {
        self.log_transition("add_note", Some(format!("Noted '{}'", note)));
        self.notes.add(note.clone());
        note
    }

    pub fn delete_note(&mut self, index: usize) -> Result<Note, RenError> {
        let removed = self.notes.remove(index)?;
        self.log_transition(
            "delete_note",
            Some(format!("Removed note {}: '{}'", index + 1, removed)),
        );
        Ok(removed)
    }

    /// Ends the session; the front end stops reading input afterwards
    pub fn finish(&mut self) {
        self.log_transition("finish", None);
        self.finished = true;
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn notes(&self) -> &NoteList {
        &self.notes
    }

    /// Recent transitions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &TransitionLogEntry> {
        self.history.iter()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            notes: self.notes.clone(),
        }
    }
}

impl From<Snapshot> for Session {
    fn from(snapshot: Snapshot) -> Self {
        Session::new(snapshot.tasks, snapshot.notes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    Error,
}

/// What Ren says back after one line of input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub message: String,
    pub outcome: Outcome,
    /// Tasks or notes were modified and should be persisted
    pub changed: bool,
    /// The session is over
    pub exit: bool,
}

impl Reply {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            outcome: Outcome::Ok,
            changed: false,
            exit: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Error,
            ..Self::new(message)
        }
    }

    pub fn with_change(mut self) -> Self {
        self.changed = true;
        self
    }

    pub fn with_exit(mut self) -> Self {
        self.exit = true;
        self
    }

    pub fn is_error(&self) -> bool {
        self.outcome == Outcome::Error
    }
}

/// Shared handle to the session. Observers subscribe to be told whenever
/// tasks or notes change.
#[derive(Clone)]
pub struct Core {
    inner: Arc<Mutex<Session>>,
    update_tx: Arc<tokio::sync::broadcast::Sender<()>>,
}

impl Core {
    pub fn new(session: Session) -> Self {
        let (tx, _rx) = tokio::sync::broadcast::channel(16);

        Self {
            inner: Arc::new(Mutex::new(session)),
            update_tx: Arc::new(tx),
        }
    }

    // Helper method to safely access the session
    fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut session = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        f(&mut session)
    }

    /// Handles one line of input. Errors become error replies; the session
    /// carries on either way.
    pub fn handle(&self, input: &str) -> Reply {
        let reply = self.with_session(|session| match session.handle(input) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(input, error = %e, "command rejected");
                Reply::error(e.to_string())
            }
        });

        if reply.changed {
            // No receivers is fine
            let _ = self.update_tx.send(());
        }

        reply
    }

    pub fn snapshot(&self) -> Snapshot {
        self.with_session(|session| session.snapshot())
    }

    pub fn is_finished(&self) -> bool {
        self.with_session(|session| session.is_finished())
    }

    // Subscribe to state updates
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<()> {
        self.update_tx.subscribe()
    }
}
