//! Runtime configuration

use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TASKS_FILE: &str = "tasks.txt";
pub const DEFAULT_NOTES_FILE: &str = "notes.txt";

/// Where Ren keeps its data and when it saves
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub tasks_file: String,
    pub notes_file: String,
    /// Save after every change instead of only when the chat ends
    pub autosave: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            tasks_file: DEFAULT_TASKS_FILE.to_string(),
            notes_file: DEFAULT_NOTES_FILE.to_string(),
            autosave: true,
        }
    }
}

impl Config {
    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join(&self.tasks_file)
    }

    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join(&self.notes_file)
    }
}
