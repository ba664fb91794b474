//! Error types
//!
//! `RenError` is what a user sees when a chat command cannot be carried out;
//! every variant renders as a sentence Ren can say back. `StorageError`
//! covers the data files.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RenError {
    #[error("Ren is listening. Type 'help' to see what Ren can do.")]
    EmptyInput,

    #[error("Sorry, Ren doesn't know what '{0}' means. Type 'help' to see what Ren can do.")]
    UnknownCommand(String),

    #[error("The description of a {0} cannot be empty.")]
    EmptyDescription(&'static str),

    #[error("A deadline needs a due date, e.g. 'deadline return book /by 2019-06-06'.")]
    MissingBy,

    #[error("An event needs a start, e.g. 'event meeting /from 2019-08-06 1400 /to 2019-08-06 1600'.")]
    MissingFrom,

    #[error("An event needs an end, e.g. 'event meeting /from 2019-08-06 1400 /to 2019-08-06 1600'.")]
    MissingTo,

    #[error("An event cannot end before it starts.")]
    EventEndsBeforeStart,

    #[error("Please tell Ren which {0} number you mean.")]
    MissingIndex(&'static str),

    #[error("'{0}' is not a valid number.")]
    InvalidIndex(String),

    #[error("There is no task {index}; you have {len} task(s) in the list.")]
    TaskOutOfRange { index: usize, len: usize },

    #[error("There is no note {index}; you have {len} note(s).")]
    NoteOutOfRange { index: usize, len: usize },

    #[error("Please tell Ren what to look for.")]
    EmptyKeyword,

    #[error("Please tell Ren which day, e.g. 'on 2019-06-06'.")]
    MissingDate,

    #[error("'{0}' is not a date Ren understands. Try YYYY-MM-DD or D/M/YYYY.")]
    InvalidDate(String),

    #[error("Ren can't remember text containing '|'.")]
    ReservedCharacter,

    #[error("Ren can only remember one line at a time.")]
    LineBreak,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: {reason}", .path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
