//! Ren library crate
//!
//! Ren is a personal assistant chatbot that keeps track of tasks (todos,
//! deadlines and events) and free-form notes in flat text files.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod guide;
pub mod models;
pub mod schedule;
pub mod storage;
pub mod ui;

pub use error::{RenError, StorageError};
pub use models::Core;
