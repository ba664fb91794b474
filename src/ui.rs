//! What Ren says
//!
//! Plain-text replies for each command. Colouring is left to the front end
//! so these strings stay stable for tests and non-terminal output.

use chrono::{Local, NaiveDate};

use crate::models::{Note, NoteList, Task, TaskList, TransitionLogEntry};

const NAME: &str = "Ren";

pub fn greet() -> String {
    format!("Hello! I'm {}\nWhat can I do for you?", NAME)
}

pub fn bye() -> String {
    "Bye. Hope to see you again soon!".to_string()
}

/// "1 task", "3 tasks"
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

/// Numbers entries 1-based using their position in the full list
fn numbered<'a, T: std::fmt::Display + 'a>(
    entries: impl IntoIterator<Item = (usize, &'a T)>,
) -> String {
    entries
        .into_iter()
        .map(|(i, entry)| format!("{}. {}", i + 1, entry))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn task_list(tasks: &TaskList) -> String {
    if tasks.is_empty() {
        return "Your task list is empty. Add one with 'todo', 'deadline' or 'event'.".to_string();
    }
    format!(
        "Here are the tasks in your list:\n{}",
        numbered(tasks.iter().enumerate())
    )
}

pub fn task_added(task: &Task, total: usize) -> String {
    format!(
        "Got it. {} added this task:\n  {}\nNow you have {} in the list.",
        NAME,
        task,
        count(total, "task")
    )
}

pub fn task_removed(task: &Task, total: usize) -> String {
    format!(
        "{} removed the task:\n  {}\nNow you have {} in the list.",
        NAME,
        task,
        count(total, "task")
    )
}

pub fn task_marked(task: &Task) -> String {
    format!("Nice! {} marked this task as done:\n  {}", NAME, task)
}

pub fn task_unmarked(task: &Task) -> String {
    format!("OK, {} marked this task as not done yet:\n  {}", NAME, task)
}

pub fn matching_tasks(keyword: &str, matches: &[(usize, &Task)]) -> String {
    if matches.is_empty() {
        return format!("{} found no tasks matching '{}'.", NAME, keyword);
    }
    format!(
        "Here are the matching tasks in your list:\n{}",
        numbered(matches.iter().copied())
    )
}

pub fn tasks_on(date: NaiveDate, matches: &[(usize, &Task)]) -> String {
    let day = date.format("%b %-d %Y");
    if matches.is_empty() {
        return format!("Nothing is due or happening on {}.", day);
    }
    format!(
        "Here is what is on for {}:\n{}",
        day,
        numbered(matches.iter().copied())
    )
}

pub fn note_list(notes: &NoteList) -> String {
    if notes.is_empty() {
        return "You have no notes. Jot one down with 'note'.".to_string();
    }
    format!("Here are your notes:\n{}", numbered(notes.iter().enumerate()))
}

pub fn note_added(note: &Note, total: usize) -> String {
    format!(
        "{} noted down:\n  {}\nYou now have {}.",
        NAME,
        note,
        count(total, "note")
    )
}

pub fn note_removed(note: &Note, total: usize) -> String {
    format!(
        "{} removed the note:\n  {}\nYou now have {}.",
        NAME,
        note,
        count(total, "note")
    )
}

pub fn history<'a>(entries: impl Iterator<Item = &'a TransitionLogEntry>) -> String {
    let lines: Vec<String> = entries
        .map(|entry| {
            let time = entry.timestamp.with_timezone(&Local).format("%H:%M:%S");
            match &entry.details {
                Some(details) => format!("  {} {}", time, details),
                None => format!("  {} {}", time, entry.action),
            }
        })
        .collect();

    if lines.is_empty() {
        return format!("{} hasn't changed anything yet this session.", NAME);
    }
    format!("Here is what {} did recently:\n{}", NAME, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::When;

    #[test]
    fn test_task_list_numbering() {
        let tasks = TaskList::from(vec![
            Task::todo("read book"),
            Task::deadline("return book", When::new("2019-06-06")),
        ]);
        assert_eq!(
            task_list(&tasks),
            "Here are the tasks in your list:\n1. [T][ ] read book\n2. [D][ ] return book (by: Jun 6 2019)"
        );
        assert!(task_list(&TaskList::new()).starts_with("Your task list is empty"));
    }

    #[test]
    fn test_matches_keep_list_numbers() {
        let tasks = TaskList::from(vec![Task::todo("laundry"), Task::todo("read book")]);
        let found = tasks.find("book");
        assert_eq!(
            matching_tasks("book", &found),
            "Here are the matching tasks in your list:\n2. [T][ ] read book"
        );
        assert_eq!(
            matching_tasks("dentist", &[]),
            "Ren found no tasks matching 'dentist'."
        );
    }

    #[test]
    fn test_counts() {
        assert_eq!(count(0, "task"), "0 tasks");
        assert_eq!(count(1, "note"), "1 note");
        assert_eq!(count(2, "note"), "2 notes");
    }

    #[test]
    fn test_tasks_on_empty_day() {
        let day = NaiveDate::from_ymd_opt(2019, 10, 15).unwrap();
        assert_eq!(tasks_on(day, &[]), "Nothing is due or happening on Oct 15 2019.");
    }
}
