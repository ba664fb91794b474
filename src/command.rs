//! Chat commands
//!
//! One line of user input parses into a [`Command`]; executing it against a
//! [`Session`] produces the [`Reply`] Ren says back.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::RenError;
use crate::guide::{get_guide_string, GuideMode};
use crate::models::{Note, Reply, Session, Task};
use crate::schedule::{parse_date, When};
use crate::ui;

/// Separates fields in the tasks file, so it cannot appear inside one
const RESERVED: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show every task
    List,
    /// Add a todo, deadline or event
    AddTask(Task),
    Mark(usize),
    Unmark(usize),
    Delete(usize),
    Find(String),
    /// Show deadlines and events on a given day
    On(NaiveDate),
    Note(String),
    Notes,
    DeleteNote(usize),
    History,
    Help,
    Bye,
}

impl FromStr for Command {
    type Err = RenError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RenError::EmptyInput);
        }

        let (keyword, rest) = match input.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (input, ""),
        };

        match keyword.to_lowercase().as_str() {
            "list" => Ok(Command::List),
            "todo" => parse_todo(rest),
            "deadline" => parse_deadline(rest),
            "event" => parse_event(rest),
            "mark" => parse_position(rest, "task").map(Command::Mark),
            "unmark" => parse_position(rest, "task").map(Command::Unmark),
            "delete" => parse_position(rest, "task").map(Command::Delete),
            "find" => {
                if rest.is_empty() {
                    Err(RenError::EmptyKeyword)
                } else {
                    Ok(Command::Find(rest.to_string()))
                }
            }
            "on" => {
                if rest.is_empty() {
                    Err(RenError::MissingDate)
                } else {
                    parse_date(rest).map(Command::On)
                }
            }
            "note" => single_line(rest, RenError::EmptyDescription("note"))
                .map(|text| Command::Note(text.to_string())),
            "notes" => Ok(Command::Notes),
            "deletenote" => parse_position(rest, "note").map(Command::DeleteNote),
            "history" => Ok(Command::History),
            "help" => Ok(Command::Help),
            "bye" => Ok(Command::Bye),
            _ => Err(RenError::UnknownCommand(keyword.to_string())),
        }
    }
}

impl Command {
    /// Whether running this command can modify tasks or notes
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::AddTask(_)
                | Command::Mark(_)
                | Command::Unmark(_)
                | Command::Delete(_)
                | Command::Note(_)
                | Command::DeleteNote(_)
        )
    }

    /// Runs the command against the session
    pub fn execute(self, session: &mut Session) -> Result<Reply, RenError> {
        let changed = self.is_mutating();

        let reply = match self {
            Command::List => Reply::new(ui::task_list(session.tasks())),
            Command::AddTask(task) => {
                let added = session.add_task(task);
                Reply::new(ui::task_added(&added, session.tasks().len()))
            }
            Command::Mark(index) => {
                let task = session.mark_task(index)?;
                Reply::new(ui::task_marked(&task))
            }
            Command::Unmark(index) => {
                let task = session.unmark_task(index)?;
                Reply::new(ui::task_unmarked(&task))
            }
            Command::Delete(index) => {
                let removed = session.delete_task(index)?;
                Reply::new(ui::task_removed(&removed, session.tasks().len()))
            }
            Command::Find(keyword) => {
                Reply::new(ui::matching_tasks(&keyword, &session.tasks().find(&keyword)))
            }
            Command::On(date) => Reply::new(ui::tasks_on(date, &session.tasks().on(date))),
            Command::Note(text) => {
                let note = session.add_note(Note::new(text));
                Reply::new(ui::note_added(&note, session.notes().len()))
            }
            Command::Notes => Reply::new(ui::note_list(session.notes())),
            Command::DeleteNote(index) => {
                let removed = session.delete_note(index)?;
                Reply::new(ui::note_removed(&removed, session.notes().len()))
            }
            Command::History => Reply::new(ui::history(session.history())),
            Command::Help => Reply::new(get_guide_string(GuideMode::Chat)),
            Command::Bye => {
                session.finish();
                Reply::new(ui::bye()).with_exit()
            }
        };

        Ok(if changed { reply.with_change() } else { reply })
    }
}

fn parse_todo(rest: &str) -> Result<Command, RenError> {
    let description = required(rest, RenError::EmptyDescription("todo"))?;
    Ok(Command::AddTask(Task::todo(description)))
}

fn parse_deadline(rest: &str) -> Result<Command, RenError> {
    required(rest, RenError::EmptyDescription("deadline"))?;
    let (description, by) = split_at_marker(rest, "/by").ok_or(RenError::MissingBy)?;
    let description = required(description, RenError::EmptyDescription("deadline"))?;
    let by = required(by, RenError::MissingBy)?;

    Ok(Command::AddTask(Task::deadline(description, When::new(by))))
}

fn parse_event(rest: &str) -> Result<Command, RenError> {
    required(rest, RenError::EmptyDescription("event"))?;
    let (description, times) = split_at_marker(rest, "/from").ok_or(RenError::MissingFrom)?;
    let description = required(description, RenError::EmptyDescription("event"))?;
    let (from, to) = split_at_marker(times, "/to").ok_or(RenError::MissingTo)?;
    let from = When::new(required(from, RenError::MissingFrom)?);
    let to = When::new(required(to, RenError::MissingTo)?);

    if let (Some(start), Some(end)) = (from.moment(), to.moment()) {
        if end.is_before(start) {
            return Err(RenError::EventEndsBeforeStart);
        }
    }

    Ok(Command::AddTask(Task::event(description, from, to)))
}

/// Splits around the first standalone `marker` word, so `/by` never
/// matches inside `/bytes`
fn split_at_marker<'a>(input: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    input.match_indices(marker).find_map(|(at, _)| {
        let before = &input[..at];
        let after = &input[at + marker.len()..];
        let starts_word = before.chars().next_back().map_or(true, char::is_whitespace);
        let ends_word = after.chars().next().map_or(true, char::is_whitespace);
        (starts_word && ends_word).then_some((before, after))
    })
}

/// Trims a field, rejecting it when empty or when it would break the tasks file
fn required(field: &str, if_empty: RenError) -> Result<&str, RenError> {
    let field = single_line(field, if_empty)?;
    if field.contains(RESERVED) {
        Err(RenError::ReservedCharacter)
    } else {
        Ok(field)
    }
}

/// Both data files hold one record per line
fn single_line(field: &str, if_empty: RenError) -> Result<&str, RenError> {
    let field = field.trim();
    if field.is_empty() {
        Err(if_empty)
    } else if field.contains(|c: char| c == '\n' || c == '\r') {
        Err(RenError::LineBreak)
    } else {
        Ok(field)
    }
}

/// Parses a 1-based position as typed by the user into a 0-based index
fn parse_position(rest: &str, what: &'static str) -> Result<usize, RenError> {
    if rest.is_empty() {
        return Err(RenError::MissingIndex(what));
    }
    match rest.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(RenError::InvalidIndex(rest.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteList, TaskList};
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Result<Command, RenError> {
        input.parse()
    }

    fn empty_session() -> Session {
        Session::new(TaskList::new(), NoteList::new())
    }

    #[test]
    fn test_parse_simple_keywords() {
        assert_eq!(parse("list").unwrap(), Command::List);
        assert_eq!(parse("  LIST  ").unwrap(), Command::List);
        assert_eq!(parse("notes").unwrap(), Command::Notes);
        assert_eq!(parse("history").unwrap(), Command::History);
        assert_eq!(parse("help").unwrap(), Command::Help);
        assert_eq!(parse("Bye").unwrap(), Command::Bye);
        // Extra words after argument-less commands are ignored
        assert_eq!(parse("list everything").unwrap(), Command::List);
    }

    #[test]
    fn test_parse_task_creation() {
        assert_eq!(
            parse("todo read book").unwrap(),
            Command::AddTask(Task::todo("read book"))
        );
        assert_eq!(
            parse("deadline return book /by 2019-06-06").unwrap(),
            Command::AddTask(Task::deadline("return book", When::new("2019-06-06")))
        );
        assert_eq!(
            parse("event project meeting /from Mon 2pm /to 4pm").unwrap(),
            Command::AddTask(Task::event(
                "project meeting",
                When::new("Mon 2pm"),
                When::new("4pm")
            ))
        );
    }

    #[test]
    fn test_parse_task_creation_errors() {
        assert!(matches!(parse("todo"), Err(RenError::EmptyDescription("todo"))));
        assert!(matches!(parse("todo   "), Err(RenError::EmptyDescription("todo"))));
        assert!(matches!(
            parse("deadline"),
            Err(RenError::EmptyDescription("deadline"))
        ));
        assert!(matches!(parse("deadline return book"), Err(RenError::MissingBy)));
        assert!(matches!(parse("deadline return book /by"), Err(RenError::MissingBy)));
        assert!(matches!(
            parse("deadline /by 2019-06-06"),
            Err(RenError::EmptyDescription("deadline"))
        ));
        assert!(matches!(parse("event party"), Err(RenError::MissingFrom)));
        assert!(matches!(parse("event party /from 7pm"), Err(RenError::MissingTo)));
        assert!(matches!(parse("event party /from /to 9pm"), Err(RenError::MissingFrom)));
        assert!(matches!(
            parse("event party /from 2019-08-07 /to 2019-08-06"),
            Err(RenError::EventEndsBeforeStart)
        ));
        assert!(matches!(
            parse("todo a | b"),
            Err(RenError::ReservedCharacter)
        ));
    }

    #[test]
    fn test_markers_must_be_whole_words() {
        assert_eq!(
            parse("deadline pay /bytes bill /by 2019-06-06").unwrap(),
            Command::AddTask(Task::deadline("pay /bytes bill", When::new("2019-06-06")))
        );
        assert_eq!(
            parse("event cheese /fromage tasting /from Fri /to /today Sun").unwrap(),
            Command::AddTask(Task::event(
                "cheese /fromage tasting",
                When::new("Fri"),
                When::new("/today Sun")
            ))
        );
        assert!(matches!(parse("deadline sort /bytes"), Err(RenError::MissingBy)));
    }

    #[test]
    fn test_line_breaks_are_rejected() {
        assert!(matches!(parse("todo buy\nmilk"), Err(RenError::LineBreak)));
        assert!(matches!(
            parse("deadline pay\r\nrent /by 2019-06-06"),
            Err(RenError::LineBreak)
        ));
        assert!(matches!(
            parse("event camp /from Fri /to Sun\nMon"),
            Err(RenError::LineBreak)
        ));
        assert!(matches!(parse("note x\ny"), Err(RenError::LineBreak)));
        // Surrounding line breaks are just whitespace
        assert_eq!(parse("todo read book\n").unwrap(), Command::AddTask(Task::todo("read book")));
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(parse("mark 1").unwrap(), Command::Mark(0));
        assert_eq!(parse("unmark 3").unwrap(), Command::Unmark(2));
        assert_eq!(parse("delete 2").unwrap(), Command::Delete(1));
        assert_eq!(parse("deletenote 1").unwrap(), Command::DeleteNote(0));

        assert!(matches!(parse("mark"), Err(RenError::MissingIndex("task"))));
        assert!(matches!(parse("deletenote"), Err(RenError::MissingIndex("note"))));
        assert!(matches!(parse("delete two"), Err(RenError::InvalidIndex(s)) if s == "two"));
        assert!(matches!(parse("mark 0"), Err(RenError::InvalidIndex(_))));
        assert!(matches!(parse("mark -1"), Err(RenError::InvalidIndex(_))));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse("find Book").unwrap(), Command::Find("Book".to_string()));
        assert!(matches!(parse("find"), Err(RenError::EmptyKeyword)));
        assert_eq!(
            parse("on 2019-06-06").unwrap(),
            Command::On(NaiveDate::from_ymd_opt(2019, 6, 6).unwrap())
        );
        assert!(matches!(parse("on"), Err(RenError::MissingDate)));
        assert!(matches!(parse("on someday"), Err(RenError::InvalidDate(_))));
        // Notes are stored one per line, so '|' is fine there
        assert_eq!(
            parse("note a | b").unwrap(),
            Command::Note("a | b".to_string())
        );
        assert!(matches!(parse("note"), Err(RenError::EmptyDescription("note"))));
        assert!(matches!(parse("   "), Err(RenError::EmptyInput)));
        assert!(matches!(parse("dance"), Err(RenError::UnknownCommand(s)) if s == "dance"));
    }

    #[test]
    fn test_execute_add_and_delete() {
        let mut session = empty_session();

        let reply = parse("todo read book").unwrap().execute(&mut session).unwrap();
        assert!(reply.changed);
        assert_eq!(
            reply.message,
            "Got it. Ren added this task:\n  [T][ ] read book\nNow you have 1 task in the list."
        );

        parse("deadline return book /by 2019-06-06")
            .unwrap()
            .execute(&mut session)
            .unwrap();

        let reply = parse("delete 1").unwrap().execute(&mut session).unwrap();
        assert_eq!(
            reply.message,
            "Ren removed the task:\n  [T][ ] read book\nNow you have 1 task in the list."
        );
        assert_eq!(session.tasks().len(), 1);
    }

    #[test]
    fn test_execute_errors_leave_session_untouched() {
        let mut session = empty_session();
        let err = parse("mark 1").unwrap().execute(&mut session).unwrap_err();
        assert_eq!(err.to_string(), "There is no task 1; you have 0 task(s) in the list.");
        assert_eq!(session.history().count(), 0);
    }

    #[test]
    fn test_execute_read_only_commands() {
        let mut session = empty_session();
        for input in ["list", "find book", "notes", "history", "help", "on 2019-06-06"] {
            let reply = parse(input).unwrap().execute(&mut session).unwrap();
            assert!(!reply.changed, "{} should not change anything", input);
            assert!(!reply.exit);
        }

        let reply = parse("bye").unwrap().execute(&mut session).unwrap();
        assert!(reply.exit);
        assert!(session.is_finished());
    }
}
