//! Guide module for generating help content
//!
//! The in-chat `help` reply and the `ren guide` subcommand share the same
//! sections; the CLI guide adds the parts that only matter outside a chat.

use crate::config::{DEFAULT_DATA_DIR, DEFAULT_NOTES_FILE, DEFAULT_TASKS_FILE};

/// Mode for guide generation
#[derive(Debug, Clone, Copy)]
pub enum GuideMode {
    /// Reply to `help` inside a chat
    Chat,
    /// Output of `ren guide`
    Cli,
}

/// Generate the guide string for the specified mode
pub fn get_guide_string(mode: GuideMode) -> String {
    match mode {
        GuideMode::Chat => format!(
            "{commands}\n\n{dates}",
            commands = get_chat_commands_section(),
            dates = get_dates_section(),
        ),
        GuideMode::Cli => format!(
            r#"=== REN GUIDE ===

{overview}

{getting_started}

{commands}

{dates}

{data_files}

{tips}"#,
            overview = get_overview_section(),
            getting_started = get_getting_started_section(),
            commands = get_chat_commands_section(),
            dates = get_dates_section(),
            data_files = get_data_files_section(),
            tips = get_tips_section(),
        ),
    }
}

fn get_overview_section() -> &'static str {
    r#"Ren is a personal assistant that keeps track of your tasks and notes.

== OVERVIEW ==

Ren helps you:
- Keep a to-do list of todos, deadlines and events
- Mark tasks done as you finish them
- See what is due on a given day
- Jot down quick one-line notes"#
}

fn get_getting_started_section() -> &'static str {
    r#"== GETTING STARTED ==

1. CHAT WITH REN:
   $ ren
   Ren greets you and waits for commands, one per line. Say 'bye' (or press
   Ctrl-D) to finish. Changes are saved as you go.

2. RUN A SINGLE COMMAND:
   $ ren exec todo read book
   $ ren exec list

3. EXPORT EVERYTHING AS JSON:
   $ ren export --pretty

GLOBAL FLAGS:
  --data-dir <DIR>      Where the data files live (env: REN_DATA_DIR)
  --tasks-file <NAME>   Tasks file name inside the data directory (env: REN_TASKS_FILE)
  --notes-file <NAME>   Notes file name inside the data directory (env: REN_NOTES_FILE)
  --no-autosave         Only save when the chat ends
  --no-color            Plain output
  -v, -vv               More logging on stderr"#
}

fn get_chat_commands_section() -> &'static str {
    r#"== COMMANDS ==

TASKS:
  todo <description>                          Add a task
  deadline <description> /by <when>           Add a task with a due date
  event <description> /from <when> /to <when> Add a task that spans a time
  list                                        Show all tasks
  mark <number>                               Mark a task as done
  unmark <number>                             Mark a task as not done
  delete <number>                             Remove a task
  find <keyword>                              Show tasks whose description contains the keyword
  on <date>                                   Show deadlines and events on a day

NOTES:
  note <text>                                 Jot down a note
  notes                                       Show all notes
  deletenote <number>                         Remove a note

OTHER:
  history                                     Show what changed recently
  help                                        Show this help
  bye                                         Finish the chat"#
}

fn get_dates_section() -> &'static str {
    r#"== DATES ==

Ren understands these layouts and shows them as e.g. "Jun 6 2019 18:00":
  2019-06-06 1800    2019-06-06 18:00    2019-06-06
  6/6/2019 1800      6/6/2019 18:00      6/6/2019
Anything else is kept exactly as typed."#
}

fn get_data_files_section() -> String {
    format!(
        r#"== DATA FILES ==

By default Ren keeps its data in '{dir}/{tasks}' and '{dir}/{notes}'.
Both are plain text and rewritten whole on every save.

Tasks, one per line:
  T | 0 | read book
  D | 1 | return book | 2019-06-06
  E | 0 | project meeting | 2019-08-06 1400 | 2019-08-06 1600
The second field is 1 when the task is done. Because '|' separates fields,
Ren refuses descriptions and dates containing it.

Notes, one per line, exactly as typed."#,
        dir = DEFAULT_DATA_DIR,
        tasks = DEFAULT_TASKS_FILE,
        notes = DEFAULT_NOTES_FILE,
    )
}

fn get_tips_section() -> &'static str {
    r#"== TIPS ==

- The numbers shown by 'find' and 'on' are the same ones 'mark' and 'delete' use
- Use 'ren completions <SHELL>' to generate shell completions
- Use 'ren <COMMAND> --help' for help on a specific subcommand"#
}
