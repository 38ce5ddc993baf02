use std::io::Error;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum PTError {
    IoError(Error),
    LoggingSetup(String),
}

impl From<Error> for PTError {
    fn from(err: Error) -> Self {
        PTError::IoError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct PTConfig {
    // How long the controller blocks waiting for a terminal event.
    // This is also the tick granularity of the debounce timer.
    pub event_poll_time: u64,
    // Quiet period before a typed filter is committed.
    pub debounce_ms: u64,
}

impl Default for PTConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            debounce_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveBeginning,
    MoveEnd,
    Filter,
    Edit,
    CopyRow,
    Help,
    Exit,
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
 q         Quit
 /         Edit the filter
 Esc       Clear filter / close dialog
 Up/Down   Move selection
 g / G     Jump to first / last row
 Enter, e  Edit the selected element
 c         Copy the selected row
 ?         Show this help
";
