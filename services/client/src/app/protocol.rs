//! services/client/src/app/protocol.rs
//!
//! Defines the commands a user can type into the terminal view.

use crate::config::parse_viewport;
use docchat_core::Viewport;
use std::path::PathBuf;
use std::str::FromStr;

/// One line of user input, parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Select a file through the file picker (not type-checked).
    Pick(PathBuf),
    /// Drop a file onto the upload area (must be a PDF).
    Drop(PathBuf),
    /// Stage the bundled sample document.
    Sample,
    /// Print where the sample document lives and how large it is.
    ViewSample,
    Unstage,
    Upload,
    Ask(String),
    Remove,
    /// Advance the tour, or finish it on the last step.
    Next,
    Skip,
    Finish,
    Resize(Viewport),
    /// Redraw the tour overlay.
    Tour,
    /// Print the session status and the transcript.
    Show,
    Help,
    Info,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command '{0}'. Type `help` for the list of commands.")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let require_path = |usage: &'static str| {
            if rest.is_empty() {
                Err(ParseError::Usage(usage))
            } else {
                Ok(PathBuf::from(rest))
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "pick" | "open" => require_path("pick <path>").map(Command::Pick),
            "drop" => require_path("drop <path>").map(Command::Drop),
            "sample" => Ok(Command::Sample),
            "view-sample" | "preview" => Ok(Command::ViewSample),
            "unstage" | "clear" => Ok(Command::Unstage),
            "upload" => Ok(Command::Upload),
            "ask" => Ok(Command::Ask(rest.to_string())),
            "remove" => Ok(Command::Remove),
            "next" => Ok(Command::Next),
            "skip" => Ok(Command::Skip),
            "finish" => Ok(Command::Finish),
            "resize" => {
                let dims = rest.split_whitespace().collect::<Vec<_>>().join("x");
                parse_viewport(&dims)
                    .map(Command::Resize)
                    .ok_or(ParseError::Usage("resize <width> <height>"))
            }
            "tour" => Ok(Command::Tour),
            "show" | "status" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "info" => Ok(Command::Info),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(ParseError::Unknown(word.to_string())),
        }
    }
}
