//! Shared error types for the services crate.

use std::fmt;
use thiserror::Error;

use quiz_core::model::Phase;

/// Kind of command submitted to a quiz session, for rejection reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Load,
    Start,
    Select,
    Confirm,
    Advance,
    Reset,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Start => "start",
            Self::Select => "select",
            Self::Confirm => "confirm",
            Self::Advance => "advance",
            Self::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// Synchronous rejection of a command; the session phase never changes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommandError {
    #[error("{command} is not valid while the session is {phase}")]
    InvalidInPhase { command: CommandKind, phase: Phase },

    #[error("no choice is selected")]
    NoSelection,

    #[error("choice index {index} out of range for {len} choices")]
    ChoiceOutOfRange { index: usize, len: usize },
}

/// Errors returned by the runtime handle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    #[error("quiz runtime has shut down")]
    Closed,

    #[error(transparent)]
    Command(#[from] CommandError),
}
