//! Match-level errors.

use thiserror::Error;

use crate::core::PlayerId;
use crate::script::ScriptError;

/// Errors that stop a match operation.
///
/// `StartupScript` and `EventCeilingExceeded` are fatal: the match is
/// torn down and never retried.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("startup rule `{rule}` failed")]
    StartupScript {
        rule: String,
        #[source]
        source: ScriptError,
    },

    #[error("more than {0} events dispatched for one command")]
    EventCeilingExceeded(usize),

    #[error("a match needs at least one player")]
    NoPlayers,

    #[error("a match seats at most 255 players, {0} given")]
    TooManyPlayers(usize),

    #[error("match has already started")]
    AlreadyStarted,

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown card `{0}`")]
    UnknownCard(String),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

impl MatchError {
    /// Whether the match cannot continue after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StartupScript { .. } | Self::EventCeilingExceeded(_))
    }
}

/// Result type for match operations.
pub type MatchResult<T> = Result<T, MatchError>;
