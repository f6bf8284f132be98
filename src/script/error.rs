//! Script errors.
//!
//! A failing rule is isolated: the dispatch loop logs the error and moves
//! on to the next rule. Only startup scripts are fatal.

use std::time::Duration;

use thiserror::Error;

use crate::core::{EntityId, PlayerId};

/// Why a script run stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("script does not compile: {0}")]
    Compile(String),

    #[error("script ran out of fuel after {0} steps")]
    FuelExhausted(u64),

    #[error("script exceeded its {0:?} time budget")]
    Timeout(Duration),

    #[error("`{0}` is not bound in this context")]
    Unbound(&'static str),

    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown card `{0}`")]
    UnknownCard(String),

    #[error("unknown rule `{0}`")]
    UnknownRule(String),

    #[error("{0} is not in play")]
    NotInPlay(EntityId),

    #[error("`{0}` is not permitted in this context")]
    ReadOnly(&'static str),

    #[error("arithmetic overflow")]
    Overflow,
}

impl From<ron::error::SpannedError> for ScriptError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::Compile(err.to_string())
    }
}

/// Result type for script compilation and execution.
pub type ScriptResult<T> = Result<T, ScriptError>;
