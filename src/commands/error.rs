//! Command errors: fatal parse failures and accumulated validation errors.

use thiserror::Error;

use crate::core::EntityId;
use crate::engine::MatchError;

/// An id in the payload did not resolve. Fatal to the command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no live entity with id {0}")]
    UnknownEntity(u32),
}

/// One reason a command was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown player")]
    UnknownPlayer,

    #[error("match has not started")]
    NotStarted,

    #[error("match is over")]
    MatchOver,

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("{0} is not yours")]
    NotOwner(EntityId),

    #[error("{0} is not in your hand")]
    NotInHand(EntityId),

    #[error("{0} is not in play")]
    NotInPlay(EntityId),

    #[error("not enough energy: costs {cost}, {available} available")]
    NotEnoughEnergy { cost: i64, available: i64 },

    #[error("{0} cannot attack")]
    CannotAttack(EntityId),

    #[error("{0} has no attacks left this turn")]
    NoAttacksLeft(EntityId),

    #[error("{0} cannot be attacked")]
    InvalidTarget(EntityId),

    #[error("{0} must be attacked first")]
    Taunt(EntityId),

    #[error("chat message is empty")]
    EmptyMessage,

    #[error("chat message is longer than {0} characters")]
    MessageTooLong(usize),

    #[error("{0}")]
    Rejected(String),

    #[error("validator `{validator}` failed: {reason}")]
    ValidatorFailed { validator: String, reason: String },
}

/// Every reason a command was refused, in the order found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    #[must_use]
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }

    /// Display strings for the wire.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

/// Why a submitted command did not complete.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("command rejected: {0}")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Match(#[from] MatchError),
}

impl CommandError {
    /// Display strings for the wire.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Invalid(errors) => errors.messages(),
            other => vec![other.to_string()],
        }
    }
}
