//! Chat. Allowed out of turn.

use super::{CommandContext, GameCommand, ValidationError, ValidationErrors};
use crate::core::PlayerId;
use crate::engine::{MatchResult, RuleSystem};
use crate::events::{EventKind, GameEvent};

/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_LEN: usize = 500;

#[derive(Debug)]
pub struct ChatCommand {
    pub message: String,
}

impl GameCommand for ChatCommand {
    fn name(&self) -> &'static str {
        "Chat"
    }

    fn requires_turn(&self) -> bool {
        false
    }

    fn validate(&self, _ctx: &CommandContext<'_>, errors: &mut ValidationErrors) {
        if self.message.trim().is_empty() {
            errors.push(ValidationError::EmptyMessage);
        }
        if self.message.chars().count() > MAX_MESSAGE_LEN {
            errors.push(ValidationError::MessageTooLong(MAX_MESSAGE_LEN));
        }
    }

    fn execute(self: Box<Self>, system: &mut RuleSystem, player: PlayerId) -> MatchResult<()> {
        system.state_mut().queue_event(GameEvent::new(EventKind::Chat {
            player,
            message: self.message,
        }));
        Ok(())
    }
}
