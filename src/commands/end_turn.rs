//! End the current turn.

use super::{CommandContext, GameCommand, ValidationErrors};
use crate::core::PlayerId;
use crate::engine::{MatchResult, RuleSystem};
use crate::events::{EventKind, GameEvent};
use crate::script::RulesView;

/// Queue `TurnEnded`. Resolving it advances the turn and queues the next
/// player's `TurnStarted`.
#[derive(Debug)]
pub struct EndTurnCommand;

impl GameCommand for EndTurnCommand {
    fn name(&self) -> &'static str {
        "EndTurn"
    }

    fn validate(&self, _ctx: &CommandContext<'_>, _errors: &mut ValidationErrors) {}

    fn execute(self: Box<Self>, system: &mut RuleSystem, player: PlayerId) -> MatchResult<()> {
        let state = system.state_mut();
        let turn = state.turn();
        let avatar = state.avatar(player);
        state.queue_event(GameEvent::caused_by(
            EventKind::TurnEnded { player, turn },
            avatar,
        ));
        Ok(())
    }
}
