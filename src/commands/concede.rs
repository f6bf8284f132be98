//! Concede. Allowed out of turn.

use super::{CommandContext, GameCommand, ValidationErrors};
use crate::core::PlayerId;
use crate::engine::{MatchResult, RuleSystem};
use crate::script::{RulesApi, RulesView};

/// The issuer loses. In a two-player match the other player wins;
/// otherwise nobody does.
#[derive(Debug)]
pub struct ConcedeCommand;

impl GameCommand for ConcedeCommand {
    fn name(&self) -> &'static str {
        "Concede"
    }

    fn requires_turn(&self) -> bool {
        false
    }

    fn validate(&self, _ctx: &CommandContext<'_>, _errors: &mut ValidationErrors) {}

    fn execute(self: Box<Self>, system: &mut RuleSystem, player: PlayerId) -> MatchResult<()> {
        let state = system.state_mut();
        let winner = match state.player_count() {
            2 => Some(PlayerId::new(1 - player.0)),
            _ => None,
        };
        state.game_over(winner)?;
        Ok(())
    }
}
