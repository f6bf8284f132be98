//! Play a card from hand.

use tracing::debug;

use super::{CommandContext, GameCommand, ValidationError, ValidationErrors};
use crate::core::{EntityId, PlayerId};
use crate::engine::{MatchResult, RuleSystem};
use crate::entities::{stats, tags, vars};
use crate::events::{EventKind, GameEvent};

/// Pay a card's cost and put it into play.
///
/// Minions stay in play and emit `MinionSummoned`. Anything else is
/// removed again once its `CardPlayed` event has been dispatched.
#[derive(Debug)]
pub struct PlayCardCommand {
    pub card: EntityId,
    pub target: Option<EntityId>,
}

impl PlayCardCommand {
    fn played_event(&self, player: PlayerId) -> GameEvent {
        GameEvent::caused_by(
            EventKind::CardPlayed {
                player,
                card: self.card,
                target: self.target,
            },
            Some(self.card),
        )
    }
}

impl GameCommand for PlayCardCommand {
    fn name(&self) -> &'static str {
        "PlayCard"
    }

    fn validate(&self, ctx: &CommandContext<'_>, errors: &mut ValidationErrors) {
        let state = ctx.system.state();
        let Some(card) = state.entities().get(self.card) else {
            return;
        };

        if card.owner != Some(ctx.player) {
            errors.push(ValidationError::NotOwner(self.card));
        }
        if !card.has_tag(tags::IN_HAND) {
            errors.push(ValidationError::NotInHand(self.card));
        }
        let cost = card.current_value(stats::COST);
        let available = state.available_energy(ctx.player);
        if cost > available {
            errors.push(ValidationError::NotEnoughEnergy { cost, available });
        }
        if let Some(target) = self.target {
            if !state.entities().is_in_play(target) {
                errors.push(ValidationError::NotInPlay(target));
            }
        }

        let validator = card
            .card
            .and_then(|id| state.catalog().card(id))
            .and_then(|proto| proto.validator.clone());
        if let Some((name, program)) = validator {
            let event = self.played_event(ctx.player);
            match ctx.system.run_validator(&name, &program, self.card, &event) {
                Ok(rejections) => {
                    for message in rejections {
                        errors.push(ValidationError::Rejected(message));
                    }
                }
                Err(err) => errors.push(ValidationError::ValidatorFailed {
                    validator: name,
                    reason: err.to_string(),
                }),
            }
        }
    }

    fn execute(self: Box<Self>, system: &mut RuleSystem, player: PlayerId) -> MatchResult<()> {
        let state = system.state_mut();
        let (cost, is_minion) = match state.entities().get(self.card) {
            Some(card) => (card.current_value(stats::COST), card.has_tag(tags::MINION)),
            None => return Ok(()),
        };
        if let Some(avatar) = state.seat(player).map(|s| s.avatar) {
            if let Some(avatar) = state.entities_mut().get_mut(avatar) {
                avatar.add_var(vars::ENERGY_SPENT, cost);
            }
        }
        state.enter_play(self.card)?;
        debug!(card = %self.card, cost, is_minion, "card played");

        state.queue_event(self.played_event(player));
        if is_minion {
            state.queue_event(GameEvent::caused_by(
                EventKind::MinionSummoned {
                    player,
                    minion: self.card,
                },
                Some(self.card),
            ));
        }
        Ok(())
    }
}
