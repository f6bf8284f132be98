//! Attack with a minion.

use super::{CommandContext, GameCommand, ValidationError, ValidationErrors};
use crate::core::{EntityId, PlayerId};
use crate::engine::{MatchResult, RuleSystem};
use crate::entities::{stats, tags, vars};
use crate::events::{EventKind, GameEvent};

/// Spend one of `attacker`'s attacks on `target`.
///
/// Damage is exchanged when the queued `Attack` event is resolved, after
/// rules triggered by the attack have run.
#[derive(Debug)]
pub struct AttackCommand {
    pub attacker: EntityId,
    pub target: EntityId,
}

impl GameCommand for AttackCommand {
    fn name(&self) -> &'static str {
        "Attack"
    }

    fn validate(&self, ctx: &CommandContext<'_>, errors: &mut ValidationErrors) {
        let entities = ctx.system.state().entities();

        if let Some(attacker) = entities.get(self.attacker) {
            if attacker.owner != Some(ctx.player) {
                errors.push(ValidationError::NotOwner(self.attacker));
            }
            if !attacker.is_in_play() {
                errors.push(ValidationError::NotInPlay(self.attacker));
            }
            if attacker.current_value(stats::ATTACK) <= 0 {
                errors.push(ValidationError::CannotAttack(self.attacker));
            } else if attacker.var(vars::ATTACKS_REMAINING) <= 0 {
                errors.push(ValidationError::NoAttacksLeft(self.attacker));
            }
        }

        let Some(target) = entities.get(self.target) else {
            return;
        };
        if !target.is_in_play() {
            errors.push(ValidationError::NotInPlay(self.target));
        }
        let Some(defender) = target.owner.filter(|owner| *owner != ctx.player) else {
            errors.push(ValidationError::InvalidTarget(self.target));
            return;
        };
        if !target.has_tag(tags::TAUNT) {
            let taunt = entities
                .owned_with_tag(defender, tags::TAUNT)
                .find(|e| e.is_in_play() && e.has_tag(tags::MINION));
            if let Some(taunt) = taunt {
                errors.push(ValidationError::Taunt(taunt.id));
            }
        }
    }

    fn execute(self: Box<Self>, system: &mut RuleSystem, _player: PlayerId) -> MatchResult<()> {
        let state = system.state_mut();
        if let Some(attacker) = state.entities_mut().get_mut(self.attacker) {
            attacker.add_var(vars::ATTACKS_REMAINING, -1);
        }
        state.queue_event(GameEvent::caused_by(
            EventKind::Attack {
                attacker: self.attacker,
                defender: self.target,
            },
            Some(self.attacker),
        ));
        Ok(())
    }
}
