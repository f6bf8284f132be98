//! The capability surface scripts run against.
//!
//! `RulesView` is everything a script may read; `RulesApi` adds the
//! whitelisted mutations. Every mutation has a default body that refuses
//! with `ScriptError::ReadOnly`, so a facade only opts into what it allows:
//!
//! - the match state overrides all of them (rule dispatch),
//! - `BuffOnly` overrides `buff` (stat recalculation),
//! - `ReadOnly` overrides none (play validators).

use super::error::{ScriptError, ScriptResult};
use crate::core::{EntityId, PlayerId};
use crate::entities::GameEntity;

/// Read access to a match.
pub trait RulesView {
    /// Any entity ever spawned in the match.
    fn entity(&self, id: EntityId) -> Option<&GameEntity>;

    /// Active entities in insertion order.
    fn active_entities(&self) -> Vec<EntityId>;

    /// A player's avatar entity.
    fn avatar(&self, player: PlayerId) -> Option<EntityId>;

    fn player_count(&self) -> usize;

    /// The player whose turn it is.
    fn current_player(&self) -> PlayerId;

    fn turn(&self) -> u32;

    /// Cards in `player`'s hand.
    fn hand_size(&self, player: PlayerId) -> usize;

    /// Log a message on behalf of a rule.
    fn trace(&self, rule: &str, message: &str) {
        tracing::info!(rule, "{message}");
    }
}

/// Mutating access to a match.
#[allow(unused_variables)]
pub trait RulesApi: RulesView {
    fn deal_damage(&mut self, source: Option<EntityId>, target: EntityId, amount: i64) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("DealDamage"))
    }

    fn heal(&mut self, source: Option<EntityId>, target: EntityId, amount: i64) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("Heal"))
    }

    fn draw(&mut self, player: PlayerId, count: u32) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("Draw"))
    }

    fn add_rule(&mut self, target: EntityId, rule: &str) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("AddRule"))
    }

    fn remove_rule(&mut self, target: EntityId, rule: &str) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("RemoveRule"))
    }

    fn disenchant(&mut self, target: EntityId) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("Disenchant"))
    }

    /// Create an entity from a catalog card directly in play.
    fn spawn(&mut self, card: &str, owner: PlayerId, source: Option<EntityId>) -> ScriptResult<EntityId> {
        Err(ScriptError::ReadOnly("Spawn"))
    }

    fn destroy(&mut self, source: Option<EntityId>, target: EntityId) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("Destroy"))
    }

    /// Adjust a derived stat value, clamped at zero.
    fn buff(&mut self, target: EntityId, stat: &str, delta: i64) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("Buff"))
    }

    fn set_var(&mut self, target: EntityId, var: &str, value: i64) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("SetVar"))
    }

    fn add_var(&mut self, target: EntityId, var: &str, delta: i64) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("AddVar"))
    }

    fn add_base(&mut self, target: EntityId, stat: &str, delta: i64) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("AddBase"))
    }

    fn add_tag(&mut self, target: EntityId, tag: &str) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("AddTag"))
    }

    fn remove_tag(&mut self, target: EntityId, tag: &str) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("RemoveTag"))
    }

    fn game_over(&mut self, winner: Option<PlayerId>) -> ScriptResult<()> {
        Err(ScriptError::ReadOnly("GameOver"))
    }
}

macro_rules! delegate_view {
    ($ty:ident) => {
        impl<V: RulesView + ?Sized> RulesView for $ty<'_, V> {
            fn entity(&self, id: EntityId) -> Option<&GameEntity> {
                self.0.entity(id)
            }
            fn active_entities(&self) -> Vec<EntityId> {
                self.0.active_entities()
            }
            fn avatar(&self, player: PlayerId) -> Option<EntityId> {
                self.0.avatar(player)
            }
            fn player_count(&self) -> usize {
                self.0.player_count()
            }
            fn current_player(&self) -> PlayerId {
                self.0.current_player()
            }
            fn turn(&self) -> u32 {
                self.0.turn()
            }
            fn hand_size(&self, player: PlayerId) -> usize {
                self.0.hand_size(player)
            }
        }
    };
}

/// A facade that refuses every mutation.
pub struct ReadOnly<'a, V: RulesView + ?Sized>(pub &'a V);

delegate_view!(ReadOnly);

impl<V: RulesView + ?Sized> RulesApi for ReadOnly<'_, V> {}

/// A facade that only permits derived-stat buffs.
pub struct BuffOnly<'a, V: RulesView + ?Sized>(pub &'a mut V);

delegate_view!(BuffOnly);

impl<A: RulesApi + ?Sized> RulesApi for BuffOnly<'_, A> {
    fn buff(&mut self, target: EntityId, stat: &str, delta: i64) -> ScriptResult<()> {
        self.0.buff(target, stat, delta)
    }
}
