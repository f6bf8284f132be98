//! Stat recalculation.
//!
//! Runs after every dispatched event, in two phases plus a clamp:
//!
//! 1. Reset every active entity's derived values to its base values.
//! 2. For every in-play entity, in entity order then attachment order,
//!    run the rules triggered by buff recalculation. These scripts may
//!    only `Buff`; anything else fails that rule, and a failed rule's
//!    buffs are undone.
//! 3. Cap every `CURRENT_X` variable at its `MAX_X` value.
//!
//! Because phase 1 starts from base values, running the pass twice with
//! no state change in between yields the same result.

use std::sync::Arc;

use tracing::warn;

use super::state::MatchState;
use crate::core::EntityId;
use crate::rules::{RuleId, Trigger};
use crate::script::{BuffOnly, Program, ScriptContext};

/// Run a full recalculation over `state`.
pub fn recalculate(state: &mut MatchState, scripts: &mut ScriptContext) {
    let snapshot = state.entities.snapshot();

    for id in snapshot.iter() {
        if let Some(entity) = state.entities.get_mut(*id) {
            entity.reset_derived();
        }
    }

    for id in snapshot.iter() {
        for (rule, program) in buff_rules(state, *id) {
            scripts.bind(None, Some(*id));
            let checkpoint = state.checkpoint();
            let result = scripts.run(&program, &mut BuffOnly(&mut *state), rule.as_str());
            if let Err(err) = result {
                state.rollback(checkpoint);
                warn!(entity = %id, rule = %rule, error = %err, "buff rule failed");
            }
        }
    }

    for id in snapshot.iter() {
        if let Some(entity) = state.entities.get_mut(*id) {
            entity.clamp_to_max();
        }
    }
}

fn buff_rules(state: &MatchState, id: EntityId) -> Vec<(RuleId, Arc<Program>)> {
    match state.entities.get(id) {
        Some(entity) if entity.is_in_play() => entity
            .rules_for(&Trigger::BuffRecalc)
            .map(|r| (r.id.clone(), Arc::clone(&r.program)))
            .collect(),
        _ => Vec::new(),
    }
}
