//! Game entities - the single concrete type for every game object.
//!
//! An entity is a bag of data: tags, base stats, derived stat values,
//! runtime variables and attached rules. There is no subclassing; a
//! minion, a spell in hand and a player avatar differ only in their tags
//! and stats.
//!
//! ## Stats vs. variables
//!
//! - **Base stats** (`MAX_HEALTH`, `ATTACK`, `COST`) are the printed values.
//! - **Derived values** are recomputed after every event: reset to base,
//!   then adjusted by buff rules. Nothing else writes them.
//! - **Variables** (`CURRENT_HEALTH`, `ATTACKS_REMAINING`) are runtime
//!   state that survives recalculation.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::keys::{stats, tags, vars, CURRENT_PREFIX, MAX_PREFIX};
use crate::cards::CardId;
use crate::core::{EntityId, PlayerId};
use crate::rules::{EntityRule, Trigger};

/// A mutable game object living inside exactly one match.
#[derive(Clone, Debug)]
pub struct GameEntity {
    /// Match-scoped unique id.
    pub id: EntityId,

    /// Display name (usually the prototype's name).
    pub name: String,

    /// Owning player. `None` for unowned entities such as the global rules holder.
    pub owner: Option<PlayerId>,

    /// Prototype this entity was created from.
    pub card: Option<CardId>,

    tags: SmallVec<[String; 4]>,
    base: FxHashMap<String, i64>,
    derived: FxHashMap<String, i64>,
    vars: FxHashMap<String, i64>,
    rules: Vec<EntityRule>,
}

impl GameEntity {
    /// Create an empty entity.
    #[must_use]
    pub fn new(id: EntityId, name: impl Into<String>, owner: Option<PlayerId>) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            card: None,
            tags: SmallVec::new(),
            base: FxHashMap::default(),
            derived: FxHashMap::default(),
            vars: FxHashMap::default(),
            rules: Vec::new(),
        }
    }

    /// Set the prototype (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardId) -> Self {
        self.card = Some(card);
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.add_tag(tag);
        self
    }

    /// Set a base stat (builder pattern).
    #[must_use]
    pub fn with_base(mut self, stat: impl Into<String>, value: i64) -> Self {
        self.set_base(stat, value);
        self
    }

    /// Attach a rule (builder pattern).
    #[must_use]
    pub fn with_rule(mut self, rule: EntityRule) -> Self {
        self.rules.push(rule);
        self
    }

    // === Tags ===

    /// Check whether the entity carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag. Returns false if it was already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.has_tag(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Remove a tag. Returns false if it was absent.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Tags in the order they were added.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Shorthand for `has_tag(IN_PLAY)`.
    #[must_use]
    pub fn is_in_play(&self) -> bool {
        self.has_tag(tags::IN_PLAY)
    }

    // === Stats ===

    /// The printed value of a stat, 0 if absent.
    #[must_use]
    pub fn base_value(&self, stat: &str) -> i64 {
        self.base.get(stat).copied().unwrap_or(0)
    }

    /// Check whether a base stat is defined at all.
    #[must_use]
    pub fn has_base(&self, stat: &str) -> bool {
        self.base.contains_key(stat)
    }

    /// Overwrite a base stat, clamped at zero.
    pub fn set_base(&mut self, stat: impl Into<String>, value: i64) {
        self.base.insert(stat.into(), value.max(0));
    }

    /// Adjust a base stat permanently, clamped at zero.
    pub fn adjust_base(&mut self, stat: &str, delta: i64) {
        let value = self.base_value(stat).saturating_add(delta).max(0);
        self.base.insert(stat.to_string(), value);
    }

    /// The derived value of a stat: base plus currently applied buffs.
    ///
    /// Falls back to the base value for stats not yet recalculated.
    #[must_use]
    pub fn current_value(&self, stat: &str) -> i64 {
        self.derived
            .get(stat)
            .copied()
            .unwrap_or_else(|| self.base_value(stat))
    }

    /// Reset all derived values to their base values.
    pub fn reset_derived(&mut self) {
        self.derived.clone_from(&self.base);
    }

    /// Apply a buff delta to a derived value, clamped at zero.
    pub fn adjust_derived(&mut self, stat: &str, delta: i64) {
        let value = self.current_value(stat).saturating_add(delta).max(0);
        self.derived.insert(stat.to_string(), value);
    }

    // === Variables ===

    /// A runtime variable, 0 if unset.
    #[must_use]
    pub fn var(&self, name: &str) -> i64 {
        self.vars.get(name).copied().unwrap_or(0)
    }

    /// Set a runtime variable.
    pub fn set_var(&mut self, name: impl Into<String>, value: i64) {
        self.vars.insert(name.into(), value);
    }

    /// Add to a runtime variable.
    pub fn add_var(&mut self, name: &str, delta: i64) {
        let value = self.var(name).saturating_add(delta);
        self.vars.insert(name.to_string(), value);
    }

    /// Current health, for entities that have one.
    #[must_use]
    pub fn health(&self) -> i64 {
        self.var(vars::CURRENT_HEALTH)
    }

    /// Whether this entity can take damage and die.
    #[must_use]
    pub fn has_health(&self) -> bool {
        self.has_base(stats::MAX_HEALTH)
    }

    /// Mark the entity as entering play: tag it and fill its health.
    pub fn enter_play(&mut self) {
        self.remove_tag(tags::IN_HAND);
        self.add_tag(tags::IN_PLAY);
        if self.has_health() {
            let max = self.current_value(stats::MAX_HEALTH);
            self.set_var(vars::CURRENT_HEALTH, max);
        }
    }

    /// Cap every `CURRENT_X` variable at its `MAX_X` derived value.
    pub fn clamp_to_max(&mut self) {
        let derived = &self.derived;
        let base = &self.base;
        for (name, value) in self.vars.iter_mut() {
            let Some(suffix) = name.strip_prefix(CURRENT_PREFIX) else {
                continue;
            };
            let max_key = format!("{MAX_PREFIX}{suffix}");
            let cap = derived.get(&max_key).or_else(|| base.get(&max_key));
            if let Some(&cap) = cap {
                if *value > cap {
                    *value = cap;
                }
            }
        }
    }

    // === Rules ===

    /// Attached rules, in attachment order.
    #[must_use]
    pub fn rules(&self) -> &[EntityRule] {
        &self.rules
    }

    /// Rules whose trigger equals `trigger`, in attachment order.
    pub fn rules_for<'a>(&'a self, trigger: &'a Trigger) -> impl Iterator<Item = &'a EntityRule> {
        self.rules.iter().filter(move |r| &r.trigger == trigger)
    }

    /// Attach a rule at the end of the list.
    pub fn add_rule(&mut self, rule: EntityRule) {
        self.rules.push(rule);
    }

    /// Detach every rule with `rule_id`. Returns how many were removed.
    pub fn remove_rule(&mut self, rule_id: &str) -> usize {
        let before = self.rules.len();
        self.rules.retain(|r| r.id.as_str() != rule_id);
        before - self.rules.len()
    }

    /// Remove every non-permanent rule. Returns how many were removed.
    pub fn disenchant(&mut self) -> usize {
        let before = self.rules.len();
        self.rules.retain(|r| r.permanent);
        before - self.rules.len()
    }

    /// A deterministic, serializable copy of this entity's state.
    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            name: self.name.clone(),
            owner: self.owner,
            card: self.card,
            tags: self.tags.iter().cloned().collect(),
            base: sorted(&self.base),
            derived: sorted(&self.derived),
            vars: sorted(&self.vars),
            rules: self.rules.iter().map(|r| r.id.as_str().to_string()).collect(),
        }
    }
}

fn sorted(map: &FxHashMap<String, i64>) -> Vec<(String, i64)> {
    let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort();
    entries
}

/// Serializable entity state with map entries in sorted order.
///
/// Used for state fingerprints and for the public part of client views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub name: String,
    pub owner: Option<PlayerId>,
    pub card: Option<CardId>,
    pub tags: Vec<String>,
    pub base: Vec<(String, i64)>,
    pub derived: Vec<(String, i64)>,
    pub vars: Vec<(String, i64)>,
    pub rules: Vec<String>,
}
