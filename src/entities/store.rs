//! Entity store: an indexed arena with an insertion-ordered active list.
//!
//! Entities are never physically deleted during a match. Removing one
//! marks it; the next `purge` (run between events) clears its `IN_PLAY`
//! tag and detaches it from the active list. The entity itself stays
//! addressable by id so history and client views can still describe it.
//!
//! The active list is an `im::Vector`, so taking a dispatch snapshot is
//! O(1) and later spawns or purges cannot disturb an in-flight iteration.
//! The entity map is an `im::HashMap` for the same reason: cloning the
//! whole store to undo a failed rule costs O(1).

use std::hash::BuildHasherDefault;

use im::{HashMap, Vector};
use rustc_hash::FxHasher;

use super::entity::GameEntity;
use super::keys::tags;
use crate::core::{EntityId, PlayerId};

type EntityMap = HashMap<EntityId, GameEntity, BuildHasherDefault<FxHasher>>;

/// All entities of one match.
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    entities: EntityMap,
    active: Vector<EntityId>,
    pending_removal: Vec<EntityId>,
    next_id: EntityId,
}

impl EntityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next entity id.
    pub fn alloc_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// Insert an entity at the end of the active list.
    ///
    /// The entity's id must come from `alloc_id`.
    pub fn insert(&mut self, entity: GameEntity) -> EntityId {
        let id = entity.id;
        debug_assert!(!self.entities.contains_key(&id), "entity id reused");
        self.entities.insert(id, entity);
        self.active.push_back(id);
        id
    }

    /// Look up any entity ever spawned, including purged ones.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&GameEntity> {
        self.entities.get(&id)
    }

    /// Mutable lookup of any entity ever spawned.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut GameEntity> {
        self.entities.get_mut(&id)
    }

    /// Look up an entity that is still in the active collection.
    #[must_use]
    pub fn get_active(&self, id: EntityId) -> Option<&GameEntity> {
        if self.is_active(id) {
            self.entities.get(&id)
        } else {
            None
        }
    }

    /// Whether `id` is still in the active collection.
    #[must_use]
    pub fn is_active(&self, id: EntityId) -> bool {
        self.active.contains(&id)
    }

    /// Whether `id` is active and tagged `IN_PLAY`.
    #[must_use]
    pub fn is_in_play(&self, id: EntityId) -> bool {
        self.get_active(id).is_some_and(GameEntity::is_in_play)
    }

    /// O(1) snapshot of the active list in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vector<EntityId> {
        self.active.clone()
    }

    /// Iterate active entities in insertion order.
    pub fn iter_active(&self) -> impl Iterator<Item = &GameEntity> {
        self.active.iter().filter_map(move |id| self.entities.get(id))
    }

    /// Iterate every entity ever spawned, in id order.
    pub fn iter_all(&self) -> impl Iterator<Item = &GameEntity> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort();
        ids.into_iter().filter_map(move |id| self.entities.get(&id))
    }

    /// Active entities owned by `player` that carry `tag`, in order.
    pub fn owned_with_tag<'a>(
        &'a self,
        player: PlayerId,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a GameEntity> + 'a {
        self.iter_active()
            .filter(move |e| e.owner == Some(player) && e.has_tag(tag))
    }

    /// Cards currently in `player`'s hand.
    #[must_use]
    pub fn hand(&self, player: PlayerId) -> Vec<EntityId> {
        self.owned_with_tag(player, tags::IN_HAND).map(|e| e.id).collect()
    }

    /// Mark an active entity for removal at the next purge.
    ///
    /// Returns false if it is unknown, inactive, or already marked.
    pub fn mark_for_removal(&mut self, id: EntityId) -> bool {
        if !self.is_active(id) || self.pending_removal.contains(&id) {
            return false;
        }
        self.pending_removal.push(id);
        true
    }

    /// Entities marked but not yet purged.
    #[must_use]
    pub fn pending_removal(&self) -> &[EntityId] {
        &self.pending_removal
    }

    /// Detach all marked entities. Returns the purged ids in marking order.
    pub fn purge(&mut self) -> Vec<EntityId> {
        if self.pending_removal.is_empty() {
            return Vec::new();
        }
        let purged = std::mem::take(&mut self.pending_removal);
        for id in &purged {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.remove_tag(tags::IN_PLAY);
            }
        }
        self.active.retain(|id| !purged.contains(id));
        purged
    }

    /// Number of active entities.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }
}
