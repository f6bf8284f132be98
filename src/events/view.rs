//! Per-player event views.
//!
//! Filtering happens at broadcast time: the same event produces a
//! different view for each recipient. A card that is `IN_HAND` and owned
//! by someone other than the viewer is reduced to its id and owner.

use serde::{Deserialize, Serialize};

use super::event::{EventKind, GameEvent};
use crate::cards::CardId;
use crate::core::{EntityId, PlayerId};
use crate::entities::{tags, EntityStore, GameEntity};

/// What one player may see of an entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub owner: Option<PlayerId>,
    /// True when the identity below has been withheld from this viewer.
    pub hidden: bool,
    pub name: Option<String>,
    pub card: Option<CardId>,
    pub tags: Vec<String>,
    pub stats: Vec<(String, i64)>,
    pub vars: Vec<(String, i64)>,
}

impl EntityView {
    /// Build `entity`'s view for `viewer`.
    #[must_use]
    pub fn of(entity: &GameEntity, viewer: PlayerId) -> Self {
        let hidden = entity.has_tag(tags::IN_HAND) && entity.owner != Some(viewer);
        if hidden {
            return Self {
                id: entity.id,
                owner: entity.owner,
                hidden: true,
                name: None,
                card: None,
                tags: Vec::new(),
                stats: Vec::new(),
                vars: Vec::new(),
            };
        }
        let snapshot = entity.snapshot();
        Self {
            id: entity.id,
            owner: entity.owner,
            hidden: false,
            name: Some(snapshot.name),
            card: snapshot.card,
            tags: snapshot.tags,
            stats: snapshot.derived,
            vars: snapshot.vars,
        }
    }
}

/// One event as delivered to one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
    /// Position of the event in the match history.
    pub seq: u64,
    pub event: EventKind,
    pub cause: Option<EntityId>,
    /// Entities the event mentions, as seen by the recipient.
    pub entities: Vec<EntityView>,
}

impl EventView {
    /// Build the view of `event` for `viewer`.
    #[must_use]
    pub fn for_player(seq: u64, event: &GameEvent, viewer: PlayerId, store: &EntityStore) -> Self {
        let entities = event
            .entities()
            .into_iter()
            .filter_map(|id| store.get(id))
            .map(|entity| EntityView::of(entity, viewer))
            .collect();
        Self {
            seq,
            event: event.kind.clone(),
            cause: event.cause,
            entities,
        }
    }

    /// The view of entity `id`, if the event mentions it.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&EntityView> {
        self.entities.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::stats;

    fn store_with_card(tag: &str) -> (EntityStore, EntityId) {
        let mut store = EntityStore::new();
        let id = store.alloc_id();
        let card = GameEntity::new(id, "Fireball", Some(PlayerId::new(0)))
            .with_card(CardId(9))
            .with_tag(tag)
            .with_base(stats::COST, 4);
        store.insert(card);
        (store, id)
    }

    #[test]
    fn test_hand_card_hidden_from_opponent() {
        let (store, id) = store_with_card(tags::IN_HAND);
        let event = GameEvent::new(EventKind::CardDrawn {
            player: PlayerId::new(0),
            card: id,
        });

        let mine = EventView::for_player(0, &event, PlayerId::new(0), &store);
        let theirs = EventView::for_player(0, &event, PlayerId::new(1), &store);

        let own_view = mine.entity(id).unwrap();
        assert!(!own_view.hidden);
        assert_eq!(own_view.name.as_deref(), Some("Fireball"));
        assert_eq!(own_view.card, Some(CardId(9)));

        let other_view = theirs.entity(id).unwrap();
        assert!(other_view.hidden);
        assert_eq!(other_view.name, None);
        assert_eq!(other_view.card, None);
        assert!(other_view.stats.is_empty());
    }

    #[test]
    fn test_in_play_card_visible_to_all() {
        let (store, id) = store_with_card(tags::IN_PLAY);
        let event = GameEvent::new(EventKind::EntityKilled { entity: id });
        let view = EventView::for_player(3, &event, PlayerId::new(1), &store);
        assert_eq!(view.seq, 3);
        assert!(!view.entity(id).unwrap().hidden);
    }

    #[test]
    fn test_view_serializes_with_event_tag() {
        let (store, id) = store_with_card(tags::IN_HAND);
        let event = GameEvent::new(EventKind::CardDrawn {
            player: PlayerId::new(0),
            card: id,
        });
        let view = EventView::for_player(1, &event, PlayerId::new(1), &store);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["event"]["kind"], "CardDrawn");
        assert_eq!(json["entities"][0]["hidden"], true);
    }
}
