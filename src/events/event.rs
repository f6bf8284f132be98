//! Game events: immutable records of what happened.
//!
//! `EventKind` is a closed sum type. Its variant name is the string rule
//! triggers match against, so renaming a variant changes which rules fire.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// Everything that can happen in a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventKind {
    /// The match has started and startup rules have run.
    GameStarted,
    /// `player` begins turn number `turn`.
    TurnStarted { player: PlayerId, turn: u32 },
    /// `player` ended turn number `turn`.
    TurnEnded { player: PlayerId, turn: u32 },
    /// `card` moved from `player`'s deck into their hand.
    CardDrawn { player: PlayerId, card: EntityId },
    /// `card` was drawn into a full hand and destroyed.
    CardBurned { player: PlayerId, card: EntityId },
    /// `player` tried to draw from an empty deck.
    Fatigue { player: PlayerId, amount: i64 },
    /// `player` played `card` from hand, optionally at `target`.
    CardPlayed {
        player: PlayerId,
        card: EntityId,
        target: Option<EntityId>,
    },
    /// A minion card entered play.
    MinionSummoned { player: PlayerId, minion: EntityId },
    /// A rule created `entity` directly in play.
    EntitySpawned {
        player: Option<PlayerId>,
        entity: EntityId,
    },
    /// `attacker` attacked `defender`.
    Attack {
        attacker: EntityId,
        defender: EntityId,
    },
    /// `target` lost `amount` health.
    DamageDealt { target: EntityId, amount: i64 },
    /// `target` regained `amount` health.
    Healed { target: EntityId, amount: i64 },
    /// `entity` reached zero health or was destroyed.
    EntityKilled { entity: EntityId },
    /// Free-form chat from `player`.
    Chat { player: PlayerId, message: String },
    /// The match ended. `None` is a draw.
    GameOver { winner: Option<PlayerId> },
}

impl EventKind {
    /// The trigger name rules use to select this event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GameStarted => "GameStarted",
            Self::TurnStarted { .. } => "TurnStarted",
            Self::TurnEnded { .. } => "TurnEnded",
            Self::CardDrawn { .. } => "CardDrawn",
            Self::CardBurned { .. } => "CardBurned",
            Self::Fatigue { .. } => "Fatigue",
            Self::CardPlayed { .. } => "CardPlayed",
            Self::MinionSummoned { .. } => "MinionSummoned",
            Self::EntitySpawned { .. } => "EntitySpawned",
            Self::Attack { .. } => "Attack",
            Self::DamageDealt { .. } => "DamageDealt",
            Self::Healed { .. } => "Healed",
            Self::EntityKilled { .. } => "EntityKilled",
            Self::Chat { .. } => "Chat",
            Self::GameOver { .. } => "GameOver",
        }
    }
}

/// An event plus the entity that caused it, if any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    pub cause: Option<EntityId>,
}

impl GameEvent {
    /// An event with no causing entity.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self { kind, cause: None }
    }

    /// An event caused by `cause`.
    #[must_use]
    pub fn caused_by(kind: EventKind, cause: Option<EntityId>) -> Self {
        Self { kind, cause }
    }

    /// Trigger name of the event kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// The entity the event is primarily about.
    #[must_use]
    pub fn subject(&self) -> Option<EntityId> {
        match &self.kind {
            EventKind::CardDrawn { card, .. }
            | EventKind::CardBurned { card, .. }
            | EventKind::CardPlayed { card, .. } => Some(*card),
            EventKind::MinionSummoned { minion, .. } => Some(*minion),
            EventKind::EntitySpawned { entity, .. } | EventKind::EntityKilled { entity } => {
                Some(*entity)
            }
            EventKind::Attack { attacker, .. } => Some(*attacker),
            EventKind::DamageDealt { target, .. } | EventKind::Healed { target, .. } => {
                Some(*target)
            }
            _ => None,
        }
    }

    /// The entity the event is directed at.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match &self.kind {
            EventKind::CardPlayed { target, .. } => *target,
            EventKind::Attack { defender, .. } => Some(*defender),
            EventKind::DamageDealt { target, .. } | EventKind::Healed { target, .. } => {
                Some(*target)
            }
            _ => None,
        }
    }

    /// The player the event concerns.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match &self.kind {
            EventKind::TurnStarted { player, .. }
            | EventKind::TurnEnded { player, .. }
            | EventKind::CardDrawn { player, .. }
            | EventKind::CardBurned { player, .. }
            | EventKind::Fatigue { player, .. }
            | EventKind::CardPlayed { player, .. }
            | EventKind::MinionSummoned { player, .. }
            | EventKind::Chat { player, .. } => Some(*player),
            EventKind::EntitySpawned { player, .. } => *player,
            EventKind::GameOver { winner } => *winner,
            _ => None,
        }
    }

    /// The numeric payload (damage, healing, fatigue), 0 if none.
    #[must_use]
    pub fn amount(&self) -> i64 {
        match &self.kind {
            EventKind::Fatigue { amount, .. }
            | EventKind::DamageDealt { amount, .. }
            | EventKind::Healed { amount, .. } => *amount,
            EventKind::TurnStarted { turn, .. } | EventKind::TurnEnded { turn, .. } => {
                i64::from(*turn)
            }
            _ => 0,
        }
    }

    /// Every entity the event mentions, cause first, without duplicates.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityId> {
        let mut ids = Vec::with_capacity(3);
        for id in [self.cause, self.subject(), self.target()].into_iter().flatten() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

impl std::fmt::Display for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())?;
        if let Some(cause) = self.cause {
            write!(f, " (by {cause})")?;
        }
        Ok(())
    }
}
