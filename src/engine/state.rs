//! Match state: everything a rule script can observe or change.
//!
//! `MatchState` is the `RulesApi` implementation handed to rule scripts
//! during dispatch. All mutations that produce events (damage, draws,
//! spawns, kills) queue them here; the owning `RuleSystem` drains them.

use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::Sender;
use im::Vector;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{MatchError, MatchResult};
use crate::cards::{CardCatalog, CardId};
use crate::core::{EntityId, GameRng, MatchConfig, PlayerId, PlayerMap};
use crate::entities::{stats, tags, vars, EntityStore, GameEntity};
use crate::events::{EventKind, EventView, GameEvent};
use crate::script::{require_in_play, RulesApi, RulesView, ScriptError, ScriptResult};

/// A player joining a match: display name and deck as card names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub name: String,
    pub deck: Vec<String>,
}

impl PlayerSetup {
    pub fn new(name: impl Into<String>, deck: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            deck: deck.into_iter().map(Into::into).collect(),
        }
    }
}

/// One player's seat at the table.
#[derive(Debug)]
pub struct PlayerSeat {
    pub name: String,
    pub avatar: EntityId,
    /// Remaining deck; the last element is the top.
    pub deck: Vec<CardId>,
    pub(crate) outbox: Option<Sender<EventView>>,
}

/// The mutable state of one match.
#[derive(Debug)]
pub struct MatchState {
    pub(crate) entities: EntityStore,
    pub(crate) seats: PlayerMap<PlayerSeat>,
    pub(crate) queue: VecDeque<GameEvent>,
    pub(crate) history: Vector<GameEvent>,
    pub(crate) turn: u32,
    pub(crate) rng: GameRng,
    /// `Some(winner)` once the game is over.
    pub(crate) outcome: Option<Option<PlayerId>>,
    /// Entities with an `EntityKilled` already queued.
    pub(crate) dying: FxHashSet<EntityId>,
    pub(crate) catalog: Arc<CardCatalog>,
    pub(crate) global: Option<EntityId>,
    max_hand_size: usize,
}

/// What a rule run may change, saved so a failed run can be undone.
///
/// Rules only append to the queue, so its length is enough to restore it.
#[derive(Debug)]
pub(crate) struct Checkpoint {
    entities: EntityStore,
    decks: Vec<Vec<CardId>>,
    queued: usize,
    outcome: Option<Option<PlayerId>>,
    dying: FxHashSet<EntityId>,
}

impl MatchState {
    /// Seat the players and spawn the global entity and avatars.
    pub fn new(
        catalog: Arc<CardCatalog>,
        config: &MatchConfig,
        players: Vec<PlayerSetup>,
    ) -> MatchResult<Self> {
        if players.is_empty() {
            return Err(MatchError::NoPlayers);
        }
        if players.len() > PlayerId::MAX_PLAYERS {
            return Err(MatchError::TooManyPlayers(players.len()));
        }
        let mut entities = EntityStore::new();

        let global = match &config.global_card {
            Some(name) => {
                let proto = catalog
                    .card_by_name(name)
                    .ok_or_else(|| MatchError::UnknownCard(name.clone()))?;
                let mut entity = proto.instantiate(entities.alloc_id(), None);
                entity.enter_play();
                Some(entities.insert(entity))
            }
            None => None,
        };

        let hero = catalog
            .card_by_name(&config.hero_card)
            .ok_or_else(|| MatchError::UnknownCard(config.hero_card.clone()))?;

        let mut seats = Vec::with_capacity(players.len());
        for (index, setup) in players.into_iter().enumerate() {
            let player = u8::try_from(index)
                .map(PlayerId::new)
                .map_err(|_| MatchError::TooManyPlayers(index + 1))?;
            let deck = setup
                .deck
                .iter()
                .map(|name| {
                    catalog
                        .card_by_name(name)
                        .map(|card| card.id)
                        .ok_or_else(|| MatchError::UnknownCard(name.clone()))
                })
                .collect::<MatchResult<Vec<_>>>()?;

            let mut avatar = hero.instantiate(entities.alloc_id(), Some(player));
            avatar.name.clone_from(&setup.name);
            avatar.add_tag(tags::PLAYER);
            avatar.enter_play();
            let avatar = entities.insert(avatar);

            seats.push(PlayerSeat {
                name: setup.name,
                avatar,
                deck,
                outbox: None,
            });
        }

        Ok(Self {
            entities,
            seats: PlayerMap::from_vec(seats),
            queue: VecDeque::new(),
            history: Vector::new(),
            turn: 0,
            rng: GameRng::new(config.seed),
            outcome: None,
            dying: FxHashSet::default(),
            catalog,
            global,
            max_hand_size: config.max_hand_size,
        })
    }

    // === Accessors ===

    /// The entity store.
    #[must_use]
    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    /// Mutable entity store.
    pub fn entities_mut(&mut self) -> &mut EntityStore {
        &mut self.entities
    }

    /// A player's seat.
    #[must_use]
    pub fn seat(&self, player: PlayerId) -> Option<&PlayerSeat> {
        self.seats.get(player)
    }

    /// Every dispatched event, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<GameEvent> {
        &self.history
    }

    /// Events waiting to be dispatched.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// The winner once the game is over (`Some(None)` for a draw).
    #[must_use]
    pub fn outcome(&self) -> Option<Option<PlayerId>> {
        self.outcome
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// The unowned global rules entity, if configured.
    #[must_use]
    pub fn global_entity(&self) -> Option<EntityId> {
        self.global
    }

    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// Energy `player` can still spend this turn.
    #[must_use]
    pub fn available_energy(&self, player: PlayerId) -> i64 {
        self.avatar_entity(player).map_or(0, |avatar| {
            avatar.current_value(stats::MAX_ENERGY) - avatar.var(vars::ENERGY_SPENT)
        })
    }

    fn avatar_entity(&self, player: PlayerId) -> Option<&GameEntity> {
        self.seats.get(player).and_then(|s| self.entities.get(s.avatar))
    }

    // === Rollback ===

    /// Save everything a rule run can change.
    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            entities: self.entities.clone(),
            decks: self.seats.iter().map(|(_, seat)| seat.deck.clone()).collect(),
            queued: self.queue.len(),
            outcome: self.outcome,
            dying: self.dying.clone(),
        }
    }

    /// Undo everything done since `checkpoint` was taken.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        let Checkpoint {
            entities,
            decks,
            queued,
            outcome,
            dying,
        } = checkpoint;
        self.entities = entities;
        for ((_, seat), deck) in self.seats.iter_mut().zip(decks) {
            seat.deck = deck;
        }
        self.queue.truncate(queued);
        self.outcome = outcome;
        self.dying = dying;
    }

    /// Detach entities marked for removal and forget their pending kills.
    pub(crate) fn purge(&mut self) {
        for id in self.entities.purge() {
            self.dying.remove(&id);
        }
    }

    // === Event plumbing ===

    /// Append an event to the dispatch queue.
    pub fn queue_event(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    /// Queue `EntityKilled` for `target` unless one is already queued.
    pub fn kill(&mut self, target: EntityId, cause: Option<EntityId>) {
        if !self.entities.is_active(target) || !self.dying.insert(target) {
            return;
        }
        self.queue_event(GameEvent::caused_by(
            EventKind::EntityKilled { entity: target },
            cause,
        ));
    }

    /// Kill every in-play entity left at zero health.
    pub fn check_lethal(&mut self) {
        let lethal: Vec<EntityId> = self
            .entities
            .iter_active()
            .filter(|e| e.is_in_play() && e.has_health() && e.health() <= 0)
            .map(|e| e.id)
            .collect();
        for id in lethal {
            self.kill(id, None);
        }
    }

    /// Refresh energy and minion attacks for `player`'s turn.
    pub fn begin_turn(&mut self, player: PlayerId) {
        let Some(seat) = self.seats.get(player) else {
            return;
        };
        let avatar = seat.avatar;
        if let Some(avatar) = self.entities.get_mut(avatar) {
            avatar.set_var(vars::ENERGY_SPENT, 0);
        }
        let minions: Vec<EntityId> = self
            .entities
            .owned_with_tag(player, tags::MINION)
            .filter(|e| e.is_in_play())
            .map(|e| e.id)
            .collect();
        for id in minions {
            if let Some(minion) = self.entities.get_mut(id) {
                minion.set_var(vars::ATTACKS_REMAINING, 1);
            }
        }
    }

    /// Put a card into play from wherever it is.
    ///
    /// Minions can attack right away only with `CHARGE`.
    pub fn enter_play(&mut self, id: EntityId) -> ScriptResult<()> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or(ScriptError::UnknownEntity(id))?;
        entity.enter_play();
        if entity.has_tag(tags::MINION) {
            let attacks = i64::from(entity.has_tag(tags::CHARGE));
            entity.set_var(vars::ATTACKS_REMAINING, attacks);
        }
        Ok(())
    }

    /// Declare the game over if at most one player's avatar survives.
    pub fn check_survivors(&mut self) {
        if self.is_over() {
            return;
        }
        let alive: Vec<PlayerId> = self
            .seats
            .iter()
            .filter(|(_, seat)| {
                !self.dying.contains(&seat.avatar) && self.entities.is_in_play(seat.avatar)
            })
            .map(|(player, _)| player)
            .collect();
        if alive.len() <= 1 {
            self.declare_winner(alive.first().copied());
        }
    }

    fn declare_winner(&mut self, winner: Option<PlayerId>) {
        if self.outcome.is_some() {
            return;
        }
        info!(?winner, turn = self.turn, "game over");
        self.outcome = Some(winner);
        self.queue_event(GameEvent::new(EventKind::GameOver { winner }));
    }

    fn draw_one(&mut self, player: PlayerId) -> ScriptResult<()> {
        let seat = self
            .seats
            .get_mut(player)
            .ok_or(ScriptError::UnknownPlayer(player))?;
        let avatar = seat.avatar;

        let Some(card) = seat.deck.pop() else {
            let fatigue = match self.entities.get_mut(avatar) {
                Some(avatar) => {
                    avatar.add_var(vars::FATIGUE, 1);
                    avatar.var(vars::FATIGUE)
                }
                None => return Err(ScriptError::UnknownEntity(avatar)),
            };
            debug!(%player, fatigue, "draw from empty deck");
            self.queue_event(GameEvent::new(EventKind::Fatigue {
                player,
                amount: fatigue,
            }));
            return self.deal_damage(None, avatar, fatigue);
        };

        let proto = self
            .catalog
            .card(card)
            .ok_or_else(|| ScriptError::UnknownCard(card.to_string()))?;
        let id = self.entities.alloc_id();
        let mut entity = proto.instantiate(id, Some(player));

        if self.entities.hand(player).len() >= self.max_hand_size {
            self.entities.insert(entity);
            self.entities.mark_for_removal(id);
            self.queue_event(GameEvent::new(EventKind::CardBurned { player, card: id }));
        } else {
            entity.add_tag(tags::IN_HAND);
            self.entities.insert(entity);
            self.queue_event(GameEvent::new(EventKind::CardDrawn { player, card: id }));
        }
        Ok(())
    }

    fn entity_mut(&mut self, id: EntityId) -> ScriptResult<&mut GameEntity> {
        self.entities.get_mut(id).ok_or(ScriptError::UnknownEntity(id))
    }
}

impl RulesView for MatchState {
    fn entity(&self, id: EntityId) -> Option<&GameEntity> {
        self.entities.get(id)
    }

    fn active_entities(&self) -> Vec<EntityId> {
        self.entities.snapshot().iter().copied().collect()
    }

    fn avatar(&self, player: PlayerId) -> Option<EntityId> {
        self.seats.get(player).map(|s| s.avatar)
    }

    fn player_count(&self) -> usize {
        self.seats.player_count()
    }

    fn current_player(&self) -> PlayerId {
        PlayerId::for_turn(self.turn, self.seats.player_count())
    }

    fn turn(&self) -> u32 {
        self.turn
    }

    fn hand_size(&self, player: PlayerId) -> usize {
        self.entities.hand(player).len()
    }
}

impl RulesApi for MatchState {
    fn deal_damage(&mut self, source: Option<EntityId>, target: EntityId, amount: i64) -> ScriptResult<()> {
        require_in_play(&*self, target)?;
        if amount <= 0 {
            return Ok(());
        }
        let entity = self.entity_mut(target)?;
        if !entity.has_health() {
            return Ok(());
        }
        let health = (entity.health() - amount).max(0);
        entity.set_var(vars::CURRENT_HEALTH, health);
        self.queue_event(GameEvent::caused_by(
            EventKind::DamageDealt { target, amount },
            source,
        ));
        if health == 0 {
            self.kill(target, source);
        }
        Ok(())
    }

    fn heal(&mut self, source: Option<EntityId>, target: EntityId, amount: i64) -> ScriptResult<()> {
        require_in_play(&*self, target)?;
        let entity = self.entity_mut(target)?;
        let missing = entity.current_value(stats::MAX_HEALTH) - entity.health();
        let healed = amount.min(missing);
        if healed <= 0 {
            return Ok(());
        }
        entity.add_var(vars::CURRENT_HEALTH, healed);
        self.queue_event(GameEvent::caused_by(
            EventKind::Healed {
                target,
                amount: healed,
            },
            source,
        ));
        Ok(())
    }

    fn draw(&mut self, player: PlayerId, count: u32) -> ScriptResult<()> {
        for _ in 0..count {
            self.draw_one(player)?;
        }
        Ok(())
    }

    fn add_rule(&mut self, target: EntityId, rule: &str) -> ScriptResult<()> {
        let rule = self
            .catalog
            .rule(rule)
            .cloned()
            .ok_or_else(|| ScriptError::UnknownRule(rule.to_string()))?;
        self.entity_mut(target)?.add_rule(rule);
        Ok(())
    }

    fn remove_rule(&mut self, target: EntityId, rule: &str) -> ScriptResult<()> {
        self.entity_mut(target)?.remove_rule(rule);
        Ok(())
    }

    fn disenchant(&mut self, target: EntityId) -> ScriptResult<()> {
        self.entity_mut(target)?.disenchant();
        Ok(())
    }

    fn spawn(&mut self, card: &str, owner: PlayerId, source: Option<EntityId>) -> ScriptResult<EntityId> {
        if !self.seats.contains(owner) {
            return Err(ScriptError::UnknownPlayer(owner));
        }
        let proto = self
            .catalog
            .card_by_name(card)
            .ok_or_else(|| ScriptError::UnknownCard(card.to_string()))?;
        let id = self.entities.alloc_id();
        self.entities.insert(proto.instantiate(id, Some(owner)));
        self.enter_play(id)?;
        self.queue_event(GameEvent::caused_by(
            EventKind::EntitySpawned {
                player: Some(owner),
                entity: id,
            },
            source,
        ));
        Ok(id)
    }

    fn destroy(&mut self, source: Option<EntityId>, target: EntityId) -> ScriptResult<()> {
        require_in_play(&*self, target)?;
        self.kill(target, source);
        Ok(())
    }

    fn buff(&mut self, target: EntityId, stat: &str, delta: i64) -> ScriptResult<()> {
        self.entity_mut(target)?.adjust_derived(stat, delta);
        Ok(())
    }

    fn set_var(&mut self, target: EntityId, var: &str, value: i64) -> ScriptResult<()> {
        self.entity_mut(target)?.set_var(var, value);
        Ok(())
    }

    fn add_var(&mut self, target: EntityId, var: &str, delta: i64) -> ScriptResult<()> {
        self.entity_mut(target)?.add_var(var, delta);
        Ok(())
    }

    fn add_base(&mut self, target: EntityId, stat: &str, delta: i64) -> ScriptResult<()> {
        self.entity_mut(target)?.adjust_base(stat, delta);
        Ok(())
    }

    fn add_tag(&mut self, target: EntityId, tag: &str) -> ScriptResult<()> {
        self.entity_mut(target)?.add_tag(tag);
        Ok(())
    }

    fn remove_tag(&mut self, target: EntityId, tag: &str) -> ScriptResult<()> {
        self.entity_mut(target)?.remove_tag(tag);
        Ok(())
    }

    fn game_over(&mut self, winner: Option<PlayerId>) -> ScriptResult<()> {
        if let Some(player) = winner {
            if !self.seats.contains(player) {
                return Err(ScriptError::UnknownPlayer(player));
            }
        }
        self.declare_winner(winner);
        Ok(())
    }
}
