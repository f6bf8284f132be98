//! The per-match rule system: event queue, dispatch and recalculation.
//!
//! ## Dispatch loop
//!
//! Each top-level command ends with one `drain`. For every queued event,
//! in FIFO order:
//!
//! 1. append it to the history,
//! 2. snapshot the active entity list and run every matching rule of
//!    every entity that still carries `IN_PLAY`,
//! 3. apply the engine's own consequences of the event (turn advance,
//!    removal of the dead and of spent spells),
//! 4. purge entities marked for removal,
//! 5. recalculate derived stats and kill anything left at zero health,
//! 6. broadcast the event to every connected player.
//!
//! Each rule runs against a checkpoint of the state. A rule that fails
//! is rolled back to that checkpoint and logged, so none of its effects
//! survive. Dispatching more than `max_events` events for one drain is
//! fatal to the match.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};
use serde::Serialize;
use tracing::{debug, error, warn};

use super::error::{MatchError, MatchResult};
use super::recalc;
use super::state::{MatchState, PlayerSetup};
use crate::cards::{CardCatalog, CardId};
use crate::core::{EntityId, GameRngState, MatchConfig, PlayerId};
use crate::entities::{stats, tags, EntitySnapshot};
use crate::events::{EventKind, EventView, GameEvent};
use crate::rules::RuleId;
use crate::script::{Program, ReadOnly, RulesApi, RulesView, ScriptContext, ScriptError, ScriptLimits};

/// Rule evaluation for one match.
#[derive(Debug)]
pub struct RuleSystem {
    state: MatchState,
    scripts: ScriptContext,
    config: MatchConfig,
}

impl RuleSystem {
    /// Seat the players. Nothing runs until `start`.
    pub fn new(
        catalog: Arc<CardCatalog>,
        config: MatchConfig,
        players: Vec<PlayerSetup>,
    ) -> MatchResult<Self> {
        let state = MatchState::new(catalog, &config, players)?;
        Ok(Self {
            state,
            scripts: ScriptContext::new(ScriptLimits::from_config(&config)),
            config,
        })
    }

    /// The match state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Mutable match state, for command execution.
    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Shuffle decks, run startup rules and the first turn start.
    ///
    /// A failing startup rule is fatal.
    pub fn start(&mut self) -> MatchResult<()> {
        {
            let MatchState { seats, rng, .. } = &mut self.state;
            for (_, seat) in seats.iter_mut() {
                rng.shuffle(&mut seat.deck);
            }
        }
        self.recalculate();

        if let Some((rule, source)) = self.dispatch(None).into_iter().next() {
            error!(rule = %rule, error = %source, "startup rule failed");
            return Err(MatchError::StartupScript {
                rule: rule.to_string(),
                source,
            });
        }

        let first = PlayerId::new(0);
        self.state.begin_turn(first);
        self.state.queue_event(GameEvent::new(EventKind::GameStarted));
        self.state.queue_event(GameEvent::new(EventKind::TurnStarted {
            player: first,
            turn: 0,
        }));
        self.settle();
        self.drain().map(|_| ())
    }

    /// Dispatch queued events until the queue is empty.
    ///
    /// Returns how many events were dispatched.
    pub fn drain(&mut self) -> MatchResult<usize> {
        let ceiling = self.config.max_events;
        let mut processed = 0;
        while !self.state.queue.is_empty() {
            if processed >= ceiling {
                error!(ceiling, pending = self.state.queue.len(), "event ceiling exceeded");
                self.state.queue.clear();
                return Err(MatchError::EventCeilingExceeded(ceiling));
            }
            let Some(event) = self.state.queue.pop_front() else {
                break;
            };
            processed += 1;

            let seq = self.state.history.len() as u64;
            self.state.history.push_back(event.clone());
            debug!(seq, event = event.name(), cause = ?event.cause, "dispatch");

            for (rule, err) in self.dispatch(Some(&event)) {
                warn!(rule = %rule, event = event.name(), error = %err, "rule failed");
            }
            self.resolve(&event);
            self.settle();
            self.broadcast(seq, &event);
        }
        Ok(processed)
    }

    /// Run every matching rule for `event` (`None` = startup).
    ///
    /// Returns the rules that failed, in firing order. Their effects have
    /// already been undone.
    fn dispatch(&mut self, event: Option<&GameEvent>) -> Vec<(RuleId, ScriptError)> {
        let mut failures = Vec::new();
        let snapshot = self.state.entities.snapshot();
        for id in snapshot.iter().copied() {
            let rules: Vec<(RuleId, Arc<Program>)> = match self.state.entities.get(id) {
                Some(entity) if entity.is_in_play() => entity
                    .rules()
                    .iter()
                    .filter(|r| r.trigger.matches(event))
                    .map(|r| (r.id.clone(), Arc::clone(&r.program)))
                    .collect(),
                _ => continue,
            };
            for (rule, program) in rules {
                self.scripts.bind(event, Some(id));
                let checkpoint = self.state.checkpoint();
                if let Err(err) = self.scripts.run(&program, &mut self.state, rule.as_str()) {
                    self.state.rollback(checkpoint);
                    failures.push((rule, err));
                }
            }
        }
        failures
    }

    /// The engine's own consequences of an event.
    fn resolve(&mut self, event: &GameEvent) {
        match &event.kind {
            EventKind::TurnEnded { turn, .. } if *turn == self.state.turn => {
                self.state.turn += 1;
                let next = self.state.current_player();
                self.state.begin_turn(next);
                self.state.queue_event(GameEvent::new(EventKind::TurnStarted {
                    player: next,
                    turn: self.state.turn,
                }));
            }
            EventKind::Attack { attacker, defender } => {
                self.combat(*attacker, *defender);
            }
            EventKind::EntityKilled { entity } => {
                self.state.entities.mark_for_removal(*entity);
                let is_player = self
                    .state
                    .entities
                    .get(*entity)
                    .is_some_and(|e| e.has_tag(tags::PLAYER));
                if is_player {
                    self.state.check_survivors();
                }
            }
            EventKind::CardPlayed { card, .. } => {
                let is_minion = self
                    .state
                    .entities
                    .get(*card)
                    .is_some_and(|e| e.has_tag(tags::MINION));
                if !is_minion {
                    self.state.entities.mark_for_removal(*card);
                }
            }
            _ => {}
        }
    }

    /// Both combatants strike each other with their current attack.
    fn combat(&mut self, attacker: EntityId, defender: EntityId) {
        let strike = |state: &MatchState, from: EntityId| {
            state
                .entities
                .get(from)
                .filter(|e| e.is_in_play())
                .map_or(0, |e| e.current_value(stats::ATTACK))
        };
        let forward = strike(&self.state, attacker);
        let back = strike(&self.state, defender);
        for (from, to, amount) in [(attacker, defender, forward), (defender, attacker, back)] {
            if let Err(err) = self.state.deal_damage(Some(from), to, amount) {
                debug!(%from, %to, error = %err, "combat damage skipped");
            }
        }
    }

    /// Purge, recalculate, then kill anything left at zero health.
    fn settle(&mut self) {
        self.state.purge();
        self.recalculate();
        self.state.check_lethal();
    }

    /// Run the stat recalculation pass.
    pub fn recalculate(&mut self) {
        recalc::recalculate(&mut self.state, &mut self.scripts);
    }

    fn broadcast(&mut self, seq: u64, event: &GameEvent) {
        let MatchState { seats, entities, .. } = &mut self.state;
        for (player, seat) in seats.iter_mut() {
            let Some(outbox) = &seat.outbox else { continue };
            let view = EventView::for_player(seq, event, player, entities);
            if outbox.send(view).is_err() {
                debug!(%player, "player disconnected");
                seat.outbox = None;
            }
        }
    }

    /// Open `player`'s event channel, replacing any earlier one.
    pub fn connect(&mut self, player: PlayerId) -> MatchResult<Receiver<EventView>> {
        let seat = self
            .state
            .seats
            .get_mut(player)
            .ok_or(MatchError::UnknownPlayer(player))?;
        let (tx, rx) = unbounded();
        seat.outbox = Some(tx);
        Ok(rx)
    }

    /// Run a play validator against the current state, read-only.
    ///
    /// `host` is the card being played and `event` the play it would
    /// produce. Returns the rejection messages, empty if the play passes.
    pub fn run_validator(
        &self,
        validator: &str,
        program: &Program,
        host: EntityId,
        event: &GameEvent,
    ) -> Result<Vec<String>, ScriptError> {
        let mut scripts = ScriptContext::new(self.scripts.limits());
        scripts.bind(Some(event), Some(host));
        scripts.run(program, &mut ReadOnly(&self.state), validator)?;
        Ok(scripts.take_rejections())
    }

    /// A byte encoding of the observable match state.
    ///
    /// Two equal fingerprints mean no entity, seat, turn, queue or history
    /// length differs.
    pub fn fingerprint(&self) -> Result<Vec<u8>, bincode::Error> {
        let state = &self.state;
        let fingerprint = Fingerprint {
            entities: state.entities.iter_all().map(|e| e.snapshot()).collect(),
            active: state.entities.snapshot().iter().copied().collect(),
            pending: state.entities.pending_removal(),
            seats: state
                .seats
                .iter()
                .map(|(_, s)| (s.name.as_str(), s.avatar, s.deck.as_slice()))
                .collect(),
            turn: state.turn,
            history: state.history.len(),
            queue: state.queue.iter().collect(),
            outcome: state.outcome,
            rng: state.rng.state(),
        };
        bincode::serialize(&fingerprint)
    }

    /// Current player, for convenience.
    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.state.current_player()
    }
}

#[derive(Serialize)]
struct Fingerprint<'a> {
    entities: Vec<EntitySnapshot>,
    active: Vec<EntityId>,
    pending: &'a [EntityId],
    seats: Vec<(&'a str, EntityId, &'a [CardId])>,
    turn: u32,
    history: usize,
    queue: Vec<&'a GameEvent>,
    outcome: Option<Option<PlayerId>>,
    rng: GameRngState,
}
