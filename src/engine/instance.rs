//! Per-match container: lifecycle phase, activity clock, command entry.
//!
//! ```text
//! Created --start()--> Started --game over--> GameOver
//!    |                    |
//!    +--startup failure---+--event ceiling--> Aborted
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::error::{MatchError, MatchResult};
use super::state::{MatchState, PlayerSetup};
use super::system::RuleSystem;
use crate::cards::CardCatalog;
use crate::commands::{self, CommandError, CommandRequest, CommandResponse};
use crate::core::{MatchConfig, PlayerId};
use crate::events::EventView;

/// Registry-scoped match identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId(pub u64);

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Match({})", self.0)
    }
}

/// Where a match is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Created,
    Started,
    GameOver,
    /// Torn down by a fatal error.
    Aborted,
}

/// One match.
#[derive(Debug)]
pub struct GameInstance {
    id: MatchId,
    phase: MatchPhase,
    system: RuleSystem,
    last_activity: Instant,
}

impl GameInstance {
    /// Seat the players. Call `start` to begin.
    pub fn new(
        id: MatchId,
        catalog: Arc<CardCatalog>,
        config: MatchConfig,
        players: Vec<PlayerSetup>,
    ) -> MatchResult<Self> {
        Ok(Self {
            id,
            phase: MatchPhase::Created,
            system: RuleSystem::new(catalog, config, players)?,
            last_activity: Instant::now(),
        })
    }

    /// Run startup rules and the first turn start.
    pub fn start(&mut self) -> MatchResult<()> {
        if self.phase != MatchPhase::Created {
            return Err(MatchError::AlreadyStarted);
        }
        self.last_activity = Instant::now();
        match self.system.start() {
            Ok(()) => {
                self.phase = MatchPhase::Started;
                info!(match_id = %self.id, players = self.state().seats.player_count(), "match started");
                self.sync_phase();
                Ok(())
            }
            Err(err) => {
                error!(match_id = %self.id, error = %err, "match failed to start");
                self.phase = MatchPhase::Aborted;
                Err(err)
            }
        }
    }

    /// Process one command from `player` to completion.
    pub fn submit(&mut self, player: PlayerId, request: &CommandRequest) -> CommandResponse {
        self.last_activity = Instant::now();
        match commands::run(&mut self.system, self.phase, player, &request.command) {
            Ok(()) => {
                self.sync_phase();
                CommandResponse::accepted(request.id)
            }
            Err(CommandError::Match(err)) if err.is_fatal() => {
                error!(match_id = %self.id, error = %err, "match aborted");
                self.phase = MatchPhase::Aborted;
                CommandResponse::rejected(request.id, vec![err.to_string()])
            }
            Err(err) => {
                self.sync_phase();
                CommandResponse::rejected(request.id, err.messages())
            }
        }
    }

    /// Open `player`'s event channel.
    pub fn connect(&mut self, player: PlayerId) -> MatchResult<Receiver<EventView>> {
        self.system.connect(player)
    }

    fn sync_phase(&mut self) {
        if self.phase == MatchPhase::Started && self.system.state().is_over() {
            info!(match_id = %self.id, winner = ?self.system.state().outcome(), "match finished");
            self.phase = MatchPhase::GameOver;
        }
    }

    #[must_use]
    pub fn id(&self) -> MatchId {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Whether the match accepts no more commands.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, MatchPhase::GameOver | MatchPhase::Aborted)
    }

    #[must_use]
    pub fn system(&self) -> &RuleSystem {
        &self.system
    }

    #[must_use]
    pub fn state(&self) -> &MatchState {
        self.system.state()
    }

    #[must_use]
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Time since the last start or submission, as of `now`.
    #[must_use]
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }
}
