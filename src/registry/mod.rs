//! Live match registry and the periodic sweeper.
//!
//! Each match sits behind its own `Mutex`, so commands on one match are
//! serialized while different matches run concurrently. The registry map
//! itself is behind a `RwLock`.
//!
//! Lock order: a match lock is never taken while the registry lock is
//! held. `sweep` clones the match handles under a read lock, releases
//! it, inspects each match, then takes the write lock only to remove.

mod sweeper;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use crossbeam_channel::Receiver;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::info;

pub use sweeper::SweeperHandle;

use crate::cards::CardCatalog;
use crate::commands::{CommandRequest, CommandResponse};
use crate::core::{MatchConfig, PlayerId, RegistryConfig};
use crate::engine::{GameInstance, MatchError, MatchId, PlayerSetup};
use crate::events::EventView;

/// Registry failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no live match {0}")]
    UnknownMatch(MatchId),

    #[error("a lock was poisoned by a panicking thread")]
    Poisoned,

    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Shared handle to one match.
pub type MatchHandle = Arc<Mutex<GameInstance>>;

/// All live matches.
#[derive(Debug)]
pub struct MatchRegistry {
    catalog: Arc<CardCatalog>,
    config: RegistryConfig,
    matches: RwLock<FxHashMap<MatchId, MatchHandle>>,
    next_id: AtomicU64,
}

impl MatchRegistry {
    /// Create an empty registry sharing `catalog` across matches.
    #[must_use]
    pub fn new(catalog: Arc<CardCatalog>, config: RegistryConfig) -> Self {
        Self {
            catalog,
            config,
            matches: RwLock::new(FxHashMap::default()),
            next_id: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create and start a match. A match that fails to start is not kept.
    pub fn create(&self, config: MatchConfig, players: Vec<PlayerSetup>) -> RegistryResult<MatchId> {
        let id = MatchId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut instance = GameInstance::new(id, Arc::clone(&self.catalog), config, players)?;
        instance.start()?;
        self.matches
            .write()
            .map_err(|_| RegistryError::Poisoned)?
            .insert(id, Arc::new(Mutex::new(instance)));
        Ok(id)
    }

    /// Handle to a live match.
    pub fn get(&self, id: MatchId) -> RegistryResult<MatchHandle> {
        let matches = self.matches.read().map_err(|_| RegistryError::Poisoned)?;
        matches.get(&id).cloned().ok_or(RegistryError::UnknownMatch(id))
    }

    /// Submit a command to a match and wait for it to complete.
    pub fn submit(
        &self,
        id: MatchId,
        player: PlayerId,
        request: &CommandRequest,
    ) -> RegistryResult<CommandResponse> {
        let handle = self.get(id)?;
        let mut instance = handle.lock().map_err(|_| RegistryError::Poisoned)?;
        Ok(instance.submit(player, request))
    }

    /// Open a player's event channel on a match.
    pub fn connect(&self, id: MatchId, player: PlayerId) -> RegistryResult<Receiver<EventView>> {
        let handle = self.get(id)?;
        let mut instance = handle.lock().map_err(|_| RegistryError::Poisoned)?;
        Ok(instance.connect(player)?)
    }

    /// Number of live matches.
    pub fn len(&self) -> usize {
        self.matches.read().map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict finished matches and matches idle longer than the timeout.
    ///
    /// A match whose lock is busy is running a command and is skipped.
    pub fn sweep(&self, now: Instant) -> RegistryResult<Vec<MatchId>> {
        let handles: Vec<(MatchId, MatchHandle)> = {
            let matches = self.matches.read().map_err(|_| RegistryError::Poisoned)?;
            matches.iter().map(|(id, h)| (*id, Arc::clone(h))).collect()
        };

        let idle_timeout = self.config.idle_timeout();
        let mut evict = Vec::new();
        for (id, handle) in handles {
            let Ok(instance) = handle.try_lock() else {
                continue;
            };
            if instance.is_finished() || instance.idle_for(now) >= idle_timeout {
                evict.push(id);
            }
        }

        if !evict.is_empty() {
            let mut matches = self.matches.write().map_err(|_| RegistryError::Poisoned)?;
            for id in &evict {
                matches.remove(id);
            }
            info!(evicted = evict.len(), remaining = matches.len(), "swept matches");
        }
        evict.sort();
        Ok(evict)
    }
}
