//! Match and registry configuration.
//!
//! Configuration is plain data with builder methods, and can also be read
//! from RON so deployments can tune limits without recompiling:
//!
//! ```
//! use ccg_rules::core::MatchConfig;
//!
//! let config = MatchConfig::from_ron(r#"(seed: 7, hero_card: "Hero", max_events: 250)"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.max_events, 250);
//! assert_eq!(config.max_hand_size, 10); // default
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Per-match configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Seed for deck shuffling.
    pub seed: u64,

    /// Maximum events dispatched while draining the queue for one command.
    ///
    /// Exceeding it is fatal to the match: it means a rule re-triggers
    /// itself without bound.
    pub max_events: usize,

    /// Maximum interpreter steps per script run.
    pub script_fuel: u64,

    /// Wall-clock budget per script run, in milliseconds.
    pub script_timeout_ms: u64,

    /// Card prototype spawned as each player's avatar.
    pub hero_card: String,

    /// Optional unowned prototype carrying match-wide rules.
    pub global_card: Option<String>,

    /// Cards drawn beyond this are burned.
    pub max_hand_size: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_events: 1000,
            script_fuel: 10_000,
            script_timeout_ms: 50,
            hero_card: "Hero".to_string(),
            global_card: None,
            max_hand_size: 10,
        }
    }
}

impl MatchConfig {
    /// Create a configuration using `hero_card` for player avatars.
    pub fn new(hero_card: impl Into<String>) -> Self {
        Self {
            hero_card: hero_card.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from RON text; missing fields take defaults.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the per-command event ceiling.
    #[must_use]
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Set the per-script step budget.
    #[must_use]
    pub fn with_script_fuel(mut self, fuel: u64) -> Self {
        self.script_fuel = fuel;
        self
    }

    /// Set the per-script wall-clock budget.
    #[must_use]
    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Attach a global rules prototype.
    #[must_use]
    pub fn with_global_card(mut self, card: impl Into<String>) -> Self {
        self.global_card = Some(card.into());
        self
    }

    /// Set the hand size limit.
    #[must_use]
    pub fn with_max_hand_size(mut self, size: usize) -> Self {
        self.max_hand_size = size;
        self
    }

    /// Script wall-clock budget as a `Duration`.
    #[must_use]
    pub fn script_timeout(&self) -> Duration {
        Duration::from_millis(self.script_timeout_ms)
    }
}

/// Configuration for the match registry's eviction sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Matches with no command for this long are evicted, in seconds.
    pub idle_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 15 * 60,
        }
    }
}

impl RegistryConfig {
    /// Idle timeout as a `Duration`.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Set the idle timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout_secs = timeout.as_secs();
        self
    }
}
