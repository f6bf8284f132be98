//! Per-match script execution context.
//!
//! One context lives as long as its match. Before each evaluation the
//! bindings (`event`, host `entity`) are overwritten and the loop
//! bindings, step counter, clock and rejections are cleared, so nothing
//! leaks from one rule run into the next.

use std::time::{Duration, Instant};

use super::api::RulesApi;
use super::ast::Program;
use super::error::ScriptResult;
use crate::core::{EntityId, MatchConfig, PlayerId};
use crate::events::GameEvent;

/// How much work one script run may do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptLimits {
    /// Maximum evaluation steps.
    pub fuel: u64,
    /// Wall-clock budget, checked every `CLOCK_INTERVAL` steps.
    pub timeout: Duration,
}

impl ScriptLimits {
    /// Steps between wall-clock checks.
    pub const CLOCK_INTERVAL: u64 = 64;

    #[must_use]
    pub fn new(fuel: u64, timeout: Duration) -> Self {
        Self { fuel, timeout }
    }

    /// Limits taken from a match configuration.
    #[must_use]
    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(config.script_fuel, config.script_timeout())
    }
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self::from_config(&MatchConfig::default())
    }
}

/// Reusable interpreter state.
#[derive(Debug)]
pub struct ScriptContext {
    pub(super) limits: ScriptLimits,
    pub(super) event: Option<GameEvent>,
    pub(super) entity: Option<EntityId>,
    pub(super) it: Vec<EntityId>,
    pub(super) each: Vec<PlayerId>,
    pub(super) steps: u64,
    pub(super) started: Instant,
    pub(super) rejections: Vec<String>,
}

impl ScriptContext {
    /// Create a context with the given limits.
    #[must_use]
    pub fn new(limits: ScriptLimits) -> Self {
        Self {
            limits,
            event: None,
            entity: None,
            it: Vec::new(),
            each: Vec::new(),
            steps: 0,
            started: Instant::now(),
            rejections: Vec::new(),
        }
    }

    /// The configured limits.
    #[must_use]
    pub fn limits(&self) -> ScriptLimits {
        self.limits
    }

    /// Overwrite the bindings for the next run.
    ///
    /// `event` is `None` for the startup pseudo-event and for stat
    /// recalculation.
    pub fn bind(&mut self, event: Option<&GameEvent>, entity: Option<EntityId>) {
        self.event = event.cloned();
        self.entity = entity;
        self.it.clear();
        self.each.clear();
        self.rejections.clear();
    }

    /// Execute `program` against `api` with the current bindings.
    ///
    /// `rule` names the running rule in trace output.
    pub fn run(&mut self, program: &Program, api: &mut dyn RulesApi, rule: &str) -> ScriptResult<()> {
        self.steps = 0;
        self.started = Instant::now();
        self.exec_block(program.stmts(), api, rule)
    }

    /// Steps consumed by the last run.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Messages from `Reject` statements since the last `bind`.
    #[must_use]
    pub fn rejections(&self) -> &[String] {
        &self.rejections
    }

    /// Take the rejection messages, leaving none behind.
    pub fn take_rejections(&mut self) -> Vec<String> {
        std::mem::take(&mut self.rejections)
    }
}
