//! # ccg-rules
//!
//! Rule and event-processing engine for turn-based card battle matches.
//!
//! ## Design Principles
//!
//! 1. **Event-Sourced**: Commands only queue events. Everything else
//!    (rule effects, deaths, turn changes) happens while the queue is
//!    drained, one event at a time, in FIFO order.
//!
//! 2. **Deterministic**: Rules fire in entity insertion order, then
//!    rule attachment order. Deck shuffles use a seeded ChaCha8 stream.
//!
//! 3. **Sandboxed Scripts**: Rule bodies are a closed RON instruction set
//!    evaluated against a fixed capability trait, with fuel and a
//!    wall-clock deadline.
//!
//! 4. **Data-Driven Entities**: One concrete entity type. Minions, spells
//!    and avatars differ only in tags, stats and rules.
//!
//! ## Modules
//!
//! - `core`: Entity and player ids, RNG, configuration
//! - `entities`: `GameEntity` and the entity store
//! - `rules`: Trigger + script pairs
//! - `script`: Instruction set, interpreter, capability traits
//! - `events`: Event kinds and per-player views
//! - `cards`: The read-only card catalog
//! - `engine`: Match state, dispatch loop, recalculation, lifecycle
//! - `commands`: Parse / validate / execute pipeline
//! - `registry`: Live matches and the idle sweeper

pub mod core;
pub mod entities;
pub mod rules;
pub mod script;
pub mod events;
pub mod cards;
pub mod engine;
pub mod commands;
pub mod registry;

// Re-export commonly used types
pub use crate::core::{
    EntityId, PlayerId, PlayerMap,
    GameRng, GameRngState,
    MatchConfig, RegistryConfig, ConfigError,
};

pub use crate::entities::{EntitySnapshot, EntityStore, GameEntity};

pub use crate::rules::{EntityRule, RuleId, Trigger};

pub use crate::script::{Program, RulesApi, RulesView, ScriptContext, ScriptError, ScriptLimits};

pub use crate::events::{EntityView, EventKind, EventView, GameEvent};

pub use crate::cards::{CardCatalog, CardDef, CardId, CardPrototype, CatalogDef, CatalogError, RuleDef, ValidatorDef};

pub use crate::engine::{
    GameInstance, MatchError, MatchId, MatchPhase,
    MatchState, PlayerSetup, RuleSystem,
};

pub use crate::commands::{
    CommandPayload, CommandRequest, CommandResponse,
    GameCommand, ParseError, ValidationError, ValidationErrors,
};

pub use crate::registry::{MatchRegistry, RegistryError, SweeperHandle};
