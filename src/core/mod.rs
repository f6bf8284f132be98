//! Core building blocks: entity and player ids, RNG, configuration.
//!
//! These types carry no rule semantics of their own; the engine, the
//! script interpreter and the command pipeline are all built on them.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod error;

pub use entity::EntityId;
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use config::{MatchConfig, RegistryConfig};
pub use error::ConfigError;
