//! Entity model: the concrete `GameEntity` and its indexed store.
//!
//! ## Key Types
//!
//! - `GameEntity`: tags, base stats, derived values, variables, rules
//! - `EntityStore`: arena with insertion order and deferred removal
//! - `keys`: the tag/stat/variable names the engine itself interprets

pub mod entity;
pub mod keys;
pub mod store;

pub use entity::{EntitySnapshot, GameEntity};
pub use keys::{stats, tags, vars};
pub use store::EntityStore;
