//! The match engine.
//!
//! ## Key Types
//!
//! - `MatchState`: entities, seats, queue, history; the `RulesApi` rules see
//! - `RuleSystem`: dispatch loop and stat recalculation
//! - `GameInstance`: lifecycle phase and the command entry point

pub mod error;
pub mod instance;
pub mod recalc;
pub mod state;
pub mod system;

pub use error::{MatchError, MatchResult};
pub use instance::{GameInstance, MatchId, MatchPhase};
pub use state::{MatchState, PlayerSeat, PlayerSetup};
pub use system::RuleSystem;
