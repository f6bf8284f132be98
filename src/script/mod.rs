//! Sandboxed rule scripts.
//!
//! Rule and validator bodies are written in a small closed instruction
//! set (see `ast`) encoded as RON. A script sees exactly three things:
//! the triggering event, the entity the rule is attached to, and a
//! `RulesApi` facade. There is no other way out of the sandbox.
//!
//! ## Limits
//!
//! Each run has a fuel budget (evaluation steps) and a wall-clock
//! deadline. Either one running out aborts that run with a `ScriptError`.

pub mod api;
pub mod ast;
pub mod context;
pub mod error;
mod interp;

pub use api::{BuffOnly, ReadOnly, RulesApi, RulesView};
pub use ast::{Expr, PlayerRef, Program, Selector, Side, Stmt, Target};
pub use context::{ScriptContext, ScriptLimits};
pub use error::{ScriptError, ScriptResult};
pub(crate) use interp::require_in_play;
