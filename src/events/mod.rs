//! Events and the per-player views they are broadcast as.

pub mod event;
pub mod view;

pub use event::{EventKind, GameEvent};
pub use view::{EntityView, EventView};
