//! Rules: trigger + script pairs attached to entities.
//!
//! When an event is dispatched, every in-play entity's rules are tested
//! against it in entity order, then attachment order. Matching rules run
//! their script with the event and the host entity bound.

pub mod rule;
pub mod trigger;

pub use rule::{EntityRule, RuleId};
pub use trigger::{Trigger, BUFF_RECALC_TRIGGER};
