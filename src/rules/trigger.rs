//! Rule triggers.
//!
//! A trigger names the event type that activates a rule. Matching is
//! exact string equality against the event kind's name. Two triggers are
//! special:
//!
//! - **Startup**: an empty or absent trigger. Fires only for the null
//!   pseudo-event evaluated once when a match starts.
//! - **Buff recalculation**: fires only during the stat-recalculation
//!   pass, never for a queued event.
//!
//! ```
//! use ccg_rules::rules::Trigger;
//!
//! assert_eq!(Trigger::parse(None), Trigger::Startup);
//! assert_eq!(Trigger::parse(Some("")), Trigger::Startup);
//! assert_eq!(Trigger::parse(Some("BuffRecalculation")), Trigger::BuffRecalc);
//! assert_eq!(Trigger::parse(Some("DamageDealt")), Trigger::Event("DamageDealt".into()));
//! ```

use serde::{Deserialize, Serialize};

use crate::events::GameEvent;

/// Trigger name reserved for the recalculation pass.
pub const BUFF_RECALC_TRIGGER: &str = "BuffRecalculation";

/// What activates a rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// The startup pseudo-event.
    Startup,
    /// The stat-recalculation pass.
    BuffRecalc,
    /// A dispatched event whose kind name equals this string.
    Event(String),
}

impl Trigger {
    /// Interpret a trigger string from a rule definition.
    #[must_use]
    pub fn parse(trigger: Option<&str>) -> Self {
        match trigger {
            None | Some("") => Self::Startup,
            Some(BUFF_RECALC_TRIGGER) => Self::BuffRecalc,
            Some(name) => Self::Event(name.to_string()),
        }
    }

    /// Check whether this trigger fires for `event` (`None` = startup).
    #[must_use]
    pub fn matches(&self, event: Option<&GameEvent>) -> bool {
        match (self, event) {
            (Self::Startup, None) => true,
            (Self::Event(name), Some(event)) => event.name() == name,
            _ => false,
        }
    }

    /// The trigger as written in definitions.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Startup => "",
            Self::BuffRecalc => BUFF_RECALC_TRIGGER,
            Self::Event(name) => name,
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Startup => write!(f, "<startup>"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityId, PlayerId};
    use crate::events::EventKind;

    #[test]
    fn test_startup_matches_only_null_event() {
        let event = GameEvent::new(EventKind::GameStarted);
        assert!(Trigger::Startup.matches(None));
        assert!(!Trigger::Startup.matches(Some(&event)));
    }

    #[test]
    fn test_event_trigger_exact_name() {
        let event = GameEvent::new(EventKind::DamageDealt { target: EntityId(1), amount: 2 });
        assert!(Trigger::parse(Some("DamageDealt")).matches(Some(&event)));
        assert!(!Trigger::parse(Some("damagedealt")).matches(Some(&event)));
        assert!(!Trigger::parse(Some(" DamageDealt ")).matches(Some(&event)));
        assert!(!Trigger::parse(Some("DamageDealt")).matches(None));
    }

    #[test]
    fn test_buff_recalc_never_matches_events() {
        let event = GameEvent::new(EventKind::TurnStarted { player: PlayerId::new(0), turn: 1 });
        assert!(!Trigger::BuffRecalc.matches(Some(&event)));
        assert!(!Trigger::BuffRecalc.matches(None));
    }
}
