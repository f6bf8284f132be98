//! Entity rules: an immutable trigger + script pair.
//!
//! The script text is compiled once when the rule is built; attaching the
//! rule to many entities shares the compiled program.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::trigger::Trigger;
use crate::script::{Program, ScriptResult};

/// Stable rule identifier, as named in the card catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub String);

impl RuleId {
    /// Create a rule id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A trigger and the script it runs.
///
/// ```
/// use ccg_rules::rules::{EntityRule, Trigger};
///
/// let rule = EntityRule::compile(
///     "draw_on_turn",
///     "Draw a card at the start of your turn",
///     Some("TurnStarted"),
///     r#"[Draw(player: Owner, count: Int(1))]"#,
///     false,
/// ).unwrap();
///
/// assert_eq!(rule.trigger, Trigger::Event("TurnStarted".into()));
/// assert!(!rule.permanent);
/// ```
#[derive(Clone, Debug)]
pub struct EntityRule {
    /// Stable id.
    pub id: RuleId,

    /// Human-readable description.
    pub description: String,

    /// What activates the rule.
    pub trigger: Trigger,

    /// Script text as authored.
    pub source: Arc<str>,

    /// Compiled script.
    pub program: Arc<Program>,

    /// Permanent rules survive a disenchant.
    pub permanent: bool,
}

impl EntityRule {
    /// Compile a rule from its definition.
    pub fn compile(
        id: impl Into<String>,
        description: impl Into<String>,
        trigger: Option<&str>,
        script: &str,
        permanent: bool,
    ) -> ScriptResult<Self> {
        let program = Program::compile(script)?;
        Ok(Self {
            id: RuleId::new(id),
            description: description.into(),
            trigger: Trigger::parse(trigger),
            source: Arc::from(script),
            program: Arc::new(program),
            permanent,
        })
    }
}
