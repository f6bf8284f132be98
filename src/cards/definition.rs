//! Card definitions as authored in the catalog.
//!
//! These are the plain-data forms read from RON. `CardCatalog` validates
//! them and compiles their scripts into `CardPrototype`s.
//!
//! ```
//! use ccg_rules::cards::{CardDef, CatalogDef, RuleDef};
//!
//! let catalog = CatalogDef::new()
//!     .with_rule(RuleDef::new("charge_up", Some("TurnStarted"), "[]"))
//!     .with_card(
//!         CardDef::new("Footman")
//!             .with_tag("MINION")
//!             .with_stat("MAX_HEALTH", 2)
//!             .with_stat("ATTACK", 1)
//!             .with_rule("charge_up"),
//!     );
//! assert_eq!(catalog.cards[0].stats["ATTACK"], 1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Index of a prototype in its catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// A rule definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// Event name; absent or empty for startup rules.
    #[serde(default)]
    pub trigger: Option<String>,
    /// Script text (RON instruction list).
    pub script: String,
    #[serde(default)]
    pub permanent: bool,
}

impl RuleDef {
    pub fn new(id: impl Into<String>, trigger: Option<&str>, script: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            trigger: trigger.map(str::to_string),
            script: script.into(),
            permanent: false,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }
}

/// A play-validator definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorDef {
    pub id: String,
    pub script: String,
}

impl ValidatorDef {
    pub fn new(id: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            script: script.into(),
        }
    }
}

/// A card definition. Rules and validator are referenced by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDef {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub stats: BTreeMap<String, i64>,
    pub rules: Vec<String>,
    pub validator: Option<String>,
}

impl CardDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn with_stat(mut self, stat: impl Into<String>, value: i64) -> Self {
        self.stats.insert(stat.into(), value);
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rules.push(rule.into());
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: impl Into<String>) -> Self {
        self.validator = Some(validator.into());
        self
    }
}

/// A whole catalog document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDef {
    pub rules: Vec<RuleDef>,
    pub validators: Vec<ValidatorDef>,
    pub cards: Vec<CardDef>,
}

impl CatalogDef {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rule(mut self, rule: RuleDef) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: ValidatorDef) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn with_card(mut self, card: CardDef) -> Self {
        self.cards.push(card);
        self
    }
}
