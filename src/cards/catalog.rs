//! The read-only card catalog.
//!
//! Loaded once before any match starts and shared between matches behind
//! an `Arc`. Loading validates every cross reference and compiles every
//! script, so a match never meets a dangling rule id or a broken script
//! that came from the catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::{CardId, CatalogDef};
use super::error::{CatalogError, CatalogResult};
use crate::core::{EntityId, PlayerId};
use crate::entities::GameEntity;
use crate::rules::EntityRule;
use crate::script::Program;

/// A compiled card definition.
#[derive(Clone, Debug)]
pub struct CardPrototype {
    pub id: CardId,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub stats: BTreeMap<String, i64>,
    /// Rules copied onto every entity created from this card.
    pub rules: Vec<EntityRule>,
    /// Validator id and program, if plays of this card are scripted-checked.
    pub validator: Option<(String, Arc<Program>)>,
}

impl CardPrototype {
    /// Create an entity from this prototype. It starts in no zone.
    #[must_use]
    pub fn instantiate(&self, id: EntityId, owner: Option<PlayerId>) -> GameEntity {
        let mut entity = GameEntity::new(id, self.name.clone(), owner).with_card(self.id);
        for tag in &self.tags {
            entity.add_tag(tag.clone());
        }
        for (stat, value) in &self.stats {
            entity.set_base(stat.clone(), *value);
        }
        entity.reset_derived();
        for rule in &self.rules {
            entity.add_rule(rule.clone());
        }
        entity
    }
}

/// Every card, rule and validator known to the server.
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    rules: FxHashMap<String, EntityRule>,
    validators: FxHashMap<String, Arc<Program>>,
    cards: Vec<CardPrototype>,
    by_name: FxHashMap<String, CardId>,
}

impl CardCatalog {
    /// Parse and validate a RON catalog document.
    pub fn from_ron(text: &str) -> CatalogResult<Self> {
        let def: CatalogDef = ron::from_str(text)?;
        Self::from_def(def)
    }

    /// Validate and compile a catalog definition.
    pub fn from_def(def: CatalogDef) -> CatalogResult<Self> {
        let mut catalog = Self::default();

        for rule in def.rules {
            if catalog.rules.contains_key(&rule.id) {
                return Err(CatalogError::DuplicateRule(rule.id));
            }
            let compiled = EntityRule::compile(
                rule.id.clone(),
                rule.description,
                rule.trigger.as_deref(),
                &rule.script,
                rule.permanent,
            )
            .map_err(|source| CatalogError::Script {
                id: rule.id.clone(),
                source,
            })?;
            catalog.rules.insert(rule.id, compiled);
        }

        for validator in def.validators {
            if catalog.validators.contains_key(&validator.id) {
                return Err(CatalogError::DuplicateValidator(validator.id));
            }
            let program = Program::compile(&validator.script).map_err(|source| {
                CatalogError::Script {
                    id: validator.id.clone(),
                    source,
                }
            })?;
            catalog.validators.insert(validator.id, Arc::new(program));
        }

        for card in def.cards {
            if catalog.by_name.contains_key(&card.name) {
                return Err(CatalogError::DuplicateCard(card.name));
            }
            if let Some((stat, &value)) = card.stats.iter().find(|(_, v)| **v < 0) {
                return Err(CatalogError::NegativeStat {
                    card: card.name,
                    stat: stat.clone(),
                    value,
                });
            }
            let mut rules = Vec::with_capacity(card.rules.len());
            for rule_id in &card.rules {
                let rule = catalog.rules.get(rule_id).ok_or_else(|| CatalogError::UnknownRule {
                    card: card.name.clone(),
                    rule: rule_id.clone(),
                })?;
                rules.push(rule.clone());
            }
            let validator = match card.validator {
                Some(id) => {
                    let program = catalog.validators.get(&id).ok_or_else(|| {
                        CatalogError::UnknownValidator {
                            card: card.name.clone(),
                            validator: id.clone(),
                        }
                    })?;
                    Some((id, Arc::clone(program)))
                }
                None => None,
            };

            let id = CardId::new(catalog.cards.len() as u32);
            catalog.by_name.insert(card.name.clone(), id);
            catalog.cards.push(CardPrototype {
                id,
                name: card.name,
                description: card.description,
                tags: card.tags,
                stats: card.stats,
                rules,
                validator,
            });
        }

        tracing::debug!(
            cards = catalog.cards.len(),
            rules = catalog.rules.len(),
            validators = catalog.validators.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Look up a card by id.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&CardPrototype> {
        self.cards.get(id.raw() as usize)
    }

    /// Look up a card by name.
    #[must_use]
    pub fn card_by_name(&self, name: &str) -> Option<&CardPrototype> {
        self.by_name.get(name).and_then(|id| self.card(*id))
    }

    /// Look up a rule by id.
    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&EntityRule> {
        self.rules.get(id)
    }
}
