//! Catalog loading errors.

use thiserror::Error;

use crate::script::ScriptError;

/// Why a catalog was refused.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid RON: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("rule `{0}` is defined twice")]
    DuplicateRule(String),

    #[error("validator `{0}` is defined twice")]
    DuplicateValidator(String),

    #[error("card `{0}` is defined twice")]
    DuplicateCard(String),

    #[error("card `{card}` references unknown rule `{rule}`")]
    UnknownRule { card: String, rule: String },

    #[error("card `{card}` references unknown validator `{validator}`")]
    UnknownValidator { card: String, validator: String },

    #[error("card `{card}` has negative {stat} ({value})")]
    NegativeStat {
        card: String,
        stat: String,
        value: i64,
    },

    #[error("script `{id}` does not compile")]
    Script {
        id: String,
        #[source]
        source: ScriptError,
    },
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
