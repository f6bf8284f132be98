//! Card catalog: the read-only prototypes matches spawn entities from.
//!
//! ## Key Types
//!
//! - `CatalogDef` / `CardDef` / `RuleDef` / `ValidatorDef`: authored data
//! - `CardCatalog`: validated, compiled lookup by id and name
//! - `CardPrototype`: one compiled card

pub mod catalog;
pub mod definition;
pub mod error;

pub use catalog::{CardCatalog, CardPrototype};
pub use definition::{CardDef, CardId, CatalogDef, RuleDef, ValidatorDef};
pub use error::{CatalogError, CatalogResult};
