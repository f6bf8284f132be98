//! Entity identification.
//!
//! Every addressable game object (player avatar, card in hand, minion in
//! play, the global rules holder) has a unique `EntityId`, scoped to the
//! match that created it.
//!
//! ## Allocation
//!
//! IDs are handed out monotonically by the match's entity store, starting
//! at zero. An ID is never reused while its match is alive, so a stale id
//! held by a client can be detected rather than silently aliasing a newer
//! entity.
//!
//! ```
//! use ccg_rules::core::EntityId;
//!
//! let id = EntityId::new(7);
//! assert_eq!(id.raw(), 7);
//! assert_eq!(format!("{}", id), "Entity(7)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for any game entity within one match.
///
/// The wire format carries entity ids as plain integers; commands resolve
/// them back to live entities during parsing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The id allocated after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
