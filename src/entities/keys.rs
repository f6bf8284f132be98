//! Well-known tag, stat and variable names.
//!
//! The engine interprets only these keys; everything else is data that
//! card scripts read and write by name.

/// Boolean markers carried by entities.
pub mod tags {
    /// Card is in its owner's hand.
    pub const IN_HAND: &str = "IN_HAND";
    /// Entity is on the battlefield; only these entities' rules fire.
    pub const IN_PLAY: &str = "IN_PLAY";
    /// Player avatar.
    pub const PLAYER: &str = "PLAYER";
    /// Stays in play after being played and can attack.
    pub const MINION: &str = "MINION";
    /// Attackers must target a taunt minion while one is present.
    pub const TAUNT: &str = "TAUNT";
    /// May attack on the turn it is summoned.
    pub const CHARGE: &str = "CHARGE";
}

/// Base stats, reset into derived values on every recalculation.
pub mod stats {
    pub const MAX_HEALTH: &str = "MAX_HEALTH";
    pub const ATTACK: &str = "ATTACK";
    pub const COST: &str = "COST";
    pub const MAX_ENERGY: &str = "MAX_ENERGY";
}

/// Runtime variables that persist across recalculation.
pub mod vars {
    pub const CURRENT_HEALTH: &str = "CURRENT_HEALTH";
    pub const ATTACKS_REMAINING: &str = "ATTACKS_REMAINING";
    pub const ENERGY_SPENT: &str = "ENERGY_SPENT";
    pub const FATIGUE: &str = "FATIGUE";
}

/// Prefix pairing a runtime variable with the stat that caps it:
/// `CURRENT_X` is capped by `MAX_X`.
pub(crate) const CURRENT_PREFIX: &str = "CURRENT_";
pub(crate) const MAX_PREFIX: &str = "MAX_";
