//! The rule script instruction set.
//!
//! Scripts are RON documents holding a list of statements. The set of
//! statements is closed: a script can only do what a variant below
//! names, and every effect goes through the `RulesApi` capability trait.
//!
//! ```
//! use ccg_rules::script::Program;
//!
//! // Whenever the host's owner starts a turn, draw a card.
//! let program = Program::compile(r#"[
//!     If(
//!         cond: SamePlayer(EventPlayer, Owner),
//!         then: [Draw(player: Owner, count: Int(1))],
//!     ),
//! ]"#).unwrap();
//! assert_eq!(program.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use super::error::ScriptResult;

/// A compiled rule or validator body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    stmts: Vec<Stmt>,
}

impl Program {
    /// Decode RON script text.
    pub fn compile(text: &str) -> ScriptResult<Self> {
        let stmts: Vec<Stmt> = ron::from_str(text)?;
        Ok(Self { stmts })
    }

    /// Wrap already-built statements.
    #[must_use]
    pub fn from_stmts(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    /// Top-level statements.
    #[must_use]
    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    /// Number of top-level statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    /// Whether the program does nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

/// One instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    If {
        cond: Expr,
        then: Vec<Stmt>,
        #[serde(default)]
        otherwise: Vec<Stmt>,
    },
    /// Run `body` once per matching entity, bound as `It`.
    ForEach { selector: Selector, body: Vec<Stmt> },
    /// Run `body` once per player in seat order, bound as `Each`.
    ForEachPlayer { body: Vec<Stmt> },
    DealDamage { target: Target, amount: Expr },
    Heal { target: Target, amount: Expr },
    Draw { player: PlayerRef, count: Expr },
    /// Attach a catalog rule to `target`.
    AddRule { target: Target, rule: String },
    RemoveRule { target: Target, rule: String },
    /// Strip every non-permanent rule from `target`.
    Disenchant { target: Target },
    /// Create an entity from catalog card `card` directly in play.
    Spawn { card: String, player: PlayerRef },
    Destroy { target: Target },
    /// Adjust a derived stat. Only takes effect during recalculation.
    Buff {
        target: Target,
        stat: String,
        amount: Expr,
    },
    SetVar {
        target: Target,
        var: String,
        value: Expr,
    },
    AddVar {
        target: Target,
        var: String,
        amount: Expr,
    },
    /// Permanently adjust a base stat.
    AddBase {
        target: Target,
        stat: String,
        amount: Expr,
    },
    AddTag { target: Target, tag: String },
    RemoveTag { target: Target, tag: String },
    GameOver {
        #[serde(default)]
        winner: Option<PlayerRef>,
    },
    Trace(String),
    /// Veto the play being validated.
    Reject(String),
}

/// Integer expression. Booleans are 0 and 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Int(i64),
    /// Derived stat value.
    Stat(Target, String),
    Base(Target, String),
    Var(Target, String),
    HasTag(Target, String),
    /// The bound event's amount.
    Amount,
    Turn,
    HandSize(PlayerRef),
    Count(Selector),
    /// Whether two targets resolve to the same entity.
    Same(Target, Target),
    /// Whether two player refs resolve to the same player.
    SamePlayer(PlayerRef, PlayerRef),
    /// Whether a target resolves to a live entity.
    Exists(Target),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Ge(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

/// A reference to one entity, resolved at run time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// The entity the rule is attached to.
    This,
    /// The bound event's cause.
    Cause,
    /// The bound event's primary entity.
    Subject,
    /// The bound event's target.
    EventTarget,
    /// The innermost `ForEach` entity.
    It,
    /// A player's avatar.
    Avatar(PlayerRef),
}

/// A reference to one player, resolved at run time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRef {
    /// Owner of the rule's host entity.
    Owner,
    /// The seat after the host's owner.
    Opponent,
    /// The player whose turn it is.
    Current,
    /// The bound event's player.
    EventPlayer,
    /// The innermost `ForEachPlayer` player.
    Each,
    /// Owner of another entity.
    OwnerOf(Box<Target>),
}

/// Which side of the table, relative to the rule host's owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Any,
    Friendly,
    Enemy,
}

/// Filter over active entities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selector {
    /// Tags an entity must carry.
    pub tags: Vec<String>,
    /// Tags an entity must not carry.
    pub without: Vec<String>,
    pub side: Side,
}
