//! The command pipeline: parse, validate, execute.
//!
//! A client submits a `CommandPayload` carrying entity ids as plain
//! integers. Processing is a three-phase state machine:
//!
//! - **parse** resolves every id to a live entity and builds the
//!   command object. It never mutates state; an unresolvable id is a
//!   fatal `ParseError`.
//! - **validate** runs the base checks (known player, match running,
//!   issuer holds the turn) and then the command's own checks. Errors
//!   are accumulated so the client sees every reason at once.
//! - **execute** runs only when validation found nothing. It consumes
//!   the command, mutates state and queues events; the rule system then
//!   drains the queue.
//!
//! Commands are never retried.

mod attack;
mod chat;
mod concede;
mod end_turn;
pub mod error;
mod play_card;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use attack::AttackCommand;
pub use chat::ChatCommand;
pub use concede::ConcedeCommand;
pub use end_turn::EndTurnCommand;
pub use error::{CommandError, ParseError, ValidationError, ValidationErrors};
pub use play_card::PlayCardCommand;

use crate::core::{EntityId, PlayerId};
use crate::engine::{MatchPhase, MatchResult, RuleSystem};
use crate::script::RulesView;

/// Client intent as it arrives on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CommandPayload {
    PlayCard {
        card: u32,
        #[serde(default)]
        target: Option<u32>,
    },
    Attack {
        attacker: u32,
        target: u32,
    },
    EndTurn,
    Chat {
        message: String,
    },
    Concede,
}

impl CommandPayload {
    /// Resolve ids and build the command object.
    pub fn parse(&self, system: &RuleSystem) -> Result<Box<dyn GameCommand>, ParseError> {
        let command: Box<dyn GameCommand> = match self {
            Self::PlayCard { card, target } => Box::new(PlayCardCommand {
                card: resolve(system, *card)?,
                target: target.map(|t| resolve(system, t)).transpose()?,
            }),
            Self::Attack { attacker, target } => Box::new(AttackCommand {
                attacker: resolve(system, *attacker)?,
                target: resolve(system, *target)?,
            }),
            Self::EndTurn => Box::new(EndTurnCommand),
            Self::Chat { message } => Box::new(ChatCommand {
                message: message.clone(),
            }),
            Self::Concede => Box::new(ConcedeCommand),
        };
        Ok(command)
    }
}

fn resolve(system: &RuleSystem, raw: u32) -> Result<EntityId, ParseError> {
    let id = EntityId::new(raw);
    if system.state().entities().is_active(id) {
        Ok(id)
    } else {
        Err(ParseError::UnknownEntity(raw))
    }
}

/// A command submission with an optional correlation id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub id: Option<u64>,
    pub command: CommandPayload,
}

impl CommandRequest {
    #[must_use]
    pub fn new(command: CommandPayload) -> Self {
        Self { id: None, command }
    }

    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }
}

/// The answer to one submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl CommandResponse {
    #[must_use]
    pub fn accepted(id: Option<u64>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            id,
        }
    }

    #[must_use]
    pub fn rejected(id: Option<u64>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
            id,
        }
    }
}

/// What validation may look at.
pub struct CommandContext<'a> {
    pub system: &'a RuleSystem,
    pub phase: MatchPhase,
    pub player: PlayerId,
}

/// A parsed command bound to one match and one player.
pub trait GameCommand: std::fmt::Debug {
    /// Command name for logs.
    fn name(&self) -> &'static str;

    /// Whether only the current turn holder may issue it.
    fn requires_turn(&self) -> bool {
        true
    }

    /// Command-specific checks. Must not mutate anything.
    fn validate(&self, ctx: &CommandContext<'_>, errors: &mut ValidationErrors);

    /// Apply the command and queue its events.
    fn execute(self: Box<Self>, system: &mut RuleSystem, player: PlayerId) -> MatchResult<()>;
}

/// Checks every command shares.
pub fn validate_base(ctx: &CommandContext<'_>, requires_turn: bool, errors: &mut ValidationErrors) {
    let state = ctx.system.state();
    if state.seat(ctx.player).is_none() {
        errors.push(ValidationError::UnknownPlayer);
    }
    match ctx.phase {
        MatchPhase::Created => errors.push(ValidationError::NotStarted),
        MatchPhase::GameOver | MatchPhase::Aborted => errors.push(ValidationError::MatchOver),
        MatchPhase::Started if state.is_over() => errors.push(ValidationError::MatchOver),
        MatchPhase::Started => {}
    }
    if requires_turn && state.current_player() != ctx.player {
        errors.push(ValidationError::NotYourTurn);
    }
}

/// Run one command through the whole pipeline, including the drain.
pub fn run(
    system: &mut RuleSystem,
    phase: MatchPhase,
    player: PlayerId,
    payload: &CommandPayload,
) -> Result<(), CommandError> {
    let command = payload.parse(system)?;

    let mut errors = ValidationErrors::new();
    {
        let ctx = CommandContext {
            system: &*system,
            phase,
            player,
        };
        validate_base(&ctx, command.requires_turn(), &mut errors);
        command.validate(&ctx, &mut errors);
    }
    if !errors.is_empty() {
        debug!(command = command.name(), %player, %errors, "command rejected");
        return Err(CommandError::Invalid(errors));
    }

    let name = command.name();
    command.execute(system, player)?;
    let dispatched = system.drain()?;
    debug!(command = name, %player, dispatched, "command executed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_wire_format() {
        let payload: CommandPayload =
            serde_json::from_str(r#"{"kind": "PlayCard", "card": 12}"#).unwrap();
        assert_eq!(payload, CommandPayload::PlayCard { card: 12, target: None });

        let request: CommandRequest =
            serde_json::from_str(r#"{"id": 4, "command": {"kind": "EndTurn"}}"#).unwrap();
        assert_eq!(request.id, Some(4));
        assert_eq!(request.command, CommandPayload::EndTurn);
    }

    #[test]
    fn test_response_omits_empty_fields() {
        let json = serde_json::to_string(&CommandResponse::accepted(None)).unwrap();
        assert_eq!(json, r#"{"success":true}"#);

        let json = serde_json::to_value(CommandResponse::rejected(Some(9), vec!["no".into()])).unwrap();
        assert_eq!(json["errors"][0], "no");
        assert_eq!(json["id"], 9);
    }
}
