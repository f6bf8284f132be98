//! Shared fixtures: a small catalog and helpers for driving matches.

#![allow(dead_code)]

use std::sync::Arc;

use ccg_rules::cards::{CardCatalog, CardDef, CatalogDef, RuleDef, ValidatorDef};
use ccg_rules::commands::{CommandPayload, CommandRequest, CommandResponse};
use ccg_rules::core::{EntityId, MatchConfig, PlayerId};
use ccg_rules::engine::{GameInstance, MatchId, PlayerSetup};
use ccg_rules::entities::{stats, tags};
use ccg_rules::events::GameEvent;
use ccg_rules::script::RulesView;

pub const P0: PlayerId = PlayerId(0);
pub const P1: PlayerId = PlayerId(1);

/// Heroes draw three at startup; a handful of minions and spells.
pub fn base_catalog() -> CatalogDef {
    CatalogDef::new()
        .with_rule(RuleDef::new(
            "opening_hand",
            None,
            "[Draw(player: Owner, count: Int(3))]",
        ))
        .with_rule(RuleDef::new(
            "bolt",
            Some("CardPlayed"),
            "[If(cond: Same(Subject, This), then: [DealDamage(target: EventTarget, amount: Int(3))])]",
        ))
        .with_rule(RuleDef::new(
            "doom",
            Some("CardPlayed"),
            "[If(cond: Same(Subject, This), then: [DealDamage(target: Avatar(Opponent), amount: Int(30))])]",
        ))
        .with_rule(RuleDef::new(
            "silence",
            Some("CardPlayed"),
            "[If(cond: Same(Subject, This), then: [Disenchant(target: EventTarget)])]",
        ))
        .with_rule(RuleDef::new(
            "mend",
            Some("CardPlayed"),
            "[If(cond: Same(Subject, This), then: [Heal(target: EventTarget, amount: Int(5))])]",
        ))
        .with_rule(
            RuleDef::new(
                "rally",
                Some("BuffRecalculation"),
                r#"[ForEach(
                    selector: (tags: ["MINION", "IN_PLAY"], side: Friendly),
                    body: [If(cond: Not(Same(It, This)), then: [Buff(target: It, stat: "ATTACK", amount: Int(1))])],
                )]"#,
            )
            .with_description("Other friendly minions have +1 attack"),
        )
        .with_rule(RuleDef::new(
            "fortify",
            Some("BuffRecalculation"),
            r#"[ForEach(
                selector: (tags: ["MINION", "IN_PLAY"], side: Friendly),
                body: [If(cond: Not(Same(It, This)), then: [Buff(target: It, stat: "MAX_HEALTH", amount: Int(2))])],
            )]"#,
        ))
        .with_rule(
            RuleDef::new(
                "anchor",
                Some("BuffRecalculation"),
                r#"[Buff(target: This, stat: "ATTACK", amount: Int(1))]"#,
            )
            .permanent(),
        )
        .with_validator(ValidatorDef::new(
            "needs_target",
            r#"[If(cond: Not(Exists(EventTarget)), then: [Reject("this card needs a target")])]"#,
        ))
        .with_card(
            CardDef::new("Hero")
                .with_tag(tags::PLAYER)
                .with_stat(stats::MAX_HEALTH, 30)
                .with_stat(stats::MAX_ENERGY, 10)
                .with_rule("opening_hand"),
        )
        .with_card(minion("Footman", 1, 2, 1))
        .with_card(minion("Raider", 2, 1, 3).with_tag(tags::CHARGE))
        .with_card(minion("Guard", 2, 3, 0).with_tag(tags::TAUNT))
        .with_card(minion("Giant", 20, 8, 8))
        .with_card(minion("Banner", 1, 2, 0).with_rule("rally").with_rule("anchor"))
        .with_card(minion("Totem", 1, 2, 0).with_rule("fortify"))
        .with_card(spell("Bolt", 1, "bolt").with_validator("needs_target"))
        .with_card(spell("Doom", 0, "doom"))
        .with_card(spell("Silence", 0, "silence").with_validator("needs_target"))
        .with_card(spell("Mend", 0, "mend").with_validator("needs_target"))
}

pub fn minion(name: &str, cost: i64, health: i64, attack: i64) -> CardDef {
    CardDef::new(name)
        .with_tag(tags::MINION)
        .with_stat(stats::COST, cost)
        .with_stat(stats::MAX_HEALTH, health)
        .with_stat(stats::ATTACK, attack)
}

pub fn spell(name: &str, cost: i64, rule: &str) -> CardDef {
    CardDef::new(name).with_stat(stats::COST, cost).with_rule(rule)
}

pub fn catalog(def: CatalogDef) -> Arc<CardCatalog> {
    Arc::new(CardCatalog::from_def(def).expect("test catalog is valid"))
}

pub fn players(decks: [&[&str]; 2]) -> Vec<PlayerSetup> {
    vec![
        PlayerSetup::new("alice", decks[0].iter().copied()),
        PlayerSetup::new("bob", decks[1].iter().copied()),
    ]
}

/// A started two-player match.
pub fn started(def: CatalogDef, config: MatchConfig, decks: [&[&str]; 2]) -> GameInstance {
    let mut game = GameInstance::new(MatchId(1), catalog(def), config, players(decks))
        .expect("match is created");
    game.start().expect("match starts");
    game
}

/// A started match with the base catalog and default config.
pub fn simple(decks: [&[&str]; 2]) -> GameInstance {
    started(base_catalog(), MatchConfig::default(), decks)
}

pub fn submit(game: &mut GameInstance, player: PlayerId, command: CommandPayload) -> CommandResponse {
    game.submit(player, &CommandRequest::new(command))
}

pub fn end_turn(game: &mut GameInstance, player: PlayerId) {
    let response = submit(game, player, CommandPayload::EndTurn);
    assert!(response.success, "end turn failed: {:?}", response.errors);
}

/// The first card named `name` in `player`'s hand.
pub fn in_hand(game: &GameInstance, player: PlayerId, name: &str) -> EntityId {
    let entities = game.state().entities();
    entities
        .hand(player)
        .into_iter()
        .find(|id| entities.get(*id).is_some_and(|e| e.name == name))
        .unwrap_or_else(|| panic!("{name} not in hand of {player}"))
}

pub fn play(game: &mut GameInstance, player: PlayerId, card: EntityId, target: Option<EntityId>) -> CommandResponse {
    submit(
        game,
        player,
        CommandPayload::PlayCard {
            card: card.raw(),
            target: target.map(EntityId::raw),
        },
    )
}

/// Play the named card from hand and assert it was accepted.
pub fn play_named(game: &mut GameInstance, player: PlayerId, name: &str, target: Option<EntityId>) -> EntityId {
    let card = in_hand(game, player, name);
    let response = play(game, player, card, target);
    assert!(response.success, "playing {name} failed: {:?}", response.errors);
    card
}

pub fn attack(game: &mut GameInstance, player: PlayerId, attacker: EntityId, target: EntityId) -> CommandResponse {
    submit(
        game,
        player,
        CommandPayload::Attack {
            attacker: attacker.raw(),
            target: target.raw(),
        },
    )
}

pub fn avatar(game: &GameInstance, player: PlayerId) -> EntityId {
    game.state().avatar(player).expect("player has an avatar")
}

/// History entries named `name`.
pub fn events_named<'a>(game: &'a GameInstance, name: &'a str) -> impl Iterator<Item = &'a GameEvent> + 'a {
    game.state().history().iter().filter(move |e| e.name() == name)
}

pub fn count_events(game: &GameInstance, name: &str) -> usize {
    events_named(game, name).count()
}

/// Replace the heroes' opening draw with `count` cards.
pub fn with_opening_hand(mut def: CatalogDef, count: u32) -> CatalogDef {
    if let Some(rule) = def.rules.iter_mut().find(|r| r.id == "opening_hand") {
        rule.script = format!("[Draw(player: Owner, count: Int({count}))]");
    }
    def
}
