//! Turn order, startup draws and fatigue.

mod common;

use ccg_rules::cards::{CardDef, RuleDef};
use ccg_rules::core::{MatchConfig, PlayerId};
use ccg_rules::engine::{GameInstance, MatchId, PlayerSetup};
use ccg_rules::entities::vars;
use ccg_rules::events::EventKind;
use ccg_rules::script::RulesView;
use proptest::prelude::*;

use common::*;

/// A global rule that draws a card for whoever starts a turn.
fn dealer_catalog() -> ccg_rules::cards::CatalogDef {
    base_catalog()
        .with_rule(RuleDef::new(
            "deal",
            Some("TurnStarted"),
            "[Draw(player: EventPlayer, count: Int(1))]",
        ))
        .with_card(CardDef::new("Dealer").with_rule("deal"))
}

proptest! {
    #[test]
    fn prop_turns_rotate_through_seats(count in 2usize..=4, turns in 0u32..20) {
        let setups = (0..count)
            .map(|i| PlayerSetup::new(format!("p{i}"), ["Footman"; 5]))
            .collect();
        let mut game = GameInstance::new(MatchId(1), catalog(base_catalog()), MatchConfig::default(), setups)
            .unwrap();
        game.start().unwrap();

        for _ in 0..turns {
            let current = game.system().current_player();
            end_turn(&mut game, current);
        }

        prop_assert_eq!(game.state().turn(), turns);
        prop_assert_eq!(game.system().current_player(), PlayerId::for_turn(turns, count));
        let starts: Vec<PlayerId> = game
            .state()
            .history()
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::TurnStarted { player, .. } => Some(player),
                _ => None,
            })
            .collect();
        prop_assert_eq!(starts.len(), turns as usize + 1);
        for (turn, player) in starts.into_iter().enumerate() {
            prop_assert_eq!(player, PlayerId::for_turn(turn as u32, count));
        }
    }
}

#[test]
fn test_opening_hands() {
    let game = simple([&["Footman"; 10], &["Raider"; 10]]);
    let state = game.state();

    assert_eq!(state.hand_size(P0), 3);
    assert_eq!(state.hand_size(P1), 3);
    assert_eq!(state.seat(P0).unwrap().deck.len(), 7);
    assert_eq!(state.current_player(), P0);
    assert_eq!(state.turn(), 0);
}

#[test]
fn test_turn_start_draw() {
    let mut game = started(
        dealer_catalog(),
        MatchConfig::default().with_global_card("Dealer"),
        [&["Footman"; 10], &["Footman"; 10]],
    );
    assert_eq!(game.state().hand_size(P0), 4);
    assert_eq!(game.state().hand_size(P1), 3);

    end_turn(&mut game, P0);
    assert_eq!(game.state().hand_size(P1), 4);

    let turn_events: Vec<&str> = game
        .state()
        .history()
        .iter()
        .rev()
        .take(3)
        .map(|e| e.name())
        .collect();
    assert_eq!(turn_events, vec!["CardDrawn", "TurnStarted", "TurnEnded"]);
}

#[test]
fn test_fatigue_escalates_each_draw() {
    let mut game = started(
        dealer_catalog(),
        MatchConfig::default().with_global_card("Dealer"),
        [&["Footman"; 3], &["Footman"; 3]],
    );
    // The opening hand emptied the deck, so the first turn draw fatigues.
    for _ in 0..2 {
        end_turn(&mut game, P0);
        end_turn(&mut game, P1);
    }

    let hero = avatar(&game, P0);
    let amounts: Vec<i64> = events_named(&game, "Fatigue")
        .filter(|e| e.player() == Some(P0))
        .map(|e| e.amount())
        .collect();
    assert_eq!(amounts, vec![1, 2, 3]);
    let entity = game.state().entity(hero).unwrap();
    assert_eq!(entity.var(vars::FATIGUE), 3);
    assert_eq!(entity.health(), 30 - 6);
}

#[test]
fn test_full_hand_burns_draw() {
    let mut game = started(
        dealer_catalog(),
        MatchConfig::default()
            .with_global_card("Dealer")
            .with_max_hand_size(3),
        [&["Footman"; 10], &["Footman"; 10]],
    );

    assert_eq!(game.state().hand_size(P0), 3);
    assert_eq!(count_events(&game, "CardBurned"), 1);
    let burned = events_named(&game, "CardBurned").next().unwrap().subject().unwrap();
    assert!(!game.state().entities().is_active(burned));

    end_turn(&mut game, P0);
    assert_eq!(count_events(&game, "CardBurned"), 2);
    assert_eq!(game.state().seat(P1).unwrap().deck.len(), 6);
}

#[test]
fn test_fatigue_can_end_game() {
    let mut def = dealer_catalog().with_rule(RuleDef::new(
        "frail",
        None,
        r#"[SetVar(target: This, var: "CURRENT_HEALTH", value: Int(2))]"#,
    ));
    if let Some(hero) = def.cards.iter_mut().find(|c| c.name == "Hero") {
        hero.rules.push("frail".into());
    }
    let mut game = started(
        def,
        MatchConfig::default().with_global_card("Dealer"),
        [&["Footman"; 3], &["Footman"; 10]],
    );

    // Turn 0 fatigue 1 leaves one health; turn 2 fatigue 2 is lethal.
    end_turn(&mut game, P0);
    end_turn(&mut game, P1);

    assert_eq!(game.state().outcome(), Some(Some(P1)));
    assert!(game.is_finished());
}
