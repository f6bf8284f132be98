//! Combat, damage and lethal resolution.

mod common;

use ccg_rules::commands::CommandPayload;
use ccg_rules::engine::MatchPhase;
use ccg_rules::entities::{tags, vars};
use ccg_rules::events::EventKind;
use ccg_rules::script::RulesView;

use common::*;

#[test]
fn test_minions_trade_blows() {
    let mut game = simple([&["Footman"; 4], &["Footman"; 4]]);

    let a = play_named(&mut game, P0, "Footman", None);
    end_turn(&mut game, P0);
    let b = play_named(&mut game, P1, "Footman", None);
    end_turn(&mut game, P1);

    let before = game.state().history().len();
    let response = attack(&mut game, P0, a, b);
    assert!(response.success, "{:?}", response.errors);

    let fresh: Vec<_> = game.state().history().iter().skip(before).collect();
    let damage = fresh.iter().filter(|e| e.name() == "DamageDealt").count();
    let kills = fresh.iter().filter(|e| e.name() == "EntityKilled").count();
    assert_eq!(damage, 2);
    assert_eq!(kills, 0);

    let state = game.state();
    assert_eq!(state.entity(a).unwrap().health(), 1);
    assert_eq!(state.entity(b).unwrap().health(), 1);
    assert_eq!(state.entity(a).unwrap().var(vars::ATTACKS_REMAINING), 0);
}

#[test]
fn test_mutual_kill() {
    let mut game = simple([&["Footman"; 4], &["Raider"; 4]]);

    let footman = play_named(&mut game, P0, "Footman", None);
    end_turn(&mut game, P0);
    let raider = play_named(&mut game, P1, "Raider", None);
    let response = attack(&mut game, P1, raider, footman);
    assert!(response.success, "{:?}", response.errors);

    assert_eq!(count_events(&game, "EntityKilled"), 2);
    let state = game.state();
    for id in [footman, raider] {
        assert!(!state.entity(id).unwrap().has_tag(tags::IN_PLAY));
        assert!(!state.entities().is_active(id));
    }
    assert_eq!(game.phase(), MatchPhase::Started);
}

#[test]
fn test_summoning_sickness_and_charge() {
    let mut game = simple([&["Footman", "Raider", "Footman"], &[]]);

    let footman = play_named(&mut game, P0, "Footman", None);
    let raider = play_named(&mut game, P0, "Raider", None);
    let enemy = avatar(&game, P1);

    let response = attack(&mut game, P0, footman, enemy);
    assert!(!response.success);
    assert!(response.errors[0].contains("no attacks left"));

    let response = attack(&mut game, P0, raider, enemy);
    assert!(response.success, "{:?}", response.errors);
    // Fatigue took 6 at startup, the raider 3 more.
    assert_eq!(game.state().entity(enemy).unwrap().health(), 30 - 6 - 3);

    let response = attack(&mut game, P0, raider, enemy);
    assert!(!response.success);
}

#[test]
fn test_taunt_must_be_attacked_first() {
    let mut game = simple([&["Guard"; 4], &["Raider"; 4]]);

    let guard = play_named(&mut game, P0, "Guard", None);
    end_turn(&mut game, P0);
    let raider = play_named(&mut game, P1, "Raider", None);

    let p0_avatar = avatar(&game, P0);
    let response = attack(&mut game, P1, raider, p0_avatar);
    assert!(!response.success);
    assert_eq!(response.errors, vec![format!("{guard} must be attacked first")]);

    let response = attack(&mut game, P1, raider, guard);
    assert!(response.success, "{:?}", response.errors);
    let state = game.state();
    assert_eq!(state.entity(guard).unwrap().health(), 0);
    assert!(state.entity(raider).unwrap().is_in_play());
    // A zero-attack defender deals no damage back.
    assert_eq!(count_events(&game, "DamageDealt"), 1);
}

#[test]
fn test_invalid_attacks_accumulate() {
    let mut game = simple([&["Guard"; 4], &["Footman"; 4]]);

    let guard = play_named(&mut game, P0, "Guard", None);
    let response = attack(&mut game, P0, guard, guard);
    assert!(!response.success);
    assert_eq!(
        response.errors,
        vec![
            format!("{guard} cannot attack"),
            format!("{guard} cannot be attacked"),
        ]
    );
}

#[test]
fn test_lethal_spell_ends_game() {
    let mut game = simple([&["Doom", "Footman", "Footman"], &["Footman"; 3]]);

    play_named(&mut game, P0, "Doom", None);

    let state = game.state();
    assert_eq!(state.outcome(), Some(Some(P0)));
    assert!(!state.entities().is_active(avatar(&game, P1)));
    assert_eq!(game.phase(), MatchPhase::GameOver);
    assert!(matches!(
        state.history().last().map(|e| &e.kind),
        Some(EventKind::GameOver { winner: Some(p) }) if *p == P0
    ));

    let response = submit(&mut game, P0, CommandPayload::EndTurn);
    assert!(!response.success);
    assert_eq!(response.errors, vec!["match is over".to_string()]);
}

#[test]
fn test_spell_damage_and_heal() {
    let mut game = simple([&["Bolt", "Mend", "Footman"], &[]]);
    let enemy = avatar(&game, P1);

    play_named(&mut game, P0, "Bolt", Some(enemy));
    assert_eq!(game.state().entity(enemy).unwrap().health(), 30 - 6 - 3);

    play_named(&mut game, P0, "Mend", Some(enemy));
    assert_eq!(game.state().entity(enemy).unwrap().health(), 30 - 6 - 3 + 5);

    let healed: Vec<_> = events_named(&game, "Healed").map(|e| e.amount()).collect();
    assert_eq!(healed, vec![5]);
}
