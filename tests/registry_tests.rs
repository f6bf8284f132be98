//! Match registry: lifecycle, broadcast and eviction.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ccg_rules::cards::{CardDef, RuleDef};
use ccg_rules::commands::{CommandPayload, CommandRequest};
use ccg_rules::core::{MatchConfig, RegistryConfig};
use ccg_rules::engine::{MatchError, MatchId};
use ccg_rules::events::EventKind;
use ccg_rules::registry::{MatchRegistry, RegistryError};

use common::*;

fn registry(config: RegistryConfig) -> MatchRegistry {
    let def = base_catalog()
        .with_rule(RuleDef::new(
            "deal",
            Some("TurnStarted"),
            "[Draw(player: EventPlayer, count: Int(1))]",
        ))
        .with_card(CardDef::new("Dealer").with_rule("deal"));
    MatchRegistry::new(catalog(def), config)
}

fn dealer() -> MatchConfig {
    MatchConfig::default().with_global_card("Dealer")
}

fn end_turn_request() -> CommandRequest {
    CommandRequest::new(CommandPayload::EndTurn)
}

#[test]
fn test_create_and_submit() {
    let registry = registry(RegistryConfig::default());
    let id = registry
        .create(dealer(), players([&["Footman"; 10], &["Footman"; 10]]))
        .unwrap();
    assert_eq!(registry.len(), 1);

    let response = registry.submit(id, P0, &end_turn_request()).unwrap();
    assert!(response.success, "{:?}", response.errors);
    let response = registry.submit(id, P0, &end_turn_request()).unwrap();
    assert!(!response.success);

    let handle = registry.get(id).unwrap();
    let game = handle.lock().unwrap();
    assert_eq!(game.id(), id);
    assert_eq!(game.system().current_player(), P1);
}

#[test]
fn test_unknown_match() {
    let registry = registry(RegistryConfig::default());
    let err = registry.submit(MatchId(99), P0, &end_turn_request()).unwrap_err();
    assert!(matches!(err, RegistryError::UnknownMatch(MatchId(99))));
}

#[test]
fn test_failed_create_is_not_kept() {
    let registry = registry(RegistryConfig::default());
    let err = registry
        .create(dealer(), players([&["Dragon"], &[]]))
        .unwrap_err();
    assert!(matches!(err, RegistryError::Match(MatchError::UnknownCard(ref name)) if name == "Dragon"));
    assert!(registry.is_empty());
}

#[test]
fn test_broadcast_hides_opponent_hand() {
    let registry = registry(RegistryConfig::default());
    let id = registry
        .create(dealer(), players([&["Footman"; 10], &["Raider"; 10]]))
        .unwrap();
    let alice = registry.connect(id, P0).unwrap();
    let bob = registry.connect(id, P1).unwrap();

    registry.submit(id, P0, &end_turn_request()).unwrap();

    let alice_views: Vec<_> = alice.try_iter().collect();
    let bob_views: Vec<_> = bob.try_iter().collect();
    assert_eq!(alice_views.len(), 3);
    assert_eq!(alice_views.len(), bob_views.len());
    assert_eq!(
        alice_views.iter().map(|v| v.seq).collect::<Vec<_>>(),
        bob_views.iter().map(|v| v.seq).collect::<Vec<_>>()
    );

    let (seen_by_alice, seen_by_bob) = (&alice_views[2], &bob_views[2]);
    let EventKind::CardDrawn { card, player } = seen_by_alice.event else {
        panic!("expected a draw, got {:?}", seen_by_alice.event);
    };
    assert_eq!(player, P1);

    let hidden = seen_by_alice.entity(card).unwrap();
    assert!(hidden.hidden);
    assert_eq!(hidden.name, None);
    assert_eq!(hidden.owner, Some(P1));

    let visible = seen_by_bob.entity(card).unwrap();
    assert!(!visible.hidden);
    assert_eq!(visible.name.as_deref(), Some("Raider"));
}

#[test]
fn test_sweep_evicts_finished_and_idle() {
    let registry = registry(RegistryConfig::default());
    let finished = registry
        .create(dealer(), players([&["Footman"; 10], &["Footman"; 10]]))
        .unwrap();
    let idle = registry
        .create(dealer(), players([&["Footman"; 10], &["Footman"; 10]]))
        .unwrap();

    let response = registry
        .submit(finished, P1, &CommandRequest::new(CommandPayload::Concede))
        .unwrap();
    assert!(response.success);

    assert_eq!(registry.sweep(Instant::now()).unwrap(), vec![finished]);
    assert!(matches!(registry.get(finished), Err(RegistryError::UnknownMatch(_))));
    assert_eq!(registry.len(), 1);

    let later = Instant::now() + registry.config().idle_timeout() + Duration::from_secs(1);
    assert_eq!(registry.sweep(later).unwrap(), vec![idle]);
    assert!(registry.is_empty());
}

#[test]
fn test_sweeper_thread() {
    let config = RegistryConfig::default().with_idle_timeout(Duration::ZERO);
    let registry = Arc::new(registry(config));
    registry
        .create(dealer(), players([&["Footman"; 10], &["Footman"; 10]]))
        .unwrap();

    let sweeper = registry.spawn_sweeper(Duration::from_millis(5));
    let deadline = Instant::now() + Duration::from_secs(5);
    while !registry.is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    sweeper.shutdown();
    assert!(registry.is_empty());
}

#[test]
fn test_matches_run_concurrently() {
    let registry = Arc::new(registry(RegistryConfig::default()));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let id = registry
                    .create(dealer(), players([&["Footman"; 10], &["Footman"; 10]]))
                    .unwrap();
                for turn in 0..10u8 {
                    let player = ccg_rules::core::PlayerId::new(turn % 2);
                    let response = registry.submit(id, player, &end_turn_request()).unwrap();
                    assert!(response.success, "{:?}", response.errors);
                }
                id
            })
        })
        .collect();

    let mut ids: Vec<MatchId> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(registry.len(), 4);

    for id in ids {
        let handle = registry.get(id).unwrap();
        let game = handle.lock().unwrap();
        assert_eq!(game.state().history().iter().filter(|e| e.name() == "TurnStarted").count(), 11);
    }
}
