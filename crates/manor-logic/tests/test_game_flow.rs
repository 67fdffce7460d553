//! Integration tests over the bundled Blackwood Manor world.
//!
//! Blackwood Manor layout (room index: neighbors):
//!
//! | Room | Name | Neighbors |
//! |------|------|-----------|
//! | 0 | Foyer | 1, 3, 4 |
//! | 1 | Library | 0, 2, 4 |
//! | 2 | Study | 1, 5 |
//! | 3 | Kitchen | 0, 4, 6 |
//! | 4 | Dining Hall | 0, 1, 3, 5, 6 |
//! | 5 | Conservatory | 2, 4 |
//! | 6 | Cellar | 3, 4 |
//! | 7 | Attic | (isolated) |

use manor_logic::error::ErrorKind;
use manor_logic::{
    parse_world, Game, GameConfig, GameError, Outcome, PlayerSetup, StateError, TurnEvent,
    ValidationError, WorldSpec,
};

const MANSION: &str = include_str!("../../../data/mansion.txt");

// ── Helpers ────────────────────────────────────────────────────────────

fn mansion() -> WorldSpec {
    parse_world(MANSION).expect("bundled world parses")
}

fn session(spec: WorldSpec, max_turn: u32, roster: Vec<PlayerSetup>) -> Game {
    let mut game = Game::new(spec).unwrap();
    game.configure(&GameConfig {
        max_turn,
        max_items_carried: 2,
        seed: Some(2024),
    })
    .unwrap();
    game.set_players(roster).unwrap();
    game
}

// ── World loading ──────────────────────────────────────────────────────

#[test]
fn bundled_world_loads() {
    let game = Game::new(mansion()).unwrap();
    assert_eq!(game.world_name(), "Blackwood Manor");
    assert_eq!(game.rooms().len(), 8);
    assert_eq!(game.items().len(), 10);
    assert_eq!((game.width(), game.height()), (17, 18));
    assert_eq!(game.target().name, "Lord Blackwood");
    assert_eq!(game.target().health, 50);
    assert_eq!(game.pet().name, "Shadow the Hound");
    assert_eq!((game.target().room, game.pet().room), (0, 0));
    assert_eq!(game.rooms()[4].name, "Dining Hall");
    assert_eq!(game.room_items(1).unwrap(), vec![1, 2]);
}

#[test]
fn adjacency_is_symmetric() {
    let game = Game::new(mansion()).unwrap();
    let adj = game.adjacency();
    for i in 0..game.rooms().len() {
        for j in 0..game.rooms().len() {
            assert_eq!(adj.are_adjacent(i, j), adj.are_adjacent(j, i), "{} vs {}", i, j);
        }
        assert!(!adj.are_adjacent(i, i));
    }
    assert_eq!(game.neighbors(4).unwrap(), &[0, 1, 3, 5, 6]);
    assert!(game.neighbors(7).unwrap().is_empty());
}

#[test]
fn overlapping_rooms_fail_construction() {
    let mut spec = mansion();
    let copy = spec.rooms[2].clone();
    spec.rooms.push(copy);
    let err = Game::new(spec).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err,
        GameError::Validation(ValidationError::RoomsOverlap { a: 2, b: 8 })
    );
}

#[test]
fn wall_sharing_rooms_are_adjacent() {
    let text = "10 10 Two Rooms\n5 Target\nPet\n2\n0 0 3 3 A\n0 4 4 7 B\n1\n0 1 Stick\n";
    let game = Game::new(parse_world(text).unwrap()).unwrap();
    assert!(game.adjacency().are_adjacent(0, 1));

    let clash = "10 10 Two Rooms\n5 Target\nPet\n2\n0 0 3 3 A\n0 0 3 3 C\n1\n0 1 Stick\n";
    assert!(Game::new(parse_world(clash).unwrap()).is_err());
}

// ── Pet wander ─────────────────────────────────────────────────────────

#[test]
fn pet_walks_depth_first() {
    let mut game = session(mansion(), 20, vec![PlayerSetup::human("Ada", 7)]);
    let mut rooms = Vec::new();
    for _ in 0..9 {
        game.look_around().unwrap();
        rooms.push(game.pet().room);
    }
    assert_eq!(rooms, vec![1, 2, 5, 3, 6, 4, 0, 1, 2]);
}

#[test]
fn pet_walk_is_reproducible() {
    let walk = || {
        let mut game = session(mansion(), 20, vec![PlayerSetup::human("Ada", 7)]);
        (0..15)
            .map(|_| {
                game.look_around().unwrap();
                game.pet().room
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(walk(), walk());
}

#[test]
fn moving_the_pet_restarts_its_walk() {
    let mut game = session(mansion(), 20, vec![PlayerSetup::human("Ada", 7)]);
    for _ in 0..3 {
        game.look_around().unwrap();
    }
    assert_eq!(game.pet().room, 5);
    game.move_pet(6).unwrap();
    // fresh walk rooted at the Cellar: Kitchen first, then back up to the Foyer
    assert_eq!(game.pet().room, 3);
    game.look_around().unwrap();
    assert_eq!(game.pet().room, 0);
}

// ── Attacks ────────────────────────────────────────────────────────────

#[test]
fn unseen_bare_handed_attack_costs_one_health() {
    let mut game = session(mansion(), 20, vec![PlayerSetup::human("Ada", 7)]);
    let summary = game.attack(None).unwrap();
    assert_eq!(game.target().health, 49);
    assert!(matches!(summary.events[0], TurnEvent::AttackLanded { damage: 1, .. }));
}

#[test]
fn killing_blow_with_item_wins() {
    let mut spec = mansion();
    spec.target.health = 1;
    let mut game = session(spec, 20, vec![PlayerSetup::human("Ada", 1)]);
    game.pickup_item(1).unwrap(); // Heavy Tome, attack 3

    // the pet has wandered into the Library: alone with it, Ada is unseen
    assert_eq!(game.pet().room, 1);
    assert!(!game.sighting(0).unwrap().is_seen());

    game.attack(Some(1)).unwrap();
    assert_eq!(game.target().health, 0);
    assert!(game.is_game_over());
    assert_eq!(game.outcome(), Some(Outcome::Winner(0)));
    assert_eq!(
        game.result_text().unwrap(),
        "Target character is killed! Winner is Ada."
    );
    assert_eq!(
        game.look_around().unwrap_err(),
        GameError::State(StateError::GameOver)
    );
}

#[test]
fn shared_room_blocks_attacks_but_consumes_items() {
    let mut game = session(
        mansion(),
        20,
        vec![PlayerSetup::human("Ada", 3), PlayerSetup::human("Bo", 3)],
    );
    game.pickup_item(3).unwrap(); // Carving Knife
    game.look_around().unwrap();

    let summary = game.attack(Some(3)).unwrap();
    assert!(matches!(summary.events[0], TurnEvent::AttackSeen { .. }));
    assert_eq!(game.target().health, 50);
    assert!(game.items()[3].used);
    assert!(game.carried_items(0).unwrap().is_empty());

    game.attack(None).unwrap();
    assert_eq!(game.target().health, 50);
    assert!(game.audit().is_empty());
}

// ── AI players ─────────────────────────────────────────────────────────

#[test]
fn scripted_ai_plays_its_script() {
    let script = ["PICKUP_ITEM", "3", "MOVE", "4", "ATTACK", "3", "MOVE", "3"];
    let mut game = session(
        mansion(),
        20,
        vec![PlayerSetup::scripted("Bot", 3, &script)],
    );
    game.ai_take_turn().unwrap();
    game.ai_take_turn().unwrap();
    assert_eq!(game.players()[0].room, 4);

    // alone in the Dining Hall with the pet two rooms away
    game.ai_take_turn().unwrap();
    assert_eq!(game.target().health, 46);
    assert!(game.items()[3].used);

    game.ai_take_turn().unwrap();
    assert_eq!(game.players()[0].room, 3);
    assert_eq!(game.turn(), 5);
}

#[test]
fn scripted_ai_skips_an_infeasible_step() {
    let script = ["PICKUP_ITEM", "3", "MOVE", "4", "ATTACK", "3", "MOVE", "3"];
    let mut game = session(
        mansion(),
        20,
        vec![PlayerSetup::scripted("Bot", 3, &script)],
    );
    for _ in 0..4 {
        game.ai_take_turn().unwrap();
    }

    // the script wraps to a pickup of the knife it already used
    assert_eq!(
        game.ai_take_turn().unwrap_err(),
        GameError::Validation(ValidationError::ItemAlreadyUsed { item: 3 })
    );
    assert_eq!(game.turn(), 5);

    // and carries on with the following step
    let summary = game.ai_take_turn().unwrap();
    assert_eq!(summary.turn, 5);
    assert_eq!(game.players()[0].room, 4);
    assert_eq!(game.turn(), 6);
    assert!(game.audit().is_empty());
}

#[test]
fn stuck_script_still_lets_turns_pass() {
    // the Study is two rooms away from the Foyer
    let script = ["MOVE", "2", "LOOK_AROUND"];
    let mut game = session(
        mansion(),
        3,
        vec![PlayerSetup::scripted("Bot", 0, &script)],
    );
    let mut calls = 0;
    while !game.is_game_over() {
        let _ = game.ai_take_turn();
        calls += 1;
        assert!(calls <= 6, "script never finished the game");
    }
    assert_eq!(calls, 6);
    assert_eq!(game.outcome(), Some(Outcome::NoWinner));
}

#[test]
fn lowered_turn_limit_ends_a_running_game() {
    let mut game = session(mansion(), 20, vec![PlayerSetup::human("Ada", 7)]);
    for _ in 0..4 {
        game.look_around().unwrap();
    }
    assert!(!game.is_game_over());

    game.set_max_turn(2).unwrap();
    assert!(game.is_game_over());
    assert_eq!(game.outcome(), Some(Outcome::NoWinner));
    assert_eq!(
        game.look_around().unwrap_err(),
        GameError::State(StateError::GameOver)
    );

    // the result stands when the limit is raised again
    assert!(game.set_max_turn(20).is_err());
    assert!(game.is_game_over());
    assert_eq!(game.turn(), 5);
}

#[test]
fn randomized_self_play_keeps_invariants() {
    let roster = vec![
        PlayerSetup::ai("Ash", 0),
        PlayerSetup::ai("Birch", 2),
        PlayerSetup::ai("Cedar", 5),
        PlayerSetup::ai("Dogwood", 6),
    ];
    let mut game = session(mansion(), 40, roster);
    let mut turn = game.turn();
    let mut health = game.target().health;

    while !game.is_game_over() {
        let summary = game.ai_take_turn().unwrap();
        assert_eq!(summary.turn, turn);
        if !game.is_game_over() {
            assert_eq!(game.turn(), turn + 1);
        }
        turn = game.turn();
        assert!(game.target().health <= health);
        health = game.target().health;
        let problems = game.audit();
        assert!(problems.is_empty(), "turn {}: {:?}", turn, problems);
    }

    match game.outcome() {
        Some(Outcome::Winner(_)) => assert_eq!(game.target().health, 0),
        Some(Outcome::NoWinner) => assert_eq!(game.turn(), 41),
        None => unreachable!(),
    }
    let over = game.ai_take_turn().unwrap_err();
    assert_eq!(over, GameError::State(StateError::GameOver));
    assert!(game.is_game_over());
}

#[test]
fn roster_from_json() {
    let json = r#"[
        {"name": "Ada", "start_room": 0, "kind": "Human"},
        {"name": "Bot", "start_room": 4, "kind": {"ScriptedAi": ["LOOK_AROUND"]}}
    ]"#;
    let roster: Vec<PlayerSetup> = serde_json::from_str(json).unwrap();
    let mut game = session(mansion(), 5, roster);
    game.look_around().unwrap();
    let summary = game.ai_take_turn().unwrap();
    assert_eq!(summary.player, "Bot");
    assert!(summary.look.is_some());
}
