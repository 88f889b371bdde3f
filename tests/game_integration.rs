//! Adventure-layer integration tests: turns, encounters, victory

use ironhold::combat::{CombatResult, Side};
use ironhold::core::types::{GridPos, PlayerId};
use ironhold::core::{Catalogs, GameConfig, GameError};
use ironhold::game::{CombatCommand, GamePhase, GameState, Interaction, Player};
use ironhold::hero::HeroClass;
use ironhold::map::{standard_map, AdventureMap};
use ironhold::town::BuildingKind;
use ironhold::units::UnitRegistry;

fn standard_game(size: i32, seed: u64) -> GameState {
    let map = standard_map(size, size, &UnitRegistry::standard()).expect("map");
    GameState::new_standard(map, GameConfig::default(), seed).expect("game")
}

fn corridor_game() -> GameState {
    let players = vec![
        Player::new(PlayerId(1), "Red", false),
        Player::new(PlayerId(2), "Blue", false),
    ];
    GameState::new(
        AdventureMap::new(12, 1),
        players,
        GameConfig::default(),
        Catalogs::standard(),
        17,
    )
    .expect("game")
}

#[test]
fn test_ai_turns_always_hand_control_back() {
    let mut game = standard_game(20, 31);
    for day in 2..=8 {
        if game.is_over() {
            break;
        }
        game.end_turn().expect("end turn");
        if !game.is_over() {
            assert_eq!(game.current_player, PlayerId(1));
            assert_eq!(game.turn, day);
        }
        assert!(matches!(game.phase(), GamePhase::Adventure | GamePhase::GameOver));
        assert!(game.combat().is_none());
    }
}

#[test]
fn test_battle_on_the_road_decides_the_game() {
    let mut game = corridor_game();
    let red = game
        .add_hero(HeroClass::Knight, PlayerId(1), GridPos::new(1, 0), &[("SWORDSMAN", 20)], &[])
        .expect("red hero");
    let blue = game
        .add_hero(HeroClass::Warlock, PlayerId(2), GridPos::new(6, 0), &[("PEASANT", 5)], &[])
        .expect("blue hero");

    let report = game.move_hero_to(red, GridPos::new(9, 0)).expect("march");
    assert_eq!(report.interactions, vec![Interaction::HeroEngaged { defender: blue }]);
    assert_eq!(report.path.last(), Some(&GridPos::new(6, 0)));
    assert_eq!(game.phase(), GamePhase::Combat);
    assert!(matches!(game.end_turn(), Err(GameError::WrongPhase(GamePhase::Combat))));

    let summary = game
        .auto_resolve_combat()
        .expect("in combat")
        .expect("decided");
    assert_eq!(summary.result, CombatResult::AttackerWon);
    assert_eq!(summary.fallen_hero, Some(blue));

    // Blue has no hero and never had a town
    assert_eq!(game.winner, Some(PlayerId(1)));
    assert!(game.is_over());
    assert!(matches!(game.end_turn(), Err(GameError::GameOver)));
    assert!(matches!(
        game.move_hero_to(red, GridPos::new(11, 0)),
        Err(GameError::GameOver)
    ));
    assert!(game.game_log.iter().any(|line| line.contains("wins the game")));
}

#[test]
fn test_lair_fight_by_hand_then_auto() {
    let mut game = standard_game(20, 6);
    let knight = game.heroes_of(PlayerId(1)).next().expect("knight").id;
    let gold = game.players[0].resources.gold;

    let report = game.move_hero_to(knight, GridPos::new(8, 12)).expect("lair");
    assert!(report.started_combat());

    // Griffins open the round, so the knight casts first; the wolves then defend
    let target = game
        .combat()
        .and_then(|c| c.living(Side::Defender).next().map(|s| s.pos))
        .expect("wolves deployed");
    let step = game
        .execute_combat_action(CombatCommand::CastSpell {
            spell_id: "MAGIC_ARROW".to_string(),
            target: Some(target),
        })
        .expect("cast");
    assert!(step.summary.is_none());
    assert_eq!(game.combat().and_then(|c| c.attacker_hero.as_ref()).map(|h| h.mana), Some(15));
    game.execute_combat_action(CombatCommand::Defend).expect("defend");

    let mut summary = None;
    for _ in 0..10 {
        summary = game.auto_resolve_combat().expect("still fighting");
        if summary.is_some() {
            break;
        }
    }
    let summary = summary.expect("decided");
    assert_ne!(game.phase(), GamePhase::Combat);

    match summary.result {
        CombatResult::AttackerWon => {
            let lair = game.map.objects_at(GridPos::new(8, 12)).next().expect("lair");
            assert!(!lair.is_guarded());
            assert!(game.players[0].resources.gold > gold);
            let hero = game.hero(knight).expect("knight survives");
            assert!(hero.experience >= summary.experience);
            assert!(hero.mana < hero.max_mana);
        }
        CombatResult::DefenderWon => {
            assert!(game.hero(knight).is_none());
            let lair = game.map.objects_at(GridPos::new(8, 12)).next().expect("lair");
            assert!(lair.is_guarded());
        }
        CombatResult::InProgress => unreachable!("summary of an undecided combat"),
    }
}

#[test]
fn test_town_grows_over_a_week() {
    let mut game = standard_game(20, 2);
    for player in &mut game.players {
        player.is_ai = false;
    }
    let capital = game.towns_of(PlayerId(1)).next().expect("capital").id;

    game.open_town_view(capital).expect("own town");
    game.build_in_town(capital, BuildingKind::Fort).expect("fort");
    let recruited = game.recruit_from_town(capital, "PEASANT", 100).expect("peasants");
    assert!(recruited > 0);
    let pool = |game: &GameState| game.town(capital).map_or(0, |t| t.pool("PEASANT"));
    assert_eq!(pool(&game), 0);

    // Ending the turn also leaves the town screen
    game.end_turn().expect("end turn");
    assert_eq!(game.phase(), GamePhase::Adventure);
    while game.turn < 7 {
        game.end_turn().expect("end turn");
    }
    assert_eq!(pool(&game), recruited);
}

#[test]
fn test_ai_campaign_keeps_state_consistent() {
    let mut game = standard_game(24, 99);
    for player in &mut game.players {
        player.is_ai = true;
    }

    game.execute_ai_turn();
    for _ in 0..20 {
        if game.is_over() {
            break;
        }
        game.end_turn().expect("end turn");
        assert!(game.combat().is_none());
        for hero in &game.heroes {
            assert!(hero.army.len() <= game.config.max_army_slots);
            assert!(hero.army.iter().all(|stack| stack.count > 0));
            assert!(game.map.is_passable(hero.pos));
        }
    }

    if let Some(winner) = game.winner {
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.players.iter().any(|p| p.id == winner));
    }
}
