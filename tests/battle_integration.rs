//! Battle system integration tests

use std::collections::HashMap;
use std::sync::Arc;

use meadoworld_battle::battle::*;
use meadoworld_battle::campaign::{ItemId, Player, Roster};
use meadoworld_battle::core::{BattleConfig, BattleError, Side, UnitId};
use rand::RngCore;

const DT: f32 = 0.1;
const MAX_TICKS: usize = 50_000;

fn run_to_end(battle: &mut Battle) -> usize {
    let mut ticks = 0;
    while !battle.is_complete() && ticks < MAX_TICKS {
        battle.update(DT);
        ticks += 1;
    }
    ticks
}

fn champion() -> UnitTemplate {
    UnitTemplate {
        name: "Champion".into(),
        max_health: 1000.0,
        attack_range: 5.0,
        speed: 10.0,
        attack_interval: 0.5,
        damage: 500.0,
        armor: 1000.0,
        category: UnitCategory::Elite,
        ..UnitTemplate::default()
    }
}

fn peasant() -> UnitTemplate {
    UnitTemplate {
        name: "Peasant".into(),
        max_health: 20.0,
        attack_range: 2.0,
        speed: 5.0,
        attack_interval: 1.0,
        damage: 1.0,
        armor: 0.0,
        category: UnitCategory::Recruit,
        ..UnitTemplate::default()
    }
}

#[test]
fn test_duel_ends_with_one_wounded_survivor() {
    let infantry = Arc::new(UnitTemplate::infantry());
    let player = Roster::new().with(infantry.clone(), 1);
    let enemy = Roster::new().with(infantry, 1);
    let config = BattleConfig::default().with_seed(3).without_variance();

    let mut battle = Battle::new(&player, &enemy, config).unwrap();
    battle.proceed().unwrap();
    let ticks = run_to_end(&mut battle);

    assert!(battle.is_complete(), "duel did not finish in {} ticks", ticks);
    assert_eq!(battle.casualties().len(), 1);
    let survivors: Vec<&BattleUnit> = battle
        .living_units(Side::Player)
        .iter()
        .chain(battle.living_units(Side::Enemy))
        .collect();
    assert_eq!(survivors.len(), 1);
    let survivor = survivors[0];
    assert!(survivor.health() > 0.0 && survivor.health() < 100.0);
    assert_eq!(battle.player_won(), survivor.side == Side::Player);
    assert_eq!(battle.progress(), 0.5);

    // Unmodified infantry hits land at 10 * 100 / 105 each
    let hits: Vec<f32> = battle
        .events()
        .iter()
        .filter_map(|e| match e.event_type {
            BattleEventType::Damage { amount, .. } => Some(amount),
            _ => None,
        })
        .collect();
    assert!(hits.len() >= 11);
    for amount in hits {
        assert!((amount - 1000.0 / 105.0).abs() < 1e-3, "hit of {}", amount);
    }
}

#[test]
fn test_empty_player_roster_is_immediate_defeat() {
    let enemy = Roster::new().with(Arc::new(UnitTemplate::infantry()), 1);
    let mut battle = Battle::new(&Roster::new(), &enemy, BattleConfig::default()).unwrap();

    assert_eq!(battle.phase(), BattlePhase::Finished);
    assert!(battle.is_complete());
    assert!(!battle.player_won());
    let rewards = battle.take_rewards().unwrap();
    assert!(rewards.is_empty());
}

#[test]
fn test_empty_enemy_roster_is_immediate_victory() {
    let player = Roster::new().with(Arc::new(UnitTemplate::cavalry()), 5);
    let mut battle = Battle::new(&player, &Roster::new(), BattleConfig::default()).unwrap();

    assert!(battle.is_complete());
    assert!(battle.player_won());
    assert_eq!(battle.progress(), 0.0);
    let rewards = battle.take_rewards().unwrap();
    assert_eq!(rewards.gold, 0);
    assert!(rewards.items.is_empty());
    assert!(rewards.prisoners.is_empty());
}

#[test]
fn test_massacre_pays_double_gold() {
    let player = Roster::new().with(Arc::new(champion()), 3);
    let enemy = Roster::new().with(Arc::new(peasant()), 10);

    let mut battle = Battle::new(&player, &enemy, BattleConfig::default().with_seed(99)).unwrap();
    battle.proceed().unwrap();
    run_to_end(&mut battle);

    assert!(battle.is_complete());
    assert!(battle.player_won());
    assert_eq!(battle.alive_count(Side::Player), 3);
    assert_eq!(battle.dead_count(Side::Enemy), 10);
    assert!((battle.progress() - 10.0 / 13.0).abs() < 1e-6);
    assert_eq!(battle.rewards().map(|r| r.gold), Some(200));
}

#[test]
fn test_conservation_progress_and_non_revival() {
    let player = Roster::new()
        .with(Arc::new(UnitTemplate::infantry()), 6)
        .with(Arc::new(UnitTemplate::archer()), 4);
    let enemy = Roster::new()
        .with(Arc::new(UnitTemplate::cavalry()), 5)
        .with(Arc::new(UnitTemplate::infantry()), 3);

    let mut battle = Battle::new(&player, &enemy, BattleConfig::default().with_seed(21)).unwrap();
    assert_eq!(battle.deployed_count(Side::Player), 10);
    assert_eq!(battle.deployed_count(Side::Enemy), 8);
    battle.proceed().unwrap();

    let mut last_health: HashMap<UnitId, f32> = HashMap::new();
    let mut fallen: Vec<UnitId> = Vec::new();
    let mut last_progress = 0.0;
    let mut ticks = 0;

    while !battle.is_complete() && ticks < MAX_TICKS {
        battle.update(DT);
        ticks += 1;

        for side in [Side::Player, Side::Enemy] {
            assert_eq!(
                battle.alive_count(side) + battle.dead_count(side),
                battle.deployed_count(side)
            );
        }

        assert!(battle.progress() >= last_progress);
        assert!((0.0..=1.0).contains(&battle.progress()));
        last_progress = battle.progress();

        for unit in battle
            .living_units(Side::Player)
            .iter()
            .chain(battle.living_units(Side::Enemy))
        {
            assert!(unit.is_alive());
            assert!(!fallen.contains(&unit.id), "{} came back", unit.id);
            if let Some(prev) = last_health.insert(unit.id, unit.health()) {
                assert!(unit.health() <= prev);
            }
        }
        for dead in battle.casualties() {
            assert!(dead.health() <= 0.0);
            if !fallen.contains(&dead.id) {
                fallen.push(dead.id);
            }
        }
    }

    assert!(battle.is_complete());
    assert_eq!(fallen.len(), battle.casualties().len());
}

#[test]
fn test_phase_errors() {
    let roster = Roster::new().with(Arc::new(UnitTemplate::infantry()), 2);
    let mut battle = Battle::new(&roster, &roster, BattleConfig::default().with_seed(5)).unwrap();
    battle.proceed().unwrap();

    match battle.proceed() {
        Err(BattleError::WrongPhase { expected, actual }) => {
            assert_eq!(expected, BattlePhase::Deployment);
            assert_eq!(actual, BattlePhase::Combat);
        }
        other => panic!("expected WrongPhase, got {:?}", other),
    }

    run_to_end(&mut battle);
    assert!(battle.is_complete());
    assert!(battle.set_tactics(Side::Player, TacticType::Retreat).is_err());

    // Finished battles stay put
    let elapsed = battle.elapsed();
    let progress = battle.progress();
    battle.update(DT);
    assert_eq!(battle.elapsed(), elapsed);
    assert_eq!(battle.progress(), progress);
}

#[test]
fn test_event_log_records_fight() {
    let config = BattleConfig {
        event_log_capacity: 5,
        ..BattleConfig::default().with_seed(8)
    };
    let player = Roster::new().with(Arc::new(UnitTemplate::infantry()), 3);
    let enemy = Roster::new().with(Arc::new(UnitTemplate::archer()), 3);
    let mut battle = Battle::new(&player, &enemy, config).unwrap();
    battle.proceed().unwrap();
    assert_eq!(
        battle.recent_events(1).next().map(|e| e.description.as_str()),
        Some("Battle has begun!")
    );

    run_to_end(&mut battle);

    let log = battle.events();
    assert_eq!(log.len(), 5);
    assert!(log.total_logged() > 5);
    let last = battle.recent_events(1).next().unwrap();
    assert!(matches!(last.event_type, BattleEventType::BattleEnded { .. }));

    let times: Vec<f32> = log.iter().map(|e| e.time).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_same_seed_same_battle() {
    let player = Roster::new()
        .with(Arc::new(UnitTemplate::infantry()), 5)
        .with(Arc::new(UnitTemplate::archer()), 3);
    let enemy = Roster::new().with(Arc::new(UnitTemplate::cavalry()), 6);

    let fight = || {
        let mut battle =
            Battle::new(&player, &enemy, BattleConfig::default().with_seed(1234)).unwrap();
        battle.set_terrain(TerrainType::Hills).unwrap();
        battle.proceed().unwrap();
        let ticks = run_to_end(&mut battle);
        (
            ticks,
            battle.player_won(),
            battle.alive_count(Side::Player),
            battle.alive_count(Side::Enemy),
        )
    };

    assert_eq!(fight(), fight());
}

#[test]
fn test_layers_attached_battle_finishes() {
    let player = Roster::new()
        .with(Arc::new(UnitTemplate::infantry()), 8)
        .with(Arc::new(UnitTemplate::archer()), 4);
    let enemy = Roster::new().with(Arc::new(UnitTemplate::infantry()), 10);

    let mut battle = Battle::new(&player, &enemy, BattleConfig::default().with_seed(77)).unwrap();
    battle.set_terrain(TerrainType::Forest).unwrap();
    battle.set_weather(WeatherType::Rain, 18.0).unwrap();
    battle
        .arrange_formation(Side::Player, FormationType::Wedge, DEFAULT_FORMATION_SPACING, 0.0)
        .unwrap();
    battle.set_tactics(Side::Player, TacticType::Charge).unwrap();
    battle.proceed().unwrap();

    run_to_end(&mut battle);

    assert!(battle.is_complete());
    assert!(battle.weather().is_some_and(|w| !w.particles().is_empty()));
    let size = battle.battlefield_size();
    for unit in battle
        .living_units(Side::Player)
        .iter()
        .chain(battle.living_units(Side::Enemy))
    {
        assert!((0.0..=size.x).contains(&unit.position.x));
        assert!((0.0..=size.y).contains(&unit.position.y));
    }
}

#[test]
fn test_unknown_template_rejected() {
    let err = standard_units().require("Dragon").unwrap_err();
    assert!(matches!(err, BattleError::UnknownTemplate(name) if name == "Dragon"));
}

#[derive(Debug)]
struct TakeEverything;

impl LootPolicy for TakeEverything {
    fn loot(&self, defeated: &Roster, _rng: &mut dyn RngCore) -> LootYield {
        let mut yield_ = LootYield::default();
        yield_.items.insert(ItemId::new("iron"), defeated.total_troops());
        yield_.prisoners = defeated.entries().iter().map(|e| e.template.clone()).collect();
        yield_
    }
}

#[test]
fn test_victory_rewards_claimed_once() {
    let mut player = Player::with_roster(
        "Aldric",
        Roster::new().with(Arc::new(champion()), 2),
    );
    let enemy = Roster::new().with(Arc::new(peasant()), 4);

    let mut battle = Battle::with_loot_policy(
        &player.party.roster,
        &enemy,
        BattleConfig::default().with_seed(4),
        Box::new(TakeEverything),
    )
    .unwrap();
    battle.proceed().unwrap();
    run_to_end(&mut battle);
    assert!(battle.player_won());

    let rewards = battle.take_rewards().unwrap();
    assert_eq!(rewards.gold, 80);
    rewards.claim(&mut player.party.roster, &mut player.party.inventory);

    assert_eq!(player.gold(), STARTING_PLAYER_GOLD + 80);
    assert_eq!(player.party.inventory.item_count(&ItemId::new("iron")), 4);
    assert_eq!(player.party.roster.count_of("Peasant"), 1);
    assert_eq!(player.party.roster.count_of("Champion"), 2);

    assert!(battle.take_rewards().is_none());
}
