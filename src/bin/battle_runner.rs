//! Headless Battle Runner
//!
//! Fights one battle between two rosters and prints the outcome as JSON or text.
//!
//! ```text
//! battle_runner --player Infantry=10 --player Archer=4 --enemy Cavalry=8 \
//!     --terrain hills --weather rain --seed 7
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use meadoworld_battle::battle::{
    standard_units, Battle, BattlePhase, FormationType, TacticType, TerrainType, UnitCatalog,
    WeatherType, DEFAULT_FORMATION_SPACING,
};
use meadoworld_battle::campaign::{Player, Roster};
use meadoworld_battle::core::{BattleConfig, Result, Side};
use serde::Serialize;

/// Headless Battle Runner - one battle, scored
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run a battle between two rosters and report the result")]
struct Args {
    /// Player troops as Name=count (repeatable)
    #[arg(long = "player", value_parser = parse_troops, required = true)]
    player: Vec<(String, u32)>,

    /// Enemy troops as Name=count (repeatable)
    #[arg(long = "enemy", value_parser = parse_troops, required = true)]
    enemy: Vec<(String, u32)>,

    /// Terrain: plains, forest, hills, mountains, swamp, desert
    #[arg(long, value_parser = parse_terrain)]
    terrain: Option<TerrainType>,

    /// Weather: clear, cloudy, rain, storm, fog, snow
    #[arg(long, value_parser = parse_weather)]
    weather: Option<WeatherType>,

    /// Hour of day for weather visibility
    #[arg(long, default_value_t = 12.0)]
    hour: f32,

    /// Player tactic: charge, hold, skirmish, flank, retreat
    #[arg(long, value_parser = parse_tactic)]
    tactic: Option<TacticType>,

    /// Player formation: line, square, wedge, circle, scattered
    #[arg(long, value_parser = parse_formation)]
    formation: Option<FormationType>,

    /// Battle config TOML (battlefield, variance, gold rate)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unit catalog TOML; the standard troops are used otherwise
    #[arg(long)]
    units: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Maximum ticks before the battle is called undecided
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct BattleResult {
    outcome: String,
    ticks: u64,
    elapsed: f32,
    player_survivors: usize,
    player_deployed: usize,
    enemy_survivors: usize,
    enemy_deployed: usize,
    progress: f32,
    gold_awarded: u32,
    player_gold: u32,
    recent_events: Vec<String>,
    seed: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meadoworld_battle=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = match &args.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    }
    .with_seed(seed);

    let catalog = match &args.units {
        Some(path) => UnitCatalog::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => standard_units().clone(),
    };
    let mut player = Player::with_roster("Player", build_roster(&catalog, &args.player)?);
    let enemy_roster = build_roster(&catalog, &args.enemy)?;

    let mut battle = Battle::new(&player.party.roster, &enemy_roster, config)?;
    if let Some(terrain) = args.terrain {
        battle.set_terrain(terrain)?;
    }
    if let Some(weather) = args.weather {
        battle.set_weather(weather, args.hour)?;
    }
    if let Some(formation) = args.formation {
        battle.arrange_formation(Side::Player, formation, DEFAULT_FORMATION_SPACING, 0.0)?;
    }
    if let Some(tactic) = args.tactic {
        battle.set_tactics(Side::Player, tactic)?;
    }

    let mut ticks = 0;
    if battle.phase() == BattlePhase::Deployment {
        battle.proceed()?;
    }
    while !battle.is_complete() && ticks < args.max_ticks {
        battle.update(args.dt);
        ticks += 1;
    }

    let summary = battle.summary();
    let recent_events = battle
        .recent_events(10)
        .map(|e| format!("[{:.1}s] {}", e.time, e.description))
        .collect();
    let gold_awarded = match battle.take_rewards() {
        Some(rewards) => {
            let gold = rewards.gold;
            rewards.claim(&mut player.party.roster, &mut player.party.inventory);
            gold
        }
        None => 0,
    };

    let outcome = match (summary.phase, summary.player_won) {
        (BattlePhase::Finished, true) => "Victory",
        (BattlePhase::Finished, false) => "Defeat",
        _ => "Undecided",
    };
    let result = BattleResult {
        outcome: outcome.to_string(),
        ticks,
        elapsed: summary.elapsed,
        player_survivors: summary.player_alive,
        player_deployed: summary.player_deployed,
        enemy_survivors: summary.enemy_alive,
        enemy_deployed: summary.enemy_deployed,
        progress: summary.progress,
        gold_awarded,
        player_gold: player.gold(),
        recent_events,
        seed,
    };

    match args.format.as_str() {
        "text" => print_text(&result),
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

fn print_text(result: &BattleResult) {
    println!("Battle Result");
    println!("=============");
    println!("Outcome: {}", result.outcome);
    println!("Ticks: {} ({:.1}s of combat)", result.ticks, result.elapsed);
    println!(
        "Player survivors: {}/{}",
        result.player_survivors, result.player_deployed
    );
    println!(
        "Enemy survivors: {}/{}",
        result.enemy_survivors, result.enemy_deployed
    );
    println!("Gold awarded: {} (purse now {})", result.gold_awarded, result.player_gold);
    println!();
    println!("Last events:");
    for line in &result.recent_events {
        println!("  {}", line);
    }
    println!();
    println!("Seed: {}", result.seed);
}

fn build_roster(catalog: &UnitCatalog, troops: &[(String, u32)]) -> Result<Roster> {
    let mut roster = Roster::new();
    for (name, count) in troops {
        roster.add_troop(catalog.require(name)?, *count);
    }
    Ok(roster)
}

fn parse_troops(s: &str) -> std::result::Result<(String, u32), String> {
    let (name, count) = s
        .split_once('=')
        .ok_or_else(|| format!("expected Name=count, got '{}'", s))?;
    let count = count
        .trim()
        .parse()
        .map_err(|e| format!("bad count in '{}': {}", s, e))?;
    Ok((name.trim().to_string(), count))
}

fn parse_terrain(s: &str) -> std::result::Result<TerrainType, String> {
    match s.to_lowercase().as_str() {
        "plains" => Ok(TerrainType::Plains),
        "forest" => Ok(TerrainType::Forest),
        "hills" => Ok(TerrainType::Hills),
        "mountains" => Ok(TerrainType::Mountains),
        "swamp" => Ok(TerrainType::Swamp),
        "desert" => Ok(TerrainType::Desert),
        _ => Err(format!("unknown terrain '{}'", s)),
    }
}

fn parse_weather(s: &str) -> std::result::Result<WeatherType, String> {
    match s.to_lowercase().as_str() {
        "clear" => Ok(WeatherType::Clear),
        "cloudy" => Ok(WeatherType::Cloudy),
        "rain" => Ok(WeatherType::Rain),
        "storm" => Ok(WeatherType::Storm),
        "fog" => Ok(WeatherType::Fog),
        "snow" => Ok(WeatherType::Snow),
        _ => Err(format!("unknown weather '{}'", s)),
    }
}

fn parse_tactic(s: &str) -> std::result::Result<TacticType, String> {
    match s.to_lowercase().as_str() {
        "charge" => Ok(TacticType::Charge),
        "hold" | "holdposition" => Ok(TacticType::HoldPosition),
        "skirmish" => Ok(TacticType::Skirmish),
        "flank" => Ok(TacticType::Flank),
        "retreat" => Ok(TacticType::Retreat),
        _ => Err(format!("unknown tactic '{}'", s)),
    }
}

fn parse_formation(s: &str) -> std::result::Result<FormationType, String> {
    match s.to_lowercase().as_str() {
        "line" => Ok(FormationType::Line),
        "square" => Ok(FormationType::Square),
        "wedge" => Ok(FormationType::Wedge),
        "circle" => Ok(FormationType::Circle),
        "scattered" => Ok(FormationType::Scattered),
        _ => Err(format!("unknown formation '{}'", s)),
    }
}
