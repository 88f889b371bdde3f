//! Ironhold - Entry Point
//!
//! Headless runner for the engine: fight a single auto-resolved battle
//! between two armies, or let two AI players play the standard scenario.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use ironhold::combat::{CombatResult, CombatState, Side};
use ironhold::core::{Catalogs, GameConfig, GameError, Result};
use ironhold::game::GameState;
use ironhold::map::standard_map;
use ironhold::town::Resources;
use ironhold::units::{UnitRegistry, UnitStack};

/// Ironhold - headless battles and AI campaigns
#[derive(Parser, Debug)]
#[command(name = "ironhold")]
#[command(about = "Run auto-resolved battles or AI vs AI campaigns")]
struct Args {
    /// Game config file (TOML); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<String>,

    /// Random seed for deterministic runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, global = true, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Auto-resolve one battle between two armies
    Battle {
        /// Attacking army, e.g. "SWORDSMAN:20,ARCHER:10"
        #[arg(long)]
        attacker: String,

        /// Defending army, same format as --attacker
        #[arg(long)]
        defender: String,

        /// Print the full combat log
        #[arg(long, short = 'v')]
        verbose: bool,
    },
    /// Two AI players play the standard scenario
    Campaign {
        /// Days to play before stopping
        #[arg(long, default_value_t = 30)]
        turns: u32,

        /// Map width in tiles
        #[arg(long, default_value_t = 32)]
        width: i32,

        /// Map height in tiles
        #[arg(long, default_value_t = 32)]
        height: i32,
    },
}

const RECENT_LOG_LINES: usize = 10;

#[derive(Serialize)]
struct StackReport {
    unit: String,
    count: u32,
}

#[derive(Serialize)]
struct BattleReport {
    result: CombatResult,
    rounds: u32,
    iterations: u32,
    exhausted: bool,
    attacker_survivors: Vec<StackReport>,
    defender_survivors: Vec<StackReport>,
    seed: u64,
    log: Vec<String>,
}

#[derive(Serialize)]
struct PlayerReport {
    name: String,
    towns: usize,
    heroes: usize,
    resources: Resources,
}

#[derive(Serialize)]
struct CampaignReport {
    days: u32,
    phase: String,
    winner: Option<String>,
    players: Vec<PlayerReport>,
    recent_log: Vec<String>,
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ironhold=info")),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let json = args.format == "json";

    match args.command {
        Command::Battle {
            attacker,
            defender,
            verbose,
        } => {
            let report = run_battle(&config, &attacker, &defender, seed)?;
            if json {
                println!("{}", to_json(&report)?);
            } else {
                print_battle(&report, verbose);
            }
        }
        Command::Campaign {
            turns,
            width,
            height,
        } => {
            let report = run_campaign(config, turns, width, height, seed)?;
            if json {
                println!("{}", to_json(&report)?);
            } else {
                print_campaign(&report);
            }
        }
    }

    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| GameError::InvalidConfig(e.to_string()))
}

/// Parse "UNIT:COUNT,UNIT:COUNT" into stacks from the registry
fn parse_army(roster: &str, registry: &UnitRegistry) -> Result<Vec<UnitStack>> {
    roster
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (unit, count) = entry
                .split_once(':')
                .ok_or_else(|| {
                    GameError::InvalidConfig(format!("army entry '{entry}' needs UNIT:COUNT"))
                })?;
            let count: u32 = count
                .trim()
                .parse()
                .map_err(|_| {
                    GameError::InvalidConfig(format!("bad count in army entry '{entry}'"))
                })?;
            registry.create_stack(&unit.trim().to_uppercase(), count)
        })
        .collect()
}

fn run_battle(
    config: &GameConfig,
    attacker: &str,
    defender: &str,
    seed: u64,
) -> Result<BattleReport> {
    let catalogs = Catalogs::standard();
    let attacker_army = parse_army(attacker, &catalogs.units)?;
    let defender_army = parse_army(defender, &catalogs.units)?;

    let mut combat = CombatState::new(catalogs, &attacker_army, &defender_army, seed)
        .with_rules(config.combat);
    let outcome = combat.auto_resolve();
    tracing::info!(result = ?outcome.result, rounds = outcome.rounds, "battle finished");

    let survivors = |side: Side| -> Vec<StackReport> {
        combat
            .living(side)
            .map(|s| StackReport {
                unit: s.unit.name.clone(),
                count: s.unit.count,
            })
            .collect()
    };

    Ok(BattleReport {
        result: outcome.result,
        rounds: outcome.rounds,
        iterations: outcome.iterations,
        exhausted: outcome.exhausted,
        attacker_survivors: survivors(Side::Attacker),
        defender_survivors: survivors(Side::Defender),
        seed,
        log: combat.log.iter().map(|e| e.description.clone()).collect(),
    })
}

fn run_campaign(
    config: GameConfig,
    turns: u32,
    width: i32,
    height: i32,
    seed: u64,
) -> Result<CampaignReport> {
    let map = standard_map(width, height, &Catalogs::standard().units)?;
    let mut game = GameState::new_standard(map, config, seed)?;
    for player in &mut game.players {
        player.is_ai = true;
    }

    // Player 1 opens the game; every end_turn after that plays one full day
    game.execute_ai_turn();
    while !game.is_over() && game.turn <= turns {
        game.end_turn()?;
    }

    let players = game
        .players
        .iter()
        .map(|p| PlayerReport {
            name: p.name.clone(),
            towns: game.towns_of(p.id).count(),
            heroes: game.heroes_of(p.id).count(),
            resources: p.resources,
        })
        .collect();

    let skip = game.game_log.len().saturating_sub(RECENT_LOG_LINES);
    Ok(CampaignReport {
        days: game.turn,
        phase: game.phase().to_string(),
        winner: game
            .winner
            .and_then(|id| game.player(id))
            .map(|p| p.name.clone()),
        players,
        recent_log: game.game_log[skip..].to_vec(),
        seed,
    })
}

fn print_battle(report: &BattleReport, verbose: bool) {
    if verbose {
        for line in &report.log {
            println!("  {line}");
        }
        println!();
    }
    println!("=== Battle Result ===");
    println!("Outcome: {:?} after {} rounds", report.result, report.rounds);
    if report.exhausted {
        println!("(iteration cap reached before a side was wiped out)");
    }
    for (label, stacks) in [
        ("Attacker", &report.attacker_survivors),
        ("Defender", &report.defender_survivors),
    ] {
        println!("{label} survivors:");
        if stacks.is_empty() {
            println!("  none");
        }
        for stack in stacks {
            println!("  {} x{}", stack.unit, stack.count);
        }
    }
    println!("Seed: {}", report.seed);
}

fn print_campaign(report: &CampaignReport) {
    println!("=== Campaign Result ===");
    println!("Days played: {} ({})", report.days, report.phase);
    match &report.winner {
        Some(name) => println!("Winner: {name}"),
        None => println!("No winner yet"),
    }
    for player in &report.players {
        println!(
            "{}: {} towns, {} heroes, {} gold",
            player.name, player.towns, player.heroes, player.resources.gold
        );
    }
    println!("Recent events:");
    for line in &report.recent_log {
        println!("  {line}");
    }
    println!("Seed: {}", report.seed);
}
