pub mod battle;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod moves;
pub mod persistence;
pub mod progression;
pub mod report;
pub mod session;
pub mod species;

use crate::battle::BattleEngine;
use crate::catalog::StaticCatalog;
use crate::config::{load_config, GameConfig};
use crate::model::{OpponentPokemon, PlayerPokemon, ProgressionRecord};
use crate::persistence::{FileProgressRepository, ProgressRepository};
use crate::progression::ProgressionEngine;
use crate::session::{random_opponent, run_battle, settle_battle, BattleOutcome, RandomPolicy};
use anyhow::Context;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

pub use crate::battle::{Battle, Phase, TurnResult};
pub use crate::error::{CatalogError, EvolutionError, PersistenceError};
pub use crate::model::{Battler, Move};

#[derive(Debug, Clone)]
pub enum Command {
    NewGame { starter: u32 },
    Play { battles: usize, seed: Option<u64> },
    Status,
    WinRates { battles: usize, seed: u64, output: PathBuf },
    Moves { primary_type: String },
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub save_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub command: Command,
}

pub fn load_catalog(path: Option<&Path>) -> anyhow::Result<StaticCatalog> {
    match path {
        Some(path) => StaticCatalog::from_api_file(path),
        None => Ok(StaticCatalog::bundled()),
    }
}

pub async fn run(opts: CliOptions) -> anyhow::Result<()> {
    let config = match &opts.config_path {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    let repo = FileProgressRepository::new(&opts.save_path);
    match opts.command {
        Command::NewGame { starter } => {
            let record = new_game(&repo, starter)?;
            println!(
                "Started a new game with {} (level {}). Saved to {}",
                record.name,
                record.level,
                repo.path().display()
            );
        }
        Command::Play { battles, seed } => {
            let catalog = load_catalog(opts.catalog_path.as_deref())?;
            let seed = seed.unwrap_or_else(rand::random::<u64>);
            play(&repo, catalog, &config, battles, seed).await?;
        }
        Command::Status => {
            let record = load_record(&repo)?;
            print_status(&record);
        }
        Command::WinRates {
            battles,
            seed,
            output,
        } => {
            if battles == 0 {
                anyhow::bail!("--battles must be > 0");
            }
            let catalog = load_catalog(opts.catalog_path.as_deref())?;
            let record = load_record(&repo)?;
            let player = PlayerPokemon::from_record(&record);
            let session = &config.session;
            let opponents: Vec<OpponentPokemon> = catalog
                .entries()
                .flat_map(|entry| {
                    (session.opponent_level_min..=session.opponent_level_max).map(move |level| {
                        OpponentPokemon::new(
                            entry.id,
                            entry.name.clone(),
                            entry.primary_type.clone(),
                            entry.sprites.clone(),
                            level,
                        )
                    })
                })
                .collect();
            let rows = report::compute_win_rates(&player, &opponents, battles, seed, &config.battle);
            report::write_csv(&rows, &output)?;
            println!(
                "Wrote {} win rates for {} to {}",
                rows.len(),
                player.name,
                output.display()
            );
        }
        Command::Moves { primary_type } => {
            for m in moves::moves_for(&primary_type) {
                let kind = if m.is_healing() { "special" } else { m.move_type };
                println!("{:<14} {:>3}  {:<9} {}", m.name, m.power, kind, m.description);
            }
        }
    }
    Ok(())
}

/// Creates and saves a fresh record for one of the bundled starters,
/// replacing any existing game.
pub fn new_game(repo: &dyn ProgressRepository, starter: u32) -> anyhow::Result<ProgressionRecord> {
    if !species::starter_ids().contains(&starter) {
        anyhow::bail!(
            "{starter} is not a starter (choose one of {:?})",
            species::starter_ids()
        );
    }
    let info = species::species(starter)
        .with_context(|| format!("starter {starter} missing from bundled species data"))?;
    if repo.has_existing_game() {
        tracing::info!("Replacing existing saved game");
    }
    let record = ProgressionRecord::new_game(info);
    repo.save(&record)?;
    Ok(record)
}

pub fn load_record(repo: &dyn ProgressRepository) -> anyhow::Result<ProgressionRecord> {
    repo.load()?
        .context("No saved game found. Start one with `new-game --starter <id>`")
}

/// Fights `battles` random opponents, settling and saving after each one.
pub async fn play(
    repo: &dyn ProgressRepository,
    catalog: StaticCatalog,
    config: &GameConfig,
    battles: usize,
    seed: u64,
) -> anyhow::Result<ProgressionRecord> {
    let mut record = load_record(repo)?;
    let mut player = PlayerPokemon::from_record(&record);
    let pool = catalog.ids();
    let progression = ProgressionEngine::with_rules(catalog, config.progression.clone());
    let mut rng = SmallRng::seed_from_u64(seed);
    tracing::info!(seed, battles, "starting play session");

    for round in 1..=battles {
        let opponent =
            random_opponent(&mut rng, progression.catalog(), &pool, &config.session).await?;
        println!(
            "\n== Battle {round}: {} (Lv {}) vs wild {} (Lv {}) ==",
            player.name, player.level, opponent.name, opponent.level
        );
        let mut engine = BattleEngine::with_rules(rng.gen(), config.battle.clone());
        let mut policy = RandomPolicy::new(rng.gen());
        let mut battle = engine.initialize_battle(player.clone(), opponent);
        for result in run_battle(&mut engine, &mut battle, &mut policy) {
            println!("{}", result.message);
        }

        let Some(outcome) = BattleOutcome::from_battle(&battle, &config.progression) else {
            tracing::warn!(
                turn = battle.turn(),
                "battle hit the turn limit without a winner; not recorded"
            );
            continue;
        };
        player = battle.player;
        if let Some(level_up) = settle_battle(&mut record, &mut player, outcome, &progression) {
            println!("{} gained {} XP.", player.name, level_up.experience_gained);
            if level_up.leveled_up {
                println!("{} grew to level {}!", player.name, level_up.new_level);
            }
            if level_up.can_evolve {
                let old_name = player.name.clone();
                let limit = config.progression.evolution_timeout();
                match progression.evolve_within(&mut player, limit).await {
                    Ok(()) => {
                        println!("{old_name} evolved into {}!", player.name);
                        record.sync_from(&player);
                    }
                    Err(e) => println!("{old_name} could not evolve: {e}"),
                }
            }
        } else {
            println!("{} was defeated.", player.name);
        }
        repo.save(&record)?;
    }
    print_status(&record);
    Ok(record)
}

fn print_status(record: &ProgressionRecord) {
    println!(
        "{} (#{}) Lv {}  XP {}  HP {}  stage {}",
        record.name,
        record.current_id,
        record.level,
        record.experience,
        record.current_hp,
        record.evolution_stage
    );
    println!(
        "Battles: {}  Victories: {}  Started: {}  Last played: {}",
        record.total_battles,
        record.victories,
        record.created_at.format("%Y-%m-%d %H:%M"),
        record.last_played_at.format("%Y-%m-%d %H:%M")
    );
}
