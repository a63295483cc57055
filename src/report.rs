use crate::battle::{BattleEngine, Phase};
use crate::config::BattleRules;
use crate::model::{OpponentPokemon, PlayerPokemon};
use crate::session::{run_battle, RandomPolicy};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct WinRate {
    pub name: String,
    pub primary_type: String,
    pub level: u32,
    pub win_rate: f64,
}

/// Win rate of `player` against each opponent under random play.
///
/// Battles that hit the turn limit count as half a win. Results are
/// reproducible for a given `seed` regardless of thread scheduling.
pub fn compute_win_rates(
    player: &PlayerPokemon,
    opponents: &[OpponentPokemon],
    battles_per_opponent: usize,
    seed: u64,
    rules: &BattleRules,
) -> Vec<WinRate> {
    opponents
        .par_iter()
        .enumerate()
        .map(|(idx, opponent)| {
            let mut cell_rng = SmallRng::seed_from_u64(seed ^ ((idx as u64) << 32));
            let mut wins = 0u64;
            let mut stalls = 0u64;
            for _ in 0..battles_per_opponent {
                let battle_seed: u64 = cell_rng.gen();
                let mut engine = BattleEngine::with_rules(battle_seed, rules.clone());
                let mut policy = RandomPolicy::new(cell_rng.gen());
                let mut battle = engine.initialize_battle(player.clone(), opponent.clone());
                run_battle(&mut engine, &mut battle, &mut policy);
                match battle.phase() {
                    Phase::Victory => wins += 1,
                    Phase::Defeat => {}
                    Phase::PlayerTurn | Phase::EnemyTurn => stalls += 1,
                }
            }
            let total = battles_per_opponent.max(1) as f64;
            WinRate {
                name: opponent.name.clone(),
                primary_type: opponent.primary_type.clone(),
                level: opponent.level,
                win_rate: (wins as f64 + 0.5 * stalls as f64) / total,
            }
        })
        .collect()
}

pub fn write_csv(rows: &[WinRate], path: &Path) -> anyhow::Result<()> {
    let mut out = String::from("name,type,level,win_rate\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{:.4}\n",
            row.name, row.primary_type, row.level, row.win_rate
        ));
    }
    std::fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProgressionRecord, Sprites};
    use crate::species::species;

    fn player() -> PlayerPokemon {
        PlayerPokemon::from_record(&ProgressionRecord::new_game(
            species(4).expect("charmander is bundled"),
        ))
    }

    fn opponents() -> Vec<OpponentPokemon> {
        vec![
            OpponentPokemon::new(1, "Bulbasaur", "grass", Sprites::default(), 3),
            OpponentPokemon::new(7, "Squirtle", "water", Sprites::default(), 7),
        ]
    }

    #[test]
    fn same_seed_gives_same_report() {
        let rules = BattleRules::default();
        let first = compute_win_rates(&player(), &opponents(), 40, 99, &rules);
        let second = compute_win_rates(&player(), &opponents(), 40, 99, &rules);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].name, "Squirtle");
        for row in &first {
            assert!((0.0..=1.0).contains(&row.win_rate));
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_opponent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("win_rates.csv");
        let rows = compute_win_rates(&player(), &opponents(), 5, 1, &BattleRules::default());
        write_csv(&rows, &path).expect("write");
        let written = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "name,type,level,win_rate");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Bulbasaur,grass,3,"));
    }
}
