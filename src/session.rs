//! Glue between the battle and progression engines: picking opponents,
//! driving a battle to its end and settling the result into the save record.

use crate::battle::{Battle, BattleEngine, Phase, TurnResult};
use crate::catalog::CatalogLookup;
use crate::config::{ProgressionRules, SessionRules};
use crate::error::CatalogError;
use crate::model::{Battler, Move, OpponentPokemon, PlayerPokemon, ProgressionRecord};
use crate::progression::{LevelUpResult, ProgressionEngine};
use chrono::Utc;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Chooses the player's move when nobody is at the controls.
pub trait PlayerPolicy {
    fn choose_move(&mut self, battle: &Battle, usable: &[Move]) -> Move;
}

pub struct RandomPolicy {
    rng: SmallRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

/// Uniform pick among usable moves, except that Rest is skipped while the
/// player is at full health.
impl PlayerPolicy for RandomPolicy {
    fn choose_move(&mut self, battle: &Battle, usable: &[Move]) -> Move {
        let at_full_health = battle.player.current_hp >= battle.player.max_hp();
        let candidates: Vec<Move> = usable
            .iter()
            .copied()
            .filter(|m| !(m.is_healing() && at_full_health))
            .collect();
        let pool = if candidates.is_empty() { usable } else { &candidates };
        *pool.choose(&mut self.rng).unwrap_or(&crate::moves::TACKLE)
    }
}

/// Moves the player can still use; Rest drops out once spent.
pub fn usable_moves(battle: &Battle) -> Vec<Move> {
    battle
        .player
        .moves()
        .into_iter()
        .filter(|m| !(m.is_healing() && battle.rest_used()))
        .collect()
}

/// Runs turns until the battle ends or the turn limit is hit.
pub fn run_battle<R: Rng, P: PlayerPolicy>(
    engine: &mut BattleEngine<R>,
    battle: &mut Battle,
    policy: &mut P,
) -> Vec<TurnResult> {
    let max_turns = engine.rules().max_turns;
    let mut results = Vec::new();
    while !battle.is_over() && battle.turn() <= max_turns {
        let result = match battle.phase() {
            Phase::PlayerTurn => {
                let usable = usable_moves(battle);
                let choice = policy.choose_move(battle, &usable);
                engine.execute_player_move(&choice, battle)
            }
            Phase::EnemyTurn => engine.execute_enemy_turn(battle),
            Phase::Victory | Phase::Defeat => break,
        };
        results.push(result);
    }
    results
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Victory { experience_gained: u32 },
    Defeat,
}

impl BattleOutcome {
    /// `None` while the battle is still running.
    pub fn from_battle(battle: &Battle, rules: &ProgressionRules) -> Option<Self> {
        match battle.phase() {
            Phase::Victory => Some(BattleOutcome::Victory {
                experience_gained: rules.victory_experience,
            }),
            Phase::Defeat => Some(BattleOutcome::Defeat),
            Phase::PlayerTurn | Phase::EnemyTurn => None,
        }
    }
}

/// Applies a finished battle to the player and the save record.
pub fn settle_battle<C: CatalogLookup>(
    record: &mut ProgressionRecord,
    player: &mut PlayerPokemon,
    outcome: BattleOutcome,
    progression: &ProgressionEngine<C>,
) -> Option<LevelUpResult> {
    record.total_battles += 1;
    record.last_played_at = Utc::now();
    let level_up = match outcome {
        BattleOutcome::Victory { experience_gained } => {
            record.victories += 1;
            Some(progression.add_experience(experience_gained, player))
        }
        BattleOutcome::Defeat => None,
    };
    record.sync_from(player);
    level_up
}

/// Picks a random opponent identity from `pool` and a level within the
/// session bounds, then resolves its display data.
pub async fn random_opponent<R: Rng, C: CatalogLookup>(
    rng: &mut R,
    catalog: &C,
    pool: &[u32],
    rules: &SessionRules,
) -> Result<OpponentPokemon, CatalogError> {
    let id = *pool.choose(rng).ok_or(CatalogError::Empty)?;
    let level = rng.gen_range(rules.opponent_level_min..=rules.opponent_level_max);
    let entry = catalog.resolve(id).await?;
    Ok(OpponentPokemon::new(
        entry.id,
        entry.name,
        entry.primary_type,
        entry.sprites,
        level,
    ))
}
