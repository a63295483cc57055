use crate::config::BattleRules;
use crate::model::{Battler, Move, OpponentPokemon, PlayerPokemon};
use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::json;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    PlayerTurn,
    EnemyTurn,
    Victory,
    Defeat,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Player,
    Enemy,
}

/// One resolved action. `damage` is positive for damage dealt and negative
/// for healing applied.
#[derive(Clone, Debug, Serialize)]
pub struct BattleEvent {
    pub turn: u32,
    pub actor: Actor,
    #[serde(rename = "move")]
    pub move_used: Move,
    pub damage: i32,
    pub is_critical: bool,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a turn-resolution request. Precondition failures come back as
/// a result with `damage == 0` and the phase left as it was.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TurnResult {
    pub damage: i32,
    pub is_critical: bool,
    pub phase: Phase,
    pub message: String,
}

impl TurnResult {
    fn unchanged(phase: Phase, message: impl Into<String>) -> Self {
        TurnResult {
            damage: 0,
            is_critical: false,
            phase,
            message: message.into(),
        }
    }
}

/// State of one encounter. Created fresh per battle and discarded afterwards.
#[derive(Clone, Debug)]
pub struct Battle {
    pub player: PlayerPokemon,
    pub opponent: OpponentPokemon,
    phase: Phase,
    turn: u32,
    rest_used: bool,
    log: Vec<BattleEvent>,
}

impl Battle {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn rest_used(&self) -> bool {
        self.rest_used
    }

    pub fn log(&self) -> &[BattleEvent] {
        &self.log
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "player": self.player.name,
            "opponent": self.opponent.name,
            "phase": self.phase,
            "turn": self.turn,
            "restUsed": self.rest_used,
            "log": self.log,
        })
    }

    fn record(&mut self, actor: Actor, move_used: Move, damage: i32, is_critical: bool) {
        self.log.push(BattleEvent {
            turn: self.turn,
            actor,
            move_used,
            damage,
            is_critical,
            timestamp: Utc::now(),
        });
    }
}

/// Resolves turns for [`Battle`] values.
///
/// The random source is a type parameter so tests can inject a seeded one;
/// by default it is a `SmallRng`.
pub struct BattleEngine<R = SmallRng> {
    rng: R,
    rules: BattleRules,
}

impl BattleEngine<SmallRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_rules(seed, BattleRules::default())
    }

    pub fn with_rules(seed: u64, rules: BattleRules) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed), rules)
    }
}

impl<R: Rng> BattleEngine<R> {
    pub fn from_rng(rng: R, rules: BattleRules) -> Self {
        Self { rng, rules }
    }

    pub fn rules(&self) -> &BattleRules {
        &self.rules
    }

    pub fn initialize_battle(&self, player: PlayerPokemon, opponent: OpponentPokemon) -> Battle {
        let mut player = player;
        let mut opponent = opponent;
        player.restore_full_hp();
        opponent.restore_full_hp();
        Battle {
            player,
            opponent,
            phase: Phase::PlayerTurn,
            turn: 1,
            rest_used: false,
            log: Vec::new(),
        }
    }

    pub fn execute_player_move(&mut self, move_def: &Move, battle: &mut Battle) -> TurnResult {
        if battle.phase != Phase::PlayerTurn {
            let message = if battle.is_over() {
                "The battle is already over"
            } else {
                "It's not your turn"
            };
            return TurnResult::unchanged(battle.phase, message);
        }
        if battle.player.is_defeated() {
            return TurnResult::unchanged(
                battle.phase,
                format!("{} can no longer fight", battle.player.name),
            );
        }
        if move_def.is_healing() {
            return self.execute_rest(move_def, battle);
        }

        let is_critical = self.check_for_critical_hit();
        let damage = self.calculate_damage(move_def, is_critical);
        battle.opponent.take_damage(damage);

        let (phase, message) = if battle.opponent.is_defeated() {
            (
                Phase::Victory,
                format!("{} defeated {}!", battle.player.name, battle.opponent.name),
            )
        } else {
            let critical_text = if is_critical { " Critical hit!" } else { "" };
            (
                Phase::EnemyTurn,
                format!(
                    "{} used {}! Dealt {} damage.{}",
                    battle.player.name, move_def.name, damage, critical_text
                ),
            )
        };
        battle.phase = phase;
        battle.record(Actor::Player, *move_def, damage, is_critical);
        tracing::debug!(
            turn = battle.turn,
            actor = "player",
            move_name = move_def.name,
            damage,
            is_critical,
            opponent_hp = battle.opponent.current_hp,
            ?phase,
            "resolved player move"
        );
        TurnResult {
            damage,
            is_critical,
            phase,
            message,
        }
    }

    pub fn execute_enemy_turn(&mut self, battle: &mut Battle) -> TurnResult {
        if battle.phase != Phase::EnemyTurn {
            let message = if battle.is_over() {
                "The battle is already over"
            } else {
                "It's not the enemy's turn"
            };
            return TurnResult::unchanged(battle.phase, message);
        }
        if battle.opponent.is_defeated() {
            return TurnResult::unchanged(battle.phase, "The enemy is defeated!");
        }

        let moves = battle.opponent.moves();
        let Some(selected) = moves.choose(&mut self.rng).copied() else {
            return TurnResult::unchanged(battle.phase, "Enemy has no moves");
        };
        let is_critical = self.check_for_critical_hit();
        let damage = self.calculate_damage(&selected, is_critical);
        battle.player.take_damage(damage);

        let (phase, message) = if battle.player.is_defeated() {
            (
                Phase::Defeat,
                format!("{} defeated {}!", battle.opponent.name, battle.player.name),
            )
        } else {
            let critical_text = if is_critical { " Critical hit!" } else { "" };
            (
                Phase::PlayerTurn,
                format!(
                    "{} used {}! Dealt {} damage.{}",
                    battle.opponent.name, selected.name, damage, critical_text
                ),
            )
        };
        battle.phase = phase;
        battle.record(Actor::Enemy, selected, damage, is_critical);
        battle.turn += 1;
        tracing::debug!(
            turn = battle.turn,
            actor = "enemy",
            move_name = selected.name,
            damage,
            is_critical,
            player_hp = battle.player.current_hp,
            ?phase,
            "resolved enemy move"
        );
        TurnResult {
            damage,
            is_critical,
            phase,
            message,
        }
    }

    fn execute_rest(&mut self, move_def: &Move, battle: &mut Battle) -> TurnResult {
        if battle.rest_used {
            return TurnResult::unchanged(battle.phase, "Rest can only be used once per battle");
        }
        let healed = battle.player.heal(self.rules.rest_heal);
        battle.rest_used = true;
        battle.phase = Phase::EnemyTurn;
        battle.record(Actor::Player, *move_def, -healed, false);
        tracing::debug!(
            turn = battle.turn,
            healed,
            player_hp = battle.player.current_hp,
            "player used rest"
        );
        TurnResult {
            damage: -healed,
            is_critical: false,
            phase: Phase::EnemyTurn,
            message: format!("{} used Rest. Restored {} HP.", battle.player.name, healed),
        }
    }

    pub fn calculate_damage(&mut self, move_def: &Move, is_critical: bool) -> i32 {
        calculate_damage(move_def, is_critical, &self.rules, &mut self.rng)
    }

    pub fn check_for_critical_hit(&mut self) -> bool {
        check_for_critical_hit(&self.rules, &mut self.rng)
    }
}

/// `power + U[0, damage_bonus_max]`, multiplied and truncated on a critical hit.
pub fn calculate_damage(move_def: &Move, is_critical: bool, rules: &BattleRules, rng: &mut impl Rng) -> i32 {
    let bonus = rng.gen_range(0..=rules.damage_bonus_max);
    let total = move_def.power + bonus;
    if is_critical {
        (total as f64 * rules.critical_multiplier) as i32
    } else {
        total
    }
}

pub fn check_for_critical_hit(rules: &BattleRules, rng: &mut impl Rng) -> bool {
    rng.gen::<f64>() < rules.critical_chance
}
