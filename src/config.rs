use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Tunable constants for a whole game session.
///
/// Every field has a default, so a config file only needs to list what it
/// overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub battle: BattleRules,
    pub progression: ProgressionRules,
    pub session: SessionRules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BattleRules {
    pub rest_heal: i32,
    pub critical_chance: f64,
    pub critical_multiplier: f64,
    pub damage_bonus_max: i32,
    /// Upper bound on turns for automated battle loops.
    pub max_turns: u32,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            rest_heal: 30,
            critical_chance: 0.10,
            critical_multiplier: 1.5,
            damage_bonus_max: 10,
            max_turns: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressionRules {
    pub base_level: u32,
    pub experience_per_level: u32,
    pub victory_experience: u32,
    pub first_evolution_level: u32,
    pub second_evolution_level: u32,
    pub evolution_timeout_ms: u64,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            base_level: 5,
            experience_per_level: 50,
            victory_experience: 50,
            first_evolution_level: 8,
            second_evolution_level: 16,
            evolution_timeout_ms: 5_000,
        }
    }
}

impl ProgressionRules {
    pub fn evolution_timeout(&self) -> Duration {
        Duration::from_millis(self.evolution_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionRules {
    pub opponent_level_min: u32,
    pub opponent_level_max: u32,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            opponent_level_min: 3,
            opponent_level_max: 7,
        }
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<GameConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let parsed: GameConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    validate_config(&parsed)?;
    Ok(parsed)
}

pub fn validate_config(config: &GameConfig) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&config.battle.critical_chance) {
        anyhow::bail!(
            "battle.critical_chance must be within 0.0..=1.0, got {}",
            config.battle.critical_chance
        );
    }
    if config.battle.rest_heal < 0 {
        anyhow::bail!("battle.rest_heal must be >= 0, got {}", config.battle.rest_heal);
    }
    if !config.battle.critical_multiplier.is_finite() || config.battle.critical_multiplier < 1.0 {
        anyhow::bail!(
            "battle.critical_multiplier must be a finite value >= 1.0, got {}",
            config.battle.critical_multiplier
        );
    }
    if config.battle.damage_bonus_max < 0 {
        anyhow::bail!("battle.damage_bonus_max must be >= 0");
    }
    if config.progression.experience_per_level == 0 {
        anyhow::bail!("progression.experience_per_level must be > 0");
    }
    if config.session.opponent_level_min > config.session.opponent_level_max {
        anyhow::bail!(
            "session.opponent_level_min ({}) exceeds opponent_level_max ({})",
            config.session.opponent_level_min,
            config.session.opponent_level_max
        );
    }
    Ok(())
}
