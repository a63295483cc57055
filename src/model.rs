use crate::moves::moves_for;
use crate::species::{primary_type_for, sprite_urls, SpeciesInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const BASE_LEVEL: u32 = 5;
pub const BASE_MAX_HP: i32 = 100;
pub const HP_PER_LEVEL: i32 = 10;

/// A move is shared value data: every creature of one elemental type gets the
/// same four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Move {
    pub name: &'static str,
    pub power: i32,
    #[serde(rename = "type")]
    pub move_type: &'static str,
    pub description: &'static str,
    /// Only the once-per-battle healing move is special.
    pub special: bool,
}

impl Move {
    pub fn is_healing(&self) -> bool {
        self.special
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    pub front: String,
    pub back: String,
}

/// Maximum health for a level; levels below the base level count as the base.
pub fn max_hp_for_level(level: u32) -> i32 {
    let above_base = level.max(BASE_LEVEL) - BASE_LEVEL;
    BASE_MAX_HP + above_base as i32 * HP_PER_LEVEL
}

/// Shared view of a combatant for the battle engine.
pub trait Battler {
    fn name(&self) -> &str;
    fn primary_type(&self) -> &str;
    fn level(&self) -> u32;
    fn current_hp(&self) -> i32;
    fn set_current_hp(&mut self, hp: i32);

    fn max_hp(&self) -> i32 {
        max_hp_for_level(self.level())
    }

    fn is_defeated(&self) -> bool {
        self.current_hp() <= 0
    }

    fn moves(&self) -> [Move; 4] {
        moves_for(self.primary_type())
    }

    fn restore_full_hp(&mut self) {
        let max = self.max_hp();
        self.set_current_hp(max);
    }

    /// Applies damage with a floor of zero.
    fn take_damage(&mut self, damage: i32) {
        let hp = self.current_hp().saturating_sub(damage).max(0);
        self.set_current_hp(hp);
    }

    /// Heals up to `amount` without exceeding max health; returns the amount
    /// actually restored.
    fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current_hp();
        let after = before.saturating_add(amount).min(self.max_hp());
        self.set_current_hp(after);
        after - before
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPokemon {
    pub base_id: u32,
    pub current_id: u32,
    pub name: String,
    pub primary_type: String,
    pub level: u32,
    pub experience: u32,
    pub evolution_stage: u8,
    pub sprites: Sprites,
    pub current_hp: i32,
}

impl PlayerPokemon {
    pub fn from_record(record: &ProgressionRecord) -> Self {
        Self {
            base_id: record.base_id,
            current_id: record.current_id,
            name: record.name.clone(),
            primary_type: primary_type_for(record.current_id).to_string(),
            level: record.level,
            experience: record.experience,
            evolution_stage: record.evolution_stage,
            sprites: sprite_urls(record.current_id),
            current_hp: max_hp_for_level(record.level),
        }
    }
}

impl Battler for PlayerPokemon {
    fn name(&self) -> &str {
        &self.name
    }

    fn primary_type(&self) -> &str {
        &self.primary_type
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn current_hp(&self) -> i32 {
        self.current_hp
    }

    fn set_current_hp(&mut self, hp: i32) {
        self.current_hp = hp;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpponentPokemon {
    pub id: u32,
    pub name: String,
    pub primary_type: String,
    pub sprites: Sprites,
    pub level: u32,
    pub current_hp: i32,
}

impl OpponentPokemon {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        primary_type: impl Into<String>,
        sprites: Sprites,
        level: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            primary_type: primary_type.into(),
            sprites,
            level,
            current_hp: max_hp_for_level(level),
        }
    }
}

impl Battler for OpponentPokemon {
    fn name(&self) -> &str {
        &self.name
    }

    fn primary_type(&self) -> &str {
        &self.primary_type
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn current_hp(&self) -> i32 {
        self.current_hp
    }

    fn set_current_hp(&mut self, hp: i32) {
        self.current_hp = hp;
    }
}

/// The player's durable state, owned by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    pub base_id: u32,
    pub current_id: u32,
    pub name: String,
    pub level: u32,
    pub experience: u32,
    pub evolution_stage: u8,
    pub current_hp: i32,
    #[serde(default)]
    pub total_battles: u32,
    #[serde(default)]
    pub victories: u32,
    pub created_at: DateTime<Utc>,
    pub last_played_at: DateTime<Utc>,
}

impl ProgressionRecord {
    pub fn new_game(starter: &SpeciesInfo) -> Self {
        let now = Utc::now();
        Self {
            base_id: starter.id,
            current_id: starter.id,
            name: starter.name.clone(),
            level: BASE_LEVEL,
            experience: 0,
            evolution_stage: starter.stage,
            current_hp: max_hp_for_level(BASE_LEVEL),
            total_battles: 0,
            victories: 0,
            created_at: now,
            last_played_at: now,
        }
    }

    /// Copies the progression fields of a player combatant back into the record.
    pub fn sync_from(&mut self, player: &PlayerPokemon) {
        self.current_id = player.current_id;
        self.name = player.name.clone();
        self.level = player.level;
        self.experience = player.experience;
        self.evolution_stage = player.evolution_stage;
        self.current_hp = player.current_hp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::species;

    #[test]
    fn max_hp_scales_with_level_and_floors_at_base() {
        assert_eq!(max_hp_for_level(5), 100);
        assert_eq!(max_hp_for_level(8), 130);
        assert_eq!(max_hp_for_level(3), 100);
    }

    #[test]
    fn damage_and_heal_stay_in_bounds() {
        let mut mon = OpponentPokemon::new(25, "Pikachu", "electric", Sprites::default(), 5);
        mon.take_damage(150);
        assert_eq!(mon.current_hp, 0);
        assert!(mon.is_defeated());
        mon.set_current_hp(90);
        assert_eq!(mon.heal(30), 10);
        assert_eq!(mon.current_hp, 100);
    }

    #[test]
    fn record_round_trips_through_player() {
        let starter = species(4).expect("charmander is bundled");
        let mut record = ProgressionRecord::new_game(starter);
        assert_eq!(record.level, 5);
        assert_eq!(record.experience, 0);

        let mut player = PlayerPokemon::from_record(&record);
        assert_eq!(player.primary_type, "fire");
        assert_eq!(player.current_hp, 100);

        player.experience = 120;
        player.level = 7;
        player.current_hp = 42;
        record.sync_from(&player);
        assert_eq!(record.level, 7);
        assert_eq!(record.experience, 120);
        assert_eq!(record.current_hp, 42);
        assert_eq!(record.base_id, 4);
    }
}
