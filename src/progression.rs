//! Experience, levels and evolution for the player's creature.

use crate::catalog::CatalogLookup;
use crate::config::ProgressionRules;
use crate::error::{CatalogError, EvolutionError};
use crate::model::PlayerPokemon;
use crate::species::{evolution_graph, EvolutionGraph};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpResult {
    pub experience_gained: u32,
    pub old_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
    pub can_evolve: bool,
}

/// `base_level + floor(experience / experience_per_level)`.
pub fn level_for_experience(experience: u32, rules: &ProgressionRules) -> u32 {
    rules.base_level + experience / rules.experience_per_level.max(1)
}

pub struct ProgressionEngine<C> {
    catalog: C,
    graph: EvolutionGraph,
    rules: ProgressionRules,
}

impl<C: CatalogLookup> ProgressionEngine<C> {
    /// Engine over the bundled evolution graph and default rules.
    pub fn new(catalog: C) -> Self {
        Self::with_graph(catalog, evolution_graph().clone(), ProgressionRules::default())
    }

    pub fn with_rules(catalog: C, rules: ProgressionRules) -> Self {
        Self::with_graph(catalog, evolution_graph().clone(), rules)
    }

    pub fn with_graph(catalog: C, graph: EvolutionGraph, rules: ProgressionRules) -> Self {
        Self {
            catalog,
            graph,
            rules,
        }
    }

    pub fn rules(&self) -> &ProgressionRules {
        &self.rules
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    fn stage_ready(&self, pokemon: &PlayerPokemon) -> bool {
        match pokemon.evolution_stage {
            0 => pokemon.level >= self.rules.first_evolution_level,
            1 => pokemon.level >= self.rules.second_evolution_level,
            _ => false,
        }
    }

    pub fn check_for_evolution(&self, pokemon: &PlayerPokemon) -> bool {
        self.stage_ready(pokemon) && self.graph.next_stage(pokemon.current_id).is_some()
    }

    /// Adds experience and rederives the level. Identity and stage are left
    /// untouched; evolving is a separate step.
    pub fn add_experience(&self, amount: u32, pokemon: &mut PlayerPokemon) -> LevelUpResult {
        let old_level = pokemon.level;
        pokemon.experience = pokemon.experience.saturating_add(amount);
        let new_level = level_for_experience(pokemon.experience, &self.rules);
        pokemon.level = new_level;
        let leveled_up = new_level > old_level;
        let can_evolve = leveled_up && self.check_for_evolution(pokemon);
        if leveled_up {
            tracing::info!(
                name = %pokemon.name,
                old_level,
                new_level,
                can_evolve,
                "level up"
            );
        }
        LevelUpResult {
            experience_gained: amount,
            old_level,
            new_level,
            leveled_up,
            can_evolve,
        }
    }

    /// Evolves into the next stage. On any failure `pokemon` is unchanged.
    pub async fn evolve(&self, pokemon: &mut PlayerPokemon) -> Result<(), EvolutionError> {
        if !self.check_for_evolution(pokemon) {
            return Err(EvolutionError::CannotEvolve);
        }
        let next = self
            .graph
            .next_stage(pokemon.current_id)
            .ok_or(EvolutionError::NoEvolutionData)?;
        let evolved = self.catalog.resolve(next.target).await.map_err(|e| {
            tracing::warn!(target_id = next.target, error = %e, "evolution lookup failed");
            EvolutionError::FetchFailed(e)
        })?;

        tracing::info!(
            from = %pokemon.name,
            to = %evolved.name,
            species = %next.name,
            stage = next.stage,
            "evolved"
        );
        pokemon.current_id = next.target;
        pokemon.name = evolved.name;
        pokemon.evolution_stage = next.stage;
        pokemon.sprites = evolved.sprites;
        Ok(())
    }

    /// [`Self::evolve`] bounded by `limit`. A timeout leaves `pokemon`
    /// unchanged and surfaces as a failed fetch.
    pub async fn evolve_within(
        &self,
        pokemon: &mut PlayerPokemon,
        limit: Duration,
    ) -> Result<(), EvolutionError> {
        let name = pokemon.name.clone();
        match tokio::time::timeout(limit, self.evolve(pokemon)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(%name, ?limit, "evolution lookup timed out");
                Err(EvolutionError::FetchFailed(CatalogError::TimedOut))
            }
        }
    }
}
