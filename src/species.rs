//! Bundled species data: starter lineages and the evolution graph.
//!
//! The graph is keyed by source identity. Anything missing from it simply has
//! no evolution data; there is no guessing of stages for unknown identities.

use crate::model::Sprites;
use anyhow::{anyhow, bail};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

const SPRITE_BASE: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesInfo {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub primary_type: String,
    pub stage: u8,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EvolutionEdge {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Deserialize)]
pub struct SpeciesData {
    pub species: Vec<SpeciesInfo>,
    pub starters: Vec<u32>,
    pub evolutions: Vec<EvolutionEdge>,
}

/// Descriptor of the form a creature evolves into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextStage {
    pub target: u32,
    pub name: String,
    pub stage: u8,
}

#[derive(Debug, Clone, Default)]
pub struct EvolutionGraph {
    edges: HashMap<u32, NextStage>,
}

impl EvolutionGraph {
    pub fn from_data(data: &SpeciesData) -> anyhow::Result<Self> {
        let by_id: HashMap<u32, &SpeciesInfo> = data.species.iter().map(|s| (s.id, s)).collect();
        let mut edges = HashMap::new();
        for edge in &data.evolutions {
            let source = by_id
                .get(&edge.from)
                .ok_or_else(|| anyhow!("evolution source {} is not a known species", edge.from))?;
            let target = by_id
                .get(&edge.to)
                .ok_or_else(|| anyhow!("evolution target {} is not a known species", edge.to))?;
            if target.stage != source.stage + 1 {
                bail!(
                    "evolution {} -> {} skips stages ({} -> {})",
                    edge.from,
                    edge.to,
                    source.stage,
                    target.stage
                );
            }
            let next = NextStage {
                target: target.id,
                name: target.name.clone(),
                stage: target.stage,
            };
            if edges.insert(edge.from, next).is_some() {
                bail!("species {} has more than one evolution", edge.from);
            }
        }
        Ok(Self { edges })
    }

    pub fn next_stage(&self, id: u32) -> Option<&NextStage> {
        self.edges.get(&id)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

static SPECIES: Lazy<SpeciesData> = Lazy::new(|| {
    let json_str = include_str!("../data/species.json");
    serde_json::from_str(json_str).expect("Failed to parse data/species.json")
});

static EVOLUTIONS: Lazy<EvolutionGraph> = Lazy::new(|| {
    EvolutionGraph::from_data(&SPECIES).expect("data/species.json has an inconsistent evolution graph")
});

pub fn bundled_species() -> &'static SpeciesData {
    &SPECIES
}

pub fn evolution_graph() -> &'static EvolutionGraph {
    &EVOLUTIONS
}

pub fn species(id: u32) -> Option<&'static SpeciesInfo> {
    SPECIES.species.iter().find(|s| s.id == id)
}

pub fn starter_ids() -> &'static [u32] {
    &SPECIES.starters
}

pub fn primary_type_for(id: u32) -> &'static str {
    species(id).map(|s| s.primary_type.as_str()).unwrap_or("normal")
}

pub fn sprite_urls(id: u32) -> Sprites {
    Sprites {
        front: format!("{SPRITE_BASE}/{id}.png"),
        back: format!("{SPRITE_BASE}/back/{id}.png"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_graph_covers_three_lineages() {
        let graph = evolution_graph();
        assert_eq!(graph.len(), 6);
        let ivysaur = graph.next_stage(1).expect("bulbasaur evolves");
        assert_eq!(ivysaur.target, 2);
        assert_eq!(ivysaur.name, "Ivysaur");
        assert_eq!(ivysaur.stage, 1);
        assert_eq!(graph.next_stage(5).map(|n| n.name.as_str()), Some("Charizard"));
        assert!(graph.next_stage(9).is_none());
        assert!(graph.next_stage(25).is_none());
    }

    #[test]
    fn stage_skipping_edge_is_rejected() {
        let data: SpeciesData = serde_json::from_str(
            r#"{
                "species": [
                    {"id": 1, "name": "A", "type": "grass", "stage": 0},
                    {"id": 3, "name": "C", "type": "grass", "stage": 2}
                ],
                "starters": [1],
                "evolutions": [{"from": 1, "to": 3}]
            }"#,
        )
        .expect("valid json");
        assert!(EvolutionGraph::from_data(&data).is_err());
    }

    #[test]
    fn unknown_species_defaults_to_normal_type() {
        assert_eq!(primary_type_for(4), "fire");
        assert_eq!(primary_type_for(151), "normal");
    }

    #[test]
    fn sprite_urls_point_at_front_and_back() {
        let sprites = sprite_urls(7);
        assert!(sprites.front.ends_with("/pokemon/7.png"));
        assert!(sprites.back.ends_with("/pokemon/back/7.png"));
    }
}
