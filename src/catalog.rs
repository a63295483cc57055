//! Catalog lookup: the narrow "identity to display data" capability the
//! progression engine depends on, plus an in-memory implementation.
//!
//! Fetching from the network is left to whoever implements [`CatalogLookup`];
//! this module only knows how to decode the PokeAPI `pokemon/{id}` payload.

use crate::error::CatalogError;
use crate::model::Sprites;
use crate::species::{bundled_species, sprite_urls};
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Static display data for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: u32,
    pub name: String,
    pub primary_type: String,
    pub sprites: Sprites,
}

#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn resolve(&self, id: u32) -> Result<CatalogEntry, CatalogError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonTypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub type_ref: NamedRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PokemonSprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub back_default: Option<String>,
}

/// Subset of the PokeAPI `pokemon/{id}` response this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonApiResponse {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<PokemonTypeSlot>,
    #[serde(default)]
    pub sprites: PokemonSprites,
}

impl From<PokemonApiResponse> for CatalogEntry {
    fn from(response: PokemonApiResponse) -> Self {
        let primary_type = response
            .types
            .iter()
            .min_by_key(|slot| slot.slot)
            .map(|slot| slot.type_ref.name.to_ascii_lowercase())
            .unwrap_or_else(|| "normal".to_string());
        CatalogEntry {
            id: response.id,
            name: capitalize(&response.name),
            primary_type,
            sprites: Sprites {
                front: response.sprites.front_default.unwrap_or_default(),
                back: response.sprites.back_default.unwrap_or_default(),
            },
        }
    }
}

pub fn decode_api_response(raw: &str) -> Result<CatalogEntry, CatalogError> {
    let response: PokemonApiResponse =
        serde_json::from_str(raw).map_err(|e| CatalogError::Decode(e.to_string()))?;
    Ok(response.into())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Catalog backed by a map held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: BTreeMap<u32, CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.id, e)).collect(),
        }
    }

    /// Catalog of the bundled starter lineages.
    pub fn bundled() -> Self {
        Self::new(bundled_species().species.iter().map(|s| CatalogEntry {
            id: s.id,
            name: s.name.clone(),
            primary_type: s.primary_type.clone(),
            sprites: sprite_urls(s.id),
        }))
    }

    /// Loads a JSON array of PokeAPI `pokemon/{id}` responses.
    pub fn from_api_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file at {}", path.display()))?;
        let responses: Vec<PokemonApiResponse> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
        if responses.is_empty() {
            anyhow::bail!("catalog file {} has no entries", path.display());
        }
        Ok(Self::new(responses.into_iter().map(CatalogEntry::from)))
    }

    pub fn ids(&self) -> Vec<u32> {
        self.entries.keys().copied().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CatalogLookup for StaticCatalog {
    async fn resolve(&self, id: u32) -> Result<CatalogEntry, CatalogError> {
        self.entries.get(&id).cloned().ok_or(CatalogError::NotFound(id))
    }
}
