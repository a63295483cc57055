use async_trait::async_trait;
use pokemon_duel::catalog::{CatalogEntry, CatalogLookup, StaticCatalog};
use pokemon_duel::config::ProgressionRules;
use pokemon_duel::model::{PlayerPokemon, Sprites};
use pokemon_duel::progression::{level_for_experience, ProgressionEngine};
use pokemon_duel::species::sprite_urls;
use pokemon_duel::{CatalogError, EvolutionError};
use std::time::Duration;

struct FailingCatalog;

#[async_trait]
impl CatalogLookup for FailingCatalog {
    async fn resolve(&self, _id: u32) -> Result<CatalogEntry, CatalogError> {
        Err(CatalogError::Network("connection refused".to_string()))
    }
}

struct SlowCatalog {
    inner: StaticCatalog,
    delay: Duration,
}

#[async_trait]
impl CatalogLookup for SlowCatalog {
    async fn resolve(&self, id: u32) -> Result<CatalogEntry, CatalogError> {
        tokio::time::sleep(self.delay).await;
        self.inner.resolve(id).await
    }
}

fn charmander(level: u32, experience: u32) -> PlayerPokemon {
    PlayerPokemon {
        base_id: 4,
        current_id: 4,
        name: "Charmander".to_string(),
        primary_type: "fire".to_string(),
        level,
        experience,
        evolution_stage: 0,
        sprites: sprite_urls(4),
        current_hp: 100,
    }
}

#[test]
fn crossing_a_boundary_recomputes_level() {
    let rules = ProgressionRules::default();
    let engine = ProgressionEngine::new(StaticCatalog::bundled());
    let mut mon = charmander(level_for_experience(95, &rules), 95);
    assert_eq!(mon.level, 6);

    let result = engine.add_experience(10, &mut mon);
    assert_eq!(mon.experience, 105);
    assert_eq!(mon.level, 5 + 105 / 50);
    assert_eq!(result.old_level, 6);
    assert_eq!(result.new_level, 7);
    assert!(result.leveled_up);
    assert!(!result.can_evolve);
}

#[tokio::test]
async fn level_seven_cannot_evolve_but_level_eight_can() {
    let engine = ProgressionEngine::new(StaticCatalog::bundled());
    let mut young = charmander(7, 100);
    let err = engine.evolve(&mut young).await.expect_err("too young");
    assert!(matches!(err, EvolutionError::CannotEvolve));
    assert_eq!(young, charmander(7, 100));

    let mut ready = charmander(8, 150);
    engine.evolve(&mut ready).await.expect("evolves");
    assert_eq!(ready.current_id, 5);
    assert_eq!(ready.name, "Charmeleon");
    assert_eq!(ready.evolution_stage, 1);
    assert_eq!(ready.sprites, sprite_urls(5));
    assert_eq!(ready.base_id, 4);
    assert_eq!(ready.level, 8);
    assert_eq!(ready.experience, 150);
    assert_eq!(ready.primary_type, "fire");
}

#[tokio::test]
async fn failed_lookup_leaves_creature_unchanged() {
    let engine = ProgressionEngine::new(FailingCatalog);
    let mut mon = charmander(8, 150);
    let err = engine.evolve(&mut mon).await.expect_err("lookup fails");
    assert!(matches!(
        err,
        EvolutionError::FetchFailed(CatalogError::Network(_))
    ));
    assert_eq!(mon, charmander(8, 150));
}

#[tokio::test]
async fn slow_lookup_times_out_without_mutation() {
    let catalog = SlowCatalog {
        inner: StaticCatalog::bundled(),
        delay: Duration::from_millis(500),
    };
    let engine = ProgressionEngine::new(catalog);
    let mut mon = charmander(8, 150);
    let err = engine
        .evolve_within(&mut mon, Duration::from_millis(20))
        .await
        .expect_err("lookup is slower than the limit");
    assert!(matches!(err, EvolutionError::FetchFailed(CatalogError::TimedOut)));
    assert_eq!(mon, charmander(8, 150));
}

#[tokio::test]
async fn missing_catalog_entry_is_a_fetch_failure() {
    let engine = ProgressionEngine::new(StaticCatalog::new(Vec::new()));
    let mut mon = charmander(8, 150);
    let err = engine.evolve(&mut mon).await.expect_err("empty catalog");
    assert!(matches!(
        err,
        EvolutionError::FetchFailed(CatalogError::NotFound(5))
    ));
    assert_eq!(mon.sprites, sprite_urls(4));
    assert_eq!(mon.evolution_stage, 0);
}

#[tokio::test]
async fn final_stage_has_nowhere_to_go() {
    let engine = ProgressionEngine::new(StaticCatalog::bundled());
    let mut charizard = PlayerPokemon {
        current_id: 6,
        name: "Charizard".to_string(),
        evolution_stage: 2,
        sprites: Sprites::default(),
        ..charmander(30, 1250)
    };
    assert!(!engine.check_for_evolution(&charizard));
    let err = engine.evolve(&mut charizard).await.expect_err("final stage");
    assert!(matches!(err, EvolutionError::CannotEvolve));
}
