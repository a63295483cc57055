use pokemon_duel::catalog::StaticCatalog;
use pokemon_duel::config::GameConfig;
use pokemon_duel::persistence::{FileProgressRepository, InMemoryProgressRepo, ProgressRepository};
use pokemon_duel::{load_record, new_game, play};

#[test]
fn new_game_rejects_non_starters() {
    let repo = InMemoryProgressRepo::new();
    assert!(new_game(&repo, 2).is_err());
    assert!(!repo.has_existing_game());

    let record = new_game(&repo, 1).expect("bulbasaur is a starter");
    assert_eq!(record.name, "Bulbasaur");
    assert_eq!(record.level, 5);
    assert_eq!(record.experience, 0);
    assert_eq!(load_record(&repo).expect("saved"), record);
}

#[test]
fn status_without_a_game_is_an_error() {
    let repo = InMemoryProgressRepo::new();
    let err = load_record(&repo).expect_err("no game yet");
    assert!(err.to_string().contains("No saved game"));
}

#[tokio::test]
async fn play_session_updates_and_persists_the_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = FileProgressRepository::new(dir.path().join("progress.json"));
    new_game(&repo, 7).expect("new game");

    let config = GameConfig::default();
    let record = play(&repo, StaticCatalog::bundled(), &config, 5, 31)
        .await
        .expect("play");
    assert_eq!(record.total_battles, 5);
    assert!(record.victories <= record.total_battles);
    assert_eq!(record.experience, record.victories * 50);
    assert_eq!(record.level, 5 + record.experience / 50);
    assert_eq!(load_record(&repo).expect("persisted"), record);
}

#[tokio::test]
async fn same_seed_replays_the_same_session() {
    let config = GameConfig::default();
    let first = InMemoryProgressRepo::new();
    let second = InMemoryProgressRepo::new();
    new_game(&first, 4).expect("new game");
    second
        .save(&load_record(&first).expect("saved"))
        .expect("copy");

    let a = play(&first, StaticCatalog::bundled(), &config, 4, 77)
        .await
        .expect("play");
    let b = play(&second, StaticCatalog::bundled(), &config, 4, 77)
        .await
        .expect("play");
    assert_eq!(a.level, b.level);
    assert_eq!(a.experience, b.experience);
    assert_eq!(a.victories, b.victories);
    assert_eq!(a.current_id, b.current_id);
}
