//! QA tests for save/load and auto-save through the session API.
//!
//! Every test works inside its own temporary directory.
//! Run with: `cargo test -p rpg-core --test qa_persistence`

use rpg_core::persist::{self, SavedGame};
use rpg_core::progression::Stat;
use rpg_core::testing::ScriptedInput;
use rpg_core::{GameSession, PlayerClass, SessionConfig, SessionError};
use tempfile::TempDir;

fn config(name: &str) -> SessionConfig {
    SessionConfig::new(name, PlayerClass::Archer)
        .with_seed(11)
        .with_starting_location("Western Forest")
}

/// Explore once, handling whatever the outing turns up.
async fn explore_once(session: &mut GameSession) -> rpg_core::session::Outing {
    if session.player().stamina.current < 20 || session.player().character.hp.current < 40 {
        session.rest().expect("rest");
    }
    let outing = session.explore().await.expect("explore");
    if session.in_battle() {
        session.fight(&mut ScriptedInput::attacks()).expect("fight");
    }
    if !session.player().is_alive() {
        session.revive();
    }
    outing
}

// =============================================================================
// Save and load
// =============================================================================

#[tokio::test]
async fn test_session_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("aria.json");

    let mut session = GameSession::new(config("Aria")).expect("session");
    session.player_mut().gold = 345;
    session.player_mut().stat_points = 1;
    session.allocate_stat(Stat::Agility).expect("allocate");
    session.accept_quest("First Steps").expect("quest");
    session.rest().expect("rest");
    session.save(&path).await.expect("save");

    let loaded = GameSession::load(&path, config("Aria")).await.expect("load");
    let player = loaded.player();
    assert_eq!(player.name(), "Aria");
    assert_eq!(player.class, PlayerClass::Archer);
    assert_eq!(player.gold, 345);
    assert_eq!(player.character.agility, 13);
    assert_eq!(player.location, "Western Forest");
    assert_eq!(player.active_quests.len(), 1);
    assert_eq!(player.inventory.len(), session.player().inventory.len());
    assert_eq!(loaded.game_day(), 1);
    assert!(!loaded.in_battle());
}

#[tokio::test]
async fn test_metadata_matches_session() {
    let dir = TempDir::new().expect("temp dir");
    let path = persist::manual_save_path(dir.path(), "Sir Aria");

    let session = GameSession::new(config("Sir Aria")).expect("session");
    session.save(&path).await.expect("save");

    let metadata = SavedGame::peek_metadata(&path).await.expect("peek");
    assert_eq!(metadata.player_name, "Sir Aria");
    assert_eq!(metadata.class, "Archer");
    assert_eq!(metadata.level, 1);
    assert_eq!(metadata.location, "Western Forest");
    assert_eq!(metadata.gold, 100);

    let saves = persist::list_saves(dir.path()).await.expect("list");
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].path, path);
}

#[tokio::test]
async fn test_load_missing_file_fails() {
    let dir = TempDir::new().expect("temp dir");
    let result = GameSession::load(dir.path().join("nope.json"), config("Aria")).await;
    assert!(matches!(result, Err(SessionError::Persist(_))));
}

// =============================================================================
// Auto-save
// =============================================================================

#[tokio::test]
async fn test_auto_save_on_fifth_exploration() {
    let dir = TempDir::new().expect("temp dir");
    let mut session =
        GameSession::new(config("Aria").with_auto_save_dir(dir.path())).expect("session");

    for _ in 0..4 {
        let outing = explore_once(&mut session).await;
        assert!(outing.auto_saved.is_none());
    }
    let outing = explore_once(&mut session).await;

    let expected = persist::auto_save_path(dir.path(), "Aria");
    assert_eq!(outing.auto_saved.as_deref(), Some(expected.as_path()));
    assert!(expected.exists());
    assert_eq!(session.explorations(), 5);
}

#[tokio::test]
async fn test_auto_save_disabled_without_directory() {
    let mut session = GameSession::new(config("Aria")).expect("session");
    for _ in 0..5 {
        let outing = explore_once(&mut session).await;
        assert!(outing.auto_saved.is_none());
    }
}

#[tokio::test]
async fn test_failed_save_keeps_session_playable() {
    let dir = TempDir::new().expect("temp dir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").expect("write blocker");

    let mut session = GameSession::new(
        config("Aria")
            .with_auto_save_dir(&blocker)
            .with_autosave_interval(1),
    )
    .expect("session");

    let result = session.save(blocker.join("save.json")).await;
    assert!(matches!(result, Err(SessionError::Persist(_))));

    // Auto-save failures are logged, never raised.
    let outing = explore_once(&mut session).await;
    assert!(outing.auto_saved.is_none());
    assert_eq!(session.explorations(), 1);
    assert!(session.player().is_alive());
}
