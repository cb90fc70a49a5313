use tempfile::TempDir;

use french_trainer_backend::db::{PhraseStatus, PhraseStore, StoreConfig};
use french_trainer_backend::services::phrase_lifecycle;
use french_trainer_backend::services::phrase_selector::{select_next, SelectionMode};

fn sqlite_config(dir: &TempDir) -> StoreConfig {
    StoreConfig {
        url: format!("sqlite:{}", dir.path().join("phrases.db").display()),
        key: None,
        table: "phrases".to_string(),
    }
}

#[tokio::test]
async fn test_file_store_survives_reconnect() {
    let dir = TempDir::new().unwrap();
    let config = sqlite_config(&dir);

    {
        let store = PhraseStore::connect(&config).await.unwrap();
        assert_eq!(store.backend(), "sqlite");
        phrase_lifecycle::add_phrase(&store, "Je viens de").await.unwrap();
        phrase_lifecycle::add_phrase(&store, "Il faut que").await.unwrap();
        phrase_lifecycle::mark_done(&store, 1).await.unwrap();
        select_next(&store, SelectionMode::Ordered).await.unwrap();
    }

    let store = PhraseStore::connect(&config).await.unwrap();
    let done = store.get(1).await.unwrap().unwrap();
    assert_eq!(done.status, PhraseStatus::Done);

    let open = store.get(2).await.unwrap().unwrap();
    assert_eq!(open.status, PhraseStatus::New);
    assert_eq!(open.attempts, 1);
    assert!(open.last_used.is_some());
}

#[tokio::test]
async fn test_ids_are_not_reused() {
    let dir = TempDir::new().unwrap();
    let store = PhraseStore::connect(&sqlite_config(&dir)).await.unwrap();

    let first = phrase_lifecycle::add_phrase(&store, "avoir beau").await.unwrap();
    let second = phrase_lifecycle::add_phrase(&store, "avoir beau").await.unwrap();
    assert!(second.id > first.id);
}
