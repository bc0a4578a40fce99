use hooks_core::model::{
    Difficulty, ProgressMap, ProgressUpdate, Settings, SettingsUpdate, Theme, TopicId,
};
use hooks_core::time::fixed_now;
use storage::mapping::PROGRESS_KEY;
use storage::repository::{ProgressRepository, SettingsRepository, Storage, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn topic(id: &str) -> TopicId {
    TopicId::new(id).unwrap()
}

#[tokio::test]
async fn sqlite_roundtrips_progress_map() {
    let repo = connect("memdb_progress_roundtrip").await;
    assert!(repo.load_progress().await.unwrap().is_none());

    let mut map = ProgressMap::new();
    map.apply(
        &topic("use-state"),
        &ProgressUpdate::new()
            .completed(true)
            .time_spent(300)
            .visited_at(fixed_now())
            .notes("state updates are batched"),
    );
    map.apply(&topic("use-context"), &ProgressUpdate::new().bookmarked(true));
    repo.save_progress(&map).await.unwrap();

    // Second save overwrites the single row.
    map.apply(&topic("use-state"), &ProgressUpdate::new().time_spent(360));
    repo.save_progress(&map).await.unwrap();

    let loaded = repo.load_progress().await.unwrap().expect("progress saved");
    assert_eq!(loaded, map);
    assert_eq!(loaded.total_time_spent(), 360);
}

#[tokio::test]
async fn sqlite_clear_progress_keeps_settings() {
    let repo = connect("memdb_clear_progress").await;
    let settings = Settings::default().merged(
        &SettingsUpdate::new()
            .theme(Theme::Dark)
            .difficulty(Difficulty::Beginner),
    );
    repo.save_settings(&settings).await.unwrap();

    let mut map = ProgressMap::new();
    map.apply(&topic("use-ref"), &ProgressUpdate::new().completed(true));
    repo.save_progress(&map).await.unwrap();

    repo.clear_progress().await.unwrap();
    repo.clear_progress().await.unwrap();

    assert!(repo.load_progress().await.unwrap().is_none());
    assert_eq!(repo.load_settings().await.unwrap(), Some(settings));
}

#[tokio::test]
async fn sqlite_reports_corrupt_blob() {
    let repo = connect("memdb_corrupt_blob").await;
    sqlx::query("INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)")
        .bind(PROGRESS_KEY)
        .bind("{\"use-state\": 42")
        .bind(fixed_now())
        .execute(repo.pool())
        .await
        .unwrap();

    assert!(matches!(
        repo.load_progress().await,
        Err(StorageError::Serialization(_))
    ));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_wires_both_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage_wiring?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .settings
        .save_settings(&Settings::default())
        .await
        .unwrap();
    assert_eq!(
        storage.settings.load_settings().await.unwrap(),
        Some(Settings::default())
    );
    assert!(storage.progress.load_progress().await.unwrap().is_none());
}
