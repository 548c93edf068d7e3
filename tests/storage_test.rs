use std::sync::Arc;

use menu_board::storage::{KeyValueStore, SqliteStore};
use menu_board::theme::{Theme, ThemePreference};

#[tokio::test]
async fn sqlite_store_get_set_remove() {
    let store = SqliteStore::open("sqlite::memory:").await.unwrap();
    assert_eq!(store.get("menuDataCache.v1").await.unwrap(), None);

    store.set("menuDataCache.v1", "first").await.unwrap();
    store.set("menuDataCache.v1", "second").await.unwrap();
    assert_eq!(
        store.get("menuDataCache.v1").await.unwrap().as_deref(),
        Some("second")
    );

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);

    store.remove("menuDataCache.v1").await.unwrap();
    assert_eq!(store.get("menuDataCache.v1").await.unwrap(), None);
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let td = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}/nested/menu.db", td.path().display());

    {
        let store = SqliteStore::open(&url).await.unwrap();
        let theme = ThemePreference::new(Arc::new(store.clone()), "theme", Theme::Dark);
        assert_eq!(theme.toggle().await, Theme::Light);
        store.pool().close().await;
    }

    let store = SqliteStore::open(&url).await.unwrap();
    assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("light"));
    let theme = ThemePreference::new(Arc::new(store), "theme", Theme::Dark);
    assert_eq!(theme.current().await, Theme::Light);
}
