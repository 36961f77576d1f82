// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ResultStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use sava_config::model::StorageConfig;
use sava_core::{
    AdapterType, CacheStats, ClassificationRecord, HealthStatus, PluginAdapter, ResultStore,
    SavaError, Sentiment,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed result store.
///
/// Wraps a [`Database`] handle and delegates to [`queries::cache`]. The
/// database is opened lazily by [`ResultStore::initialize`].
pub struct SqliteResultStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteResultStore {
    /// Create a new store for the configured path. Nothing is opened yet.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, SavaError> {
        self.db.get().ok_or_else(|| SavaError::StorageUnavailable {
            source: "store not initialized -- call initialize() first".into(),
        })
    }

    /// Like [`ResultStore::put`] but with an explicit creation time.
    ///
    /// Lets maintenance tooling and tests seed aged records.
    pub async fn put_at(
        &self,
        text: &str,
        label: Sentiment,
        explanation: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ClassificationRecord, SavaError> {
        queries::cache::put_at(self.db()?, text, label, explanation, created_at).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteResultStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SavaError> {
        self.db()?.ping().await?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SavaError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ResultStore for SqliteResultStore {
    async fn initialize(&self) -> Result<(), SavaError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| SavaError::StorageUnavailable {
                source: "store already initialized".into(),
            })?;
        info!(path = %self.config.database_path, "result store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), SavaError> {
        self.db()?.checkpoint().await
    }

    async fn get(
        &self,
        text: &str,
        max_age_days: u32,
    ) -> Result<Option<ClassificationRecord>, SavaError> {
        queries::cache::get(self.db()?, text, max_age_days).await
    }

    async fn put(
        &self,
        text: &str,
        label: Sentiment,
        explanation: &str,
    ) -> Result<ClassificationRecord, SavaError> {
        queries::cache::put(self.db()?, text, label, explanation).await
    }

    async fn stats(&self) -> Result<CacheStats, SavaError> {
        queries::cache::stats(self.db()?).await
    }

    async fn sweep(&self, max_age_days: u32) -> Result<u64, SavaError> {
        let removed = queries::cache::sweep(self.db()?, max_age_days).await?;
        info!(removed, max_age_days, "swept expired cache entries");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteResultStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteResultStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteResultStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_before_initialize_are_storage_errors() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteResultStore::new(make_config(db_path.to_str().unwrap()));

        assert!(matches!(
            store.health_check().await,
            Err(SavaError::StorageUnavailable { .. })
        ));
        assert!(matches!(
            store.get("x", 30).await,
            Err(SavaError::StorageUnavailable { .. })
        ));
        // Shutdown of a never-opened store is a no-op.
        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn full_cache_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteResultStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);

        store
            .put("Heladas afectan el café", Sentiment::Negative, "pérdidas")
            .await
            .unwrap();
        store
            .put_at(
                "Old report",
                Sentiment::Positive,
                "x",
                Utc::now() - chrono::TimeDelta::days(200),
            )
            .await
            .unwrap();

        let hit = store.get("heladas afectan el café", 30).await.unwrap().unwrap();
        assert_eq!(hit.label, Sentiment::Negative);
        assert_eq!(hit.headline, "Heladas afectan el café");

        assert_eq!(store.sweep(90).await.unwrap(), 1);
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_hits, 2);

        store.close().await.unwrap();
        store.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_access_keeps_hit_counts_exact() {
        use std::collections::BTreeSet;
        use std::sync::Arc;
        use tokio::task::JoinSet;

        const READERS: u32 = 32;
        const WRITERS: u32 = 8;

        let dir = tempdir().unwrap();
        let db_path = dir.path().join("concurrent.db");
        let store = Arc::new(SqliteResultStore::new(make_config(db_path.to_str().unwrap())));
        store.initialize().await.unwrap();
        store
            .put("Sequía en el norte del Valle", Sentiment::Negative, "sequía")
            .await
            .unwrap();

        let mut reads = JoinSet::new();
        for _ in 0..READERS {
            let store = store.clone();
            reads.spawn(async move { store.get("sequía en el norte del valle", 30).await });
        }
        let mut writes = JoinSet::new();
        for i in 0..WRITERS {
            let store = store.clone();
            writes.spawn(async move {
                store
                    .put(&format!("Cosecha récord número {i}"), Sentiment::Positive, "cosecha")
                    .await
                    .map(|_| 0)
            });
        }
        let sweeper = store.clone();
        writes.spawn(async move { sweeper.sweep(90).await });

        let mut seen = BTreeSet::new();
        while let Some(joined) = reads.join_next().await {
            let record = joined.unwrap().unwrap().expect("fresh record is a hit");
            assert_eq!(record.label, Sentiment::Negative);
            assert!(seen.insert(record.hit_count), "hit_count {} seen twice", record.hit_count);
        }
        let mut removed = 0;
        while let Some(joined) = writes.join_next().await {
            removed += joined.unwrap().unwrap();
        }

        assert_eq!(removed, 0);
        assert_eq!(seen, (2..=READERS + 1).collect::<BTreeSet<_>>());

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_entries, u64::from(WRITERS) + 1);
        assert_eq!(stats.total_hits, u64::from(READERS + 1 + WRITERS));
        assert_eq!(stats.distribution.get(&Sentiment::Negative), Some(&1));
        assert_eq!(stats.distribution.get(&Sentiment::Positive), Some(&u64::from(WRITERS)));
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("persist.db");
        let path = db_path.to_str().unwrap();
        {
            let store = SqliteResultStore::new(make_config(path));
            store.initialize().await.unwrap();
            store.put("persisted", Sentiment::Positive, "ok").await.unwrap();
            store.close().await.unwrap();
        }
        let store = SqliteResultStore::new(make_config(path));
        store.initialize().await.unwrap();
        assert!(store.get("persisted", 30).await.unwrap().is_some());
    }
}
