// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the classification stack with a mock provider and
//! a temp SQLite database. Provides `classify()` to drive the full pipeline
//! (cache -> router -> parser -> write-through) in tests.

use std::sync::Arc;
use std::time::Duration;

use sava_config::model::{SavaConfig, StorageConfig};
use sava_core::{ClassificationRecord, ResultStore, SavaError};
use sava_dispatch::BatchDispatcher;
use sava_router::{ProviderRouter, RouterPolicy};
use sava_storage::SqliteResultStore;

use crate::mock_provider::{MockOutcome, MockProvider};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    provider: MockProvider,
    endpoints: Vec<String>,
    cooldown: Duration,
    request_timeout: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            provider: MockProvider::new(),
            endpoints: vec!["model-a".to_string(), "model-b".to_string()],
            cooldown: Duration::ZERO,
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Replies served to whichever endpoint is called, in order.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.provider = MockProvider::with_responses(responses);
        self
    }

    /// Script successive outcomes for one endpoint.
    pub fn with_script(mut self, endpoint: &str, outcomes: Vec<MockOutcome>) -> Self {
        self.provider = self.provider.with_script(endpoint, outcomes);
        self
    }

    /// Outcome once scripts and queued responses run out.
    pub fn with_default(mut self, outcome: MockOutcome) -> Self {
        self.provider = self.provider.with_default(outcome);
        self
    }

    /// Router candidate list, in priority order.
    pub fn with_endpoints(mut self, endpoints: &[&str]) -> Self {
        self.endpoints = endpoints.iter().map(|e| (*e).to_string()).collect();
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, SavaError> {
        let temp_dir = tempfile::TempDir::new().map_err(SavaError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = SavaConfig::default();
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        config.gemini.models = self.endpoints.clone();
        config.router.cooldown_ms = self.cooldown.as_millis() as u64;

        let store = Arc::new(SqliteResultStore::new(config.storage.clone()));
        store.initialize().await?;

        let mock_provider = Arc::new(self.provider);
        let policy = RouterPolicy {
            cooldown: self.cooldown,
            max_candidates: config.router.max_candidates,
            request_timeout: self.request_timeout,
        };
        let router = Arc::new(ProviderRouter::new(
            mock_provider.clone(),
            self.endpoints,
            policy,
        ));
        let dispatcher = BatchDispatcher::from_config(store.clone(), router.clone(), &config);

        Ok(TestHarness {
            mock_provider,
            store,
            router,
            dispatcher,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock provider and temp storage.
pub struct TestHarness {
    /// The mock LLM provider.
    pub mock_provider: Arc<MockProvider>,
    /// SQLite result store (temp DB, cleaned up on drop).
    pub store: Arc<SqliteResultStore>,
    /// Router over the mock provider.
    pub router: Arc<ProviderRouter>,
    /// Dispatcher wired to `store` and `router`.
    pub dispatcher: BatchDispatcher,
    /// Configuration the stack was built from.
    pub config: SavaConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Classify `items` through the full pipeline.
    pub async fn classify(&self, items: &[&str]) -> Result<Vec<ClassificationRecord>, SavaError> {
        let owned: Vec<String> = items.iter().map(|s| (*s).to_string()).collect();
        self.dispatcher.classify(&owned).await
    }
}
