// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory result store with switchable failures.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;

use sava_core::types::{MAX_HEADLINE_CHARS, truncate_chars};
use sava_core::{
    AdapterType, CacheStats, ClassificationRecord, HealthStatus, PluginAdapter, ResultStore,
    SavaError, Sentiment, Verdict, fingerprint,
};

/// A `ResultStore` held in a map, for exercising the dispatcher's failure paths.
#[derive(Default)]
pub struct MockStore {
    records: Mutex<HashMap<String, ClassificationRecord>>,
    fail_health: AtomicBool,
    fail_get: AtomicBool,
    fail_put: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `health_check` report the store as unreachable.
    pub fn set_fail_health(&self, fail: bool) {
        self.fail_health.store(fail, Ordering::SeqCst);
    }

    /// Make every `get` return an error.
    pub fn set_fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Make every `put` return an error.
    pub fn set_fail_put(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn failure(what: &str) -> SavaError {
        SavaError::storage(std::io::Error::other(format!("mock store {what} failure")))
    }
}

#[async_trait]
impl PluginAdapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SavaError> {
        if self.fail_health.load(Ordering::SeqCst) {
            return Err(Self::failure("health"));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SavaError> {
        Ok(())
    }
}

#[async_trait]
impl ResultStore for MockStore {
    async fn initialize(&self) -> Result<(), SavaError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), SavaError> {
        Ok(())
    }

    async fn get(
        &self,
        text: &str,
        max_age_days: u32,
    ) -> Result<Option<ClassificationRecord>, SavaError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(Self::failure("get"));
        }
        let cutoff = Utc::now() - ChronoDuration::days(i64::from(max_age_days));
        let mut records = self.records.lock().await;
        Ok(records
            .get_mut(&fingerprint(text))
            .filter(|record| record.created_at > cutoff)
            .map(|record| {
                record.hit_count += 1;
                ClassificationRecord {
                    from_cache: true,
                    ..record.clone()
                }
            }))
    }

    async fn put(
        &self,
        text: &str,
        label: Sentiment,
        explanation: &str,
    ) -> Result<ClassificationRecord, SavaError> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(Self::failure("put"));
        }
        let verdict = Verdict::new(label, explanation);
        let record = ClassificationRecord {
            fingerprint: fingerprint(text),
            label: verdict.label,
            explanation: verdict.explanation,
            headline: truncate_chars(text.trim(), MAX_HEADLINE_CHARS),
            created_at: Utc::now(),
            hit_count: 1,
            from_cache: false,
        };
        self.records
            .lock()
            .await
            .insert(record.fingerprint.clone(), record.clone());
        Ok(record)
    }

    async fn stats(&self) -> Result<CacheStats, SavaError> {
        let records = self.records.lock().await;
        let mut distribution = BTreeMap::new();
        let mut hits = 0u64;
        for record in records.values() {
            *distribution.entry(record.label).or_insert(0) += 1;
            hits += u64::from(record.hit_count);
        }
        Ok(CacheStats::new(records.len() as u64, hits, distribution))
    }

    async fn sweep(&self, max_age_days: u32) -> Result<u64, SavaError> {
        let cutoff = Utc::now() - ChronoDuration::days(i64::from(max_age_days));
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| record.created_at > cutoff);
        Ok((before - records.len()) as u64)
    }
}
