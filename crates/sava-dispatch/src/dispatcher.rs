// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The batch classification pipeline.

use std::sync::Arc;

use sava_config::SavaConfig;
use sava_config::model::DispatchConfig;
use sava_core::types::truncate_chars;
use sava_core::{ClassificationRecord, HealthStatus, ResultStore, SavaError, Verdict};
use sava_parser::{batch_prompt, parse_batch, parse_single, single_prompt};
use sava_router::ProviderRouter;
use tracing::{debug, info, warn};

/// Classifies batches of texts through the cache and the provider router.
///
/// `Send + Sync`; share it behind an `Arc`.
pub struct BatchDispatcher {
    store: Arc<dyn ResultStore>,
    router: Arc<ProviderRouter>,
    config: DispatchConfig,
    max_age_days: u32,
    temperature: f32,
}

impl BatchDispatcher {
    pub fn new(
        store: Arc<dyn ResultStore>,
        router: Arc<ProviderRouter>,
        config: DispatchConfig,
        max_age_days: u32,
        temperature: f32,
    ) -> Self {
        Self {
            store,
            router,
            config,
            max_age_days,
            temperature,
        }
    }

    /// Dispatcher using the `[dispatch]`, `[cache]` and `[gemini]` settings.
    pub fn from_config(
        store: Arc<dyn ResultStore>,
        router: Arc<ProviderRouter>,
        config: &SavaConfig,
    ) -> Self {
        Self::new(
            store,
            router,
            config.dispatch.clone(),
            config.cache.max_age_days,
            config.gemini.temperature,
        )
    }

    /// Classify `items`, returning one record per item in input order.
    ///
    /// Cached items are served without a provider call. All misses share a
    /// single routed call. If every endpoint fails, misses come back as
    /// `Neutral` / "system saturated" and nothing is cached for them.
    pub async fn classify(&self, items: &[String]) -> Result<Vec<ClassificationRecord>, SavaError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_store_healthy().await?;

        let mut slots: Vec<Option<ClassificationRecord>> = vec![None; items.len()];
        let mut misses: Vec<(usize, &str)> = Vec::new();
        for (idx, text) in items.iter().enumerate() {
            match self.lookup(text).await {
                Some(record) => slots[idx] = Some(record),
                None => misses.push((idx, text.as_str())),
            }
        }

        let hits = items.len() - misses.len();
        if misses.is_empty() {
            info!(items = items.len(), "batch fully served from cache");
            return collect(slots);
        }

        let texts: Vec<String> = misses
            .iter()
            .map(|(_, text)| truncate_chars(text, self.config.max_item_chars))
            .collect();
        let prompt = batch_prompt(&texts);
        let budget = self.config.output_budget(misses.len());
        debug!(misses = misses.len(), max_output_tokens = budget, "routing batch prompt");

        let (verdicts, cacheable) = match self.router.route(&prompt, budget, self.temperature).await {
            Ok(response) => (parse_batch(&response.text, misses.len()), true),
            Err(exhausted) => {
                warn!(
                    attempted = exhausted.attempted,
                    misses = misses.len(),
                    "no endpoint answered, returning saturated verdicts"
                );
                (exhausted.fallback(misses.len()), false)
            }
        };

        let classified = misses.len();
        for ((idx, text), verdict) in misses.into_iter().zip(verdicts) {
            slots[idx] = Some(self.record(text, verdict, cacheable).await);
        }

        info!(items = items.len(), hits, classified, "batch classified");
        collect(slots)
    }

    /// Classify one text with the single-item prompt.
    pub async fn classify_one(&self, text: &str) -> Result<ClassificationRecord, SavaError> {
        self.ensure_store_healthy().await?;

        if let Some(record) = self.lookup(text).await {
            return Ok(record);
        }

        let prompt = single_prompt(&truncate_chars(text, self.config.max_item_chars));
        let budget = self.config.output_budget(1);
        let record = match self.router.route(&prompt, budget, self.temperature).await {
            Ok(response) => self.record(text, parse_single(&response.text), true).await,
            Err(exhausted) => {
                warn!(attempted = exhausted.attempted, "no endpoint answered single item");
                let verdict = exhausted.fallback(1).pop().unwrap_or_else(Verdict::saturated);
                self.record(text, verdict, false).await
            }
        };
        Ok(record)
    }

    async fn ensure_store_healthy(&self) -> Result<(), SavaError> {
        let status = self.store.health_check().await.map_err(|err| match err {
            err @ SavaError::StorageUnavailable { .. } => err,
            other => SavaError::storage(other),
        })?;
        match status {
            HealthStatus::Healthy => Ok(()),
            HealthStatus::Degraded(reason) => {
                warn!(reason = %reason, "result store degraded");
                Ok(())
            }
            HealthStatus::Unhealthy(reason) => Err(SavaError::storage(std::io::Error::other(reason))),
        }
    }

    /// Cache lookup that treats a failed read as a miss.
    async fn lookup(&self, text: &str) -> Option<ClassificationRecord> {
        match self.store.get(text, self.max_age_days).await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Write-through; a failed write still returns the verdict.
    async fn record(&self, text: &str, verdict: Verdict, cacheable: bool) -> ClassificationRecord {
        if !cacheable {
            return ClassificationRecord::transient(text, verdict);
        }
        match self.store.put(text, verdict.label, &verdict.explanation).await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "cache write failed, verdict not persisted");
                ClassificationRecord::transient(text, verdict)
            }
        }
    }
}

fn collect(slots: Vec<Option<ClassificationRecord>>) -> Result<Vec<ClassificationRecord>, SavaError> {
    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            slot.ok_or_else(|| SavaError::Internal(format!("item {idx} was never classified")))
        })
        .collect()
}
