// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result store trait for the classification cache.

use async_trait::async_trait;

use crate::error::SavaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CacheStats, ClassificationRecord, Sentiment};

/// Persistent fingerprint-keyed cache of classification results.
///
/// Implementations must make `get`'s hit-count increment atomic with respect
/// to concurrent `put` and `sweep` calls.
#[async_trait]
pub trait ResultStore: PluginAdapter {
    /// Opens the backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), SavaError>;

    /// Flushes pending writes and releases the backend.
    async fn close(&self) -> Result<(), SavaError>;

    /// Looks up `text`; records aged `max_age_days` or more are treated as absent.
    ///
    /// A hit increments the stored hit count and returns the updated record.
    async fn get(
        &self,
        text: &str,
        max_age_days: u32,
    ) -> Result<Option<ClassificationRecord>, SavaError>;

    /// Inserts or replaces the record for `text` with a fresh timestamp and a hit count of 1.
    async fn put(
        &self,
        text: &str,
        label: Sentiment,
        explanation: &str,
    ) -> Result<ClassificationRecord, SavaError>;

    /// Aggregate counters; zeros on an empty store.
    async fn stats(&self) -> Result<CacheStats, SavaError>;

    /// Deletes every record aged `max_age_days` or more. Returns the number removed.
    async fn sweep(&self, max_age_days: u32) -> Result<u64, SavaError>;
}
