// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the SAVA news sentiment classifier.
//!
//! This crate provides the shared vocabulary of the workspace: the three-way
//! [`Sentiment`] label, cached [`ClassificationRecord`]s, content fingerprints,
//! the [`SavaError`] taxonomy, and the adapter traits implemented by the
//! result store and the LLM provider.

pub mod error;
pub mod fingerprint;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ProviderErrorKind, SavaError};
pub use fingerprint::fingerprint;
pub use types::{
    AdapterType, CacheStats, ClassificationRecord, HealthStatus, NewsItem, ProviderRequest,
    ProviderResponse, Sentiment, Verdict,
};

pub use traits::{PluginAdapter, ProviderAdapter, ResultStore};
