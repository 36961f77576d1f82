// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the SAVA classification subsystem.

use strum::{Display, EnumString};
use thiserror::Error;

/// How a provider endpoint failed. The router picks its backoff policy from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ProviderErrorKind {
    /// The model/endpoint does not exist or does not support the call.
    EndpointNotFound,
    /// Rate limited or quota exhausted; the endpoint may recover later.
    QuotaExceeded,
    /// The reply was withheld by a content filter.
    SafetyBlocked,
    /// Anything else (transport failure, 5xx, malformed body).
    Other,
}

/// The primary error type used across all SAVA crates.
#[derive(Debug, Error)]
pub enum SavaError {
    /// Configuration errors (invalid TOML, missing API key, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The result store could not be read or written.
    #[error("storage unavailable: {source}")]
    StorageUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A single provider endpoint failed.
    #[error("provider error ({kind}) on {endpoint}: {message}")]
    Provider {
        kind: ProviderErrorKind,
        endpoint: String,
        message: String,
    },

    /// Every candidate endpoint was tried and none produced content.
    #[error("all provider endpoints failed ({attempted} attempted)")]
    ProviderExhausted { attempted: usize },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SavaError {
    /// Shorthand for a provider failure of the given kind.
    pub fn provider(
        kind: ProviderErrorKind,
        endpoint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            kind,
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Returns the provider failure kind, if this is a provider error.
    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            Self::Provider { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Wraps any storage-layer error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StorageUnavailable {
            source: Box::new(err),
        }
    }
}
