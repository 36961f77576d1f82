// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for remote LLM classification endpoints.

use async_trait::async_trait;

use crate::error::SavaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for an LLM provider that can serve several model endpoints.
///
/// Failures must be reported as [`SavaError::Provider`] with the matching
/// [`ProviderErrorKind`](crate::error::ProviderErrorKind) so the router can
/// choose between dropping, cooling down, or skipping the endpoint.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends one prompt to the endpoint named in `request.model`.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, SavaError>;
}
