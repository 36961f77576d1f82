// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted outcomes per
//! endpoint and records every request it receives, so router and dispatcher
//! tests can assert on exactly which endpoints were called and with what.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sava_core::traits::adapter::PluginAdapter;
use sava_core::traits::provider::ProviderAdapter;
use sava_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse};
use sava_core::{ProviderErrorKind, SavaError};

/// What one call to an endpoint produces.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// Successful reply with this text.
    Reply(String),
    /// Provider failure of this kind.
    Fail(ProviderErrorKind),
    /// Successful call with no text.
    Empty,
    /// Never answers; the router's timeout has to cut it off.
    Hang,
}

impl MockOutcome {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply(text.into())
    }
}

/// A mock LLM provider with scripted outcomes.
///
/// Each call resolves, in order, from the endpoint's own script, then the
/// shared FIFO queue, then the default outcome (`"mock response"`).
pub struct MockProvider {
    scripts: Mutex<HashMap<String, VecDeque<MockOutcome>>>,
    responses: Mutex<VecDeque<MockOutcome>>,
    default: MockOutcome,
    calls: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with nothing scripted.
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            responses: Mutex::new(VecDeque::new()),
            default: MockOutcome::reply("mock response"),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock provider pre-loaded with replies for whichever endpoint asks.
    pub fn with_responses(responses: Vec<String>) -> Self {
        let mut provider = Self::new();
        *provider.responses.get_mut() = responses.into_iter().map(MockOutcome::Reply).collect();
        provider
    }

    /// Script the outcomes of successive calls to `endpoint`.
    pub fn with_script(mut self, endpoint: &str, outcomes: Vec<MockOutcome>) -> Self {
        self.scripts
            .get_mut()
            .entry(endpoint.to_string())
            .or_default()
            .extend(outcomes);
        self
    }

    /// Outcome used once scripts and the shared queue are drained.
    pub fn with_default(mut self, outcome: MockOutcome) -> Self {
        self.default = outcome;
        self
    }

    /// Add a reply to the end of the shared queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(MockOutcome::Reply(text.into()));
    }

    /// Every request received so far, in call order.
    pub async fn calls(&self) -> Vec<ProviderRequest> {
        self.calls.lock().await.clone()
    }

    /// Endpoints called so far, in call order.
    pub async fn endpoints_called(&self) -> Vec<String> {
        self.calls.lock().await.iter().map(|r| r.model.clone()).collect()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn next_outcome(&self, endpoint: &str) -> MockOutcome {
        if let Some(outcome) = self
            .scripts
            .lock()
            .await
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front)
        {
            return outcome;
        }
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, SavaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SavaError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, SavaError> {
        self.calls.lock().await.push(request.clone());

        match self.next_outcome(&request.model).await {
            MockOutcome::Reply(text) => Ok(ProviderResponse {
                text,
                model: request.model,
            }),
            MockOutcome::Empty => Ok(ProviderResponse {
                text: String::new(),
                model: request.model,
            }),
            MockOutcome::Fail(kind) => Err(SavaError::provider(
                kind,
                &request.model,
                format!("scripted {kind} failure"),
            )),
            MockOutcome::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(SavaError::Internal("mock hang elapsed".into()))
            }
        }
    }
}
