// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoint rotation with last-known-good ordering.
//!
//! Each call walks the candidate list front to back. The endpoint that last
//! answered sits at the front, endpoints reported missing are dropped for the
//! router's lifetime, and quota failures cost one cooldown before moving on.

use std::sync::Arc;

use sava_config::SavaConfig;
use sava_core::types::{ProviderRequest, ProviderResponse, Verdict};
use sava_core::{ProviderAdapter, ProviderErrorKind, SavaError};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::policy::RouterPolicy;

/// Every candidate was tried and none produced content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("all provider endpoints failed ({attempted} attempted)")]
pub struct RouteExhausted {
    /// Number of endpoints actually invoked.
    pub attempted: usize,
}

impl RouteExhausted {
    /// `n` degraded verdicts standing in for a reply that never came.
    pub fn fallback(&self, n: usize) -> Vec<Verdict> {
        vec![Verdict::saturated(); n]
    }
}

impl From<RouteExhausted> for SavaError {
    fn from(err: RouteExhausted) -> Self {
        SavaError::ProviderExhausted {
            attempted: err.attempted,
        }
    }
}

/// What to do with an endpoint after a failed attempt.
enum Disposition {
    Drop,
    CoolDown,
    Skip,
}

fn disposition(err: &SavaError) -> Disposition {
    match err.provider_kind() {
        Some(ProviderErrorKind::EndpointNotFound) => Disposition::Drop,
        Some(ProviderErrorKind::QuotaExceeded) => Disposition::CoolDown,
        _ => Disposition::Skip,
    }
}

/// Routes prompts across an ordered list of provider endpoints.
pub struct ProviderRouter {
    provider: Arc<dyn ProviderAdapter>,
    policy: RouterPolicy,
    endpoints: Mutex<Vec<String>>,
}

impl ProviderRouter {
    /// Creates a router over `endpoints`, tried in the given order.
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        endpoints: Vec<String>,
        policy: RouterPolicy,
    ) -> Self {
        Self {
            provider,
            policy,
            endpoints: Mutex::new(endpoints),
        }
    }

    /// Router over `gemini.models` with the policy from `[router]`.
    pub fn from_config(provider: Arc<dyn ProviderAdapter>, config: &SavaConfig) -> Self {
        Self::new(
            provider,
            config.gemini.models.clone(),
            RouterPolicy::from_config(config),
        )
    }

    pub fn policy(&self) -> &RouterPolicy {
        &self.policy
    }

    /// Current candidate ordering, last-known-good first.
    pub async fn endpoints(&self) -> Vec<String> {
        self.endpoints.lock().await.clone()
    }

    /// Sends `prompt` to the first endpoint that answers with text.
    ///
    /// Never surfaces an individual provider error; callers get either the
    /// reply or [`RouteExhausted`].
    pub async fn route(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderResponse, RouteExhausted> {
        // Snapshot so the lock is not held across provider calls.
        let candidates: Vec<String> = self
            .endpoints
            .lock()
            .await
            .iter()
            .take(self.policy.max_candidates)
            .cloned()
            .collect();

        let mut attempted = 0;
        for (i, endpoint) in candidates.iter().enumerate() {
            let has_next = i + 1 < candidates.len();
            attempted += 1;

            let request = ProviderRequest {
                model: endpoint.clone(),
                prompt: prompt.to_string(),
                max_output_tokens,
                temperature,
            };
            debug!(endpoint = %endpoint, attempt = attempted, "trying endpoint");

            let outcome =
                tokio::time::timeout(self.policy.request_timeout, self.provider.complete(request))
                    .await;

            let err = match outcome {
                Ok(Ok(response)) if !response.text.trim().is_empty() => {
                    self.promote(endpoint).await;
                    debug!(endpoint = %endpoint, chars = response.text.len(), "endpoint answered");
                    return Ok(response);
                }
                Ok(Ok(_)) => {
                    warn!(endpoint = %endpoint, "endpoint returned empty text, trying next");
                    continue;
                }
                Ok(Err(err)) => err,
                Err(_) => {
                    warn!(
                        endpoint = %endpoint,
                        timeout_secs = self.policy.request_timeout.as_secs_f64(),
                        "endpoint timed out, trying next"
                    );
                    continue;
                }
            };

            match disposition(&err) {
                Disposition::Drop => {
                    warn!(endpoint = %endpoint, error = %err, "endpoint not found, removing it");
                    self.remove(endpoint).await;
                }
                Disposition::CoolDown => {
                    warn!(
                        endpoint = %endpoint,
                        cooldown_ms = self.policy.cooldown.as_millis() as u64,
                        "endpoint quota exceeded"
                    );
                    if has_next {
                        tokio::time::sleep(self.policy.cooldown).await;
                    }
                }
                Disposition::Skip => {
                    warn!(endpoint = %endpoint, error = %err, "endpoint failed, trying next");
                }
            }
        }

        warn!(attempted, "all provider endpoints exhausted");
        Err(RouteExhausted { attempted })
    }

    /// Moves `endpoint` to the front of the list.
    async fn promote(&self, endpoint: &str) {
        let mut endpoints = self.endpoints.lock().await;
        if let Some(pos) = endpoints.iter().position(|e| e == endpoint)
            && pos > 0
        {
            let ep = endpoints.remove(pos);
            endpoints.insert(0, ep);
            info!(endpoint, "promoted endpoint to last-known-good");
        }
    }

    async fn remove(&self, endpoint: &str) {
        self.endpoints.lock().await.retain(|e| e != endpoint);
    }
}
