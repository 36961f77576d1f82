// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry and backoff settings for endpoint rotation.

use std::time::Duration;

use sava_config::SavaConfig;

/// How the router walks its candidate list on a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterPolicy {
    /// Pause after a quota failure, taken only when another candidate remains.
    pub cooldown: Duration,
    /// Upper bound on endpoints tried per call.
    pub max_candidates: usize,
    /// Per-attempt deadline around the provider call.
    pub request_timeout: Duration,
}

impl RouterPolicy {
    pub fn from_config(config: &SavaConfig) -> Self {
        Self {
            cooldown: config.router.cooldown(),
            max_candidates: config.router.max_candidates,
            request_timeout: config.gemini.request_timeout(),
        }
    }
}

impl Default for RouterPolicy {
    fn default() -> Self {
        Self::from_config(&SavaConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_config_defaults() {
        let policy = RouterPolicy::default();
        assert_eq!(policy.cooldown, Duration::from_millis(2000));
        assert_eq!(policy.max_candidates, 4);
        assert_eq!(policy.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn from_config_reads_router_and_gemini_sections() {
        let mut config = SavaConfig::default();
        config.router.cooldown_ms = 50;
        config.router.max_candidates = 2;
        config.gemini.request_timeout_secs = 5;

        let policy = RouterPolicy::from_config(&config);
        assert_eq!(policy.cooldown, Duration::from_millis(50));
        assert_eq!(policy.max_candidates, 2);
        assert_eq!(policy.request_timeout, Duration::from_secs(5));
    }
}
