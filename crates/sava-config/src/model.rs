// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level SAVA configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional and has working defaults
/// except `gemini.api_key`, which the CLI requires before calling the provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SavaConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Gemini provider settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Result store location.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cache expiry settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Endpoint rotation and backoff policy.
    #[serde(default)]
    pub router: RouterConfig,

    /// Batch prompt sizing.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "sava".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Gemini provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API root, without the `/v1beta` path.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Candidate models in priority order (cheapest/fastest first).
    #[serde(default = "default_gemini_models")]
    pub models: Vec<String>,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Sampling temperature; low values keep labels stable.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            models: default_gemini_models(),
            request_timeout_secs: default_request_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

impl GeminiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_models() -> Vec<String> {
    vec![
        "gemini-2.0-flash".to_string(),
        "gemini-2.0-flash-lite".to_string(),
        "gemini-1.5-flash".to_string(),
        "gemini-1.5-pro".to_string(),
    ]
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.2
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("sava").join("sentiment_cache.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("sentiment_cache.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Cache expiry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Lookups ignore records at least this many days old.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,

    /// Default threshold for the maintenance sweep.
    #[serde(default = "default_sweep_max_age_days")]
    pub sweep_max_age_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
            sweep_max_age_days: default_sweep_max_age_days(),
        }
    }
}

fn default_max_age_days() -> u32 {
    30
}

fn default_sweep_max_age_days() -> u32 {
    90
}

/// Endpoint rotation policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Pause after a quota/rate-limit failure before trying the next endpoint.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Upper bound on endpoints tried for a single call.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            max_candidates: default_max_candidates(),
        }
    }
}

impl RouterConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

fn default_cooldown_ms() -> u64 {
    2000
}

fn default_max_candidates() -> usize {
    4
}

/// Batch prompt sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Each item is cut to this many characters inside the batch prompt.
    #[serde(default = "default_max_item_chars")]
    pub max_item_chars: usize,

    /// Output tokens reserved regardless of batch size.
    #[serde(default = "default_base_output_tokens")]
    pub base_output_tokens: u32,

    /// Additional output tokens per uncached item.
    #[serde(default = "default_tokens_per_item")]
    pub tokens_per_item: u32,

    /// Hard ceiling on the output-token budget of one call.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_item_chars: default_max_item_chars(),
            base_output_tokens: default_base_output_tokens(),
            tokens_per_item: default_tokens_per_item(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl DispatchConfig {
    /// Output-token budget for a call covering `items` texts.
    pub fn output_budget(&self, items: usize) -> u32 {
        let items = u32::try_from(items).unwrap_or(u32::MAX);
        self.base_output_tokens
            .saturating_add(self.tokens_per_item.saturating_mul(items))
            .min(self.max_output_tokens)
    }
}

fn default_max_item_chars() -> usize {
    600
}

fn default_base_output_tokens() -> u32 {
    256
}

fn default_tokens_per_item() -> u32 {
    80
}

fn default_max_output_tokens() -> u32 {
    8192
}
