// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Covers the semantic constraints serde attributes cannot express: non-empty
//! model lists, sane token budgets, and value ranges.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::SavaConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for cache ages, about a century.
pub const MAX_CACHE_AGE_DAYS: u32 = 36_500;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SavaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.agent.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "agent.log_level `{}` is not one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let base_url = config.gemini.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "gemini.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if config.gemini.models.is_empty() {
        fail("gemini.models must list at least one model".to_string());
    }

    let mut seen = HashSet::new();
    for (i, model) in config.gemini.models.iter().enumerate() {
        if model.trim().is_empty() {
            fail(format!("gemini.models[{i}] must not be empty"));
        } else if !seen.insert(model.trim()) {
            fail(format!("duplicate model `{model}` in gemini.models"));
        }
    }

    if config.gemini.request_timeout_secs == 0 {
        fail("gemini.request_timeout_secs must be at least 1".to_string());
    }

    let temperature = config.gemini.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        fail(format!(
            "gemini.temperature must be between 0.0 and 2.0, got {temperature}"
        ));
    }

    for (key, days) in [
        ("cache.max_age_days", config.cache.max_age_days),
        ("cache.sweep_max_age_days", config.cache.sweep_max_age_days),
    ] {
        if days > MAX_CACHE_AGE_DAYS {
            fail(format!("{key} ({days}) must not exceed {MAX_CACHE_AGE_DAYS} days"));
        }
    }

    if config.cache.sweep_max_age_days < config.cache.max_age_days {
        fail(format!(
            "cache.sweep_max_age_days ({}) must not be lower than cache.max_age_days ({})",
            config.cache.sweep_max_age_days, config.cache.max_age_days
        ));
    }

    if config.router.max_candidates == 0 {
        fail("router.max_candidates must be at least 1".to_string());
    }

    if config.dispatch.max_item_chars == 0 {
        fail("dispatch.max_item_chars must be at least 1".to_string());
    }

    if config.dispatch.max_output_tokens < config.dispatch.base_output_tokens {
        fail(format!(
            "dispatch.max_output_tokens ({}) must be at least dispatch.base_output_tokens ({})",
            config.dispatch.max_output_tokens, config.dispatch.base_output_tokens
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &SavaConfig) -> Vec<String> {
        match validate_config(config) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn default_config_validates() {
        let config = SavaConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = SavaConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn empty_model_list_fails_validation() {
        let mut config = SavaConfig::default();
        config.gemini.models.clear();
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("at least one model")), "{msgs:?}");
    }

    #[test]
    fn duplicate_and_blank_models_fail_validation() {
        let mut config = SavaConfig::default();
        config.gemini.models = vec![
            "gemini-2.0-flash".to_string(),
            "".to_string(),
            "gemini-2.0-flash".to_string(),
        ];
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("gemini.models[1]")));
        assert!(msgs.iter().any(|m| m.contains("duplicate model")));
    }

    #[test]
    fn token_budget_ceiling_below_base_fails() {
        let mut config = SavaConfig::default();
        config.dispatch.base_output_tokens = 1000;
        config.dispatch.max_output_tokens = 500;
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("max_output_tokens")));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = SavaConfig::default();
        config.router.max_candidates = 0;
        config.dispatch.max_item_chars = 0;
        config.gemini.temperature = 3.5;
        config.agent.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn sweep_age_below_lookup_age_fails() {
        let mut config = SavaConfig::default();
        config.cache.max_age_days = 30;
        config.cache.sweep_max_age_days = 7;
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("sweep_max_age_days")));
    }

    #[test]
    fn cache_age_above_century_fails() {
        let mut config = SavaConfig::default();
        config.cache.max_age_days = u32::MAX;
        config.cache.sweep_max_age_days = u32::MAX;
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.starts_with("validation error: cache.max_age_days")));
        assert!(msgs.iter().any(|m| m.contains("cache.sweep_max_age_days (4294967295)")));

        config.cache.max_age_days = MAX_CACHE_AGE_DAYS;
        config.cache.sweep_max_age_days = MAX_CACHE_AGE_DAYS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn non_http_base_url_fails() {
        let mut config = SavaConfig::default();
        config.gemini.base_url = "generativelanguage.googleapis.com".to_string();
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("gemini.base_url")));
    }

    #[test]
    fn valid_custom_config_passes() {
        let toml_str = r#"
[gemini]
models = ["gemini-1.5-flash"]
temperature = 0.0

[storage]
database_path = "/tmp/sava-test.db"

[cache]
max_age_days = 0
sweep_max_age_days = 0
"#;
        let config: SavaConfig = toml::from_str(toml_str).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.gemini.models, vec!["gemini-1.5-flash"]);
        assert_eq!(config.router.max_candidates, 4);
    }

    #[test]
    fn nested_unknown_field_is_rejected() {
        let toml_str = r#"
[router]
cooldown_ms = 100
retries = 3
"#;
        assert!(toml::from_str::<SavaConfig>(toml_str).is_err());
    }
}
