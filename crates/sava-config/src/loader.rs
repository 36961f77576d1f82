// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sava.toml` > `~/.config/sava/sava.toml` > `/etc/sava/sava.toml`
//! with environment variable overrides via the `SAVA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SavaConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/sava/sava.toml";
pub(crate) const LOCAL_CONFIG: &str = "sava.toml";

/// Top-level sections reachable from `SAVA_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["agent", "gemini", "storage", "cache", "router", "dispatch"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sava").join("sava.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sava/sava.toml` (system-wide)
/// 3. `~/.config/sava/sava.toml` (user XDG config)
/// 4. `./sava.toml` (local directory)
/// 5. `SAVA_*` environment variables
pub fn load_config() -> Result<SavaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SavaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SavaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SavaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SavaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the XDG lookup, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SavaConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config key.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `gemini_api_key` maps to `gemini.api_key` and not `gemini.api.key`.
pub fn env_key_to_path(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
            && !rest.is_empty()
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// The `SAVA_*` variable that sets the dotted config `path`.
pub fn env_var_name<S: AsRef<str>>(path: &[S]) -> String {
    let key: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
    format!("SAVA_{}", key.join("_").to_ascii_uppercase())
}

/// Environment provider using an explicit `map()` for section-to-dot mapping.
fn env_provider() -> Env {
    Env::prefixed("SAVA_").map(|key| env_key_to_path(key.as_str()).into())
}
