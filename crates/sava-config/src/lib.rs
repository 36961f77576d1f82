// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the SAVA sentiment classifier.
//!
//! TOML files are layered over compiled defaults following the XDG hierarchy,
//! `SAVA_*` environment variables override them, and every problem found is
//! reported at once as a miette diagnostic with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use sava_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Models: {:?}", config.gemini.models);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError, ConfigSources};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::SavaConfig;

fn finish(
    loaded: Result<SavaConfig, figment::Error>,
    sources: impl FnOnce() -> ConfigSources,
) -> Result<SavaConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::from_figment(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `SavaConfig` or every diagnostic collected.
pub fn load_and_validate() -> Result<SavaConfig, Vec<ConfigError>> {
    finish(loader::load_config(), ConfigSources::discover)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<SavaConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || ConfigSources::file(path))
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<SavaConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        ConfigSources::inline(toml_content)
    })
}
