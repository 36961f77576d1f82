// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! Each problem is traced back to the layer that produced it: a `sava.toml`
//! file (with a span on the offending key), a `SAVA_*` environment variable,
//! or inline TOML. Unknown keys get a Jaro-Winkler "did you mean" hint drawn
//! from the keys the section accepts.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::io::IsTerminal;
use std::path::Path;

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, SourceSpan};
use thiserror::Error;

use crate::loader;

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Name used for TOML passed as a string rather than read from disk.
pub const INLINE_SOURCE: &str = "<inline>";

/// A configuration error rendered through miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key (or a whole section) sava does not know about.
    #[error("unknown key `{key}` in {}", section_label(.section.as_deref()))]
    #[diagnostic(
        code(sava::config::unknown_key),
        help("{}", unknown_key_help(section.as_deref(), suggestion.as_deref(), accepted))
    )]
    UnknownKey {
        /// Table the key appeared in; `None` for the top level.
        section: Option<String>,
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys the table accepts.
        accepted: String,
        #[label("not a sava setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that does not deserialize into the setting's type.
    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(sava::config::invalid_type), help("{hint}"))]
    InvalidType {
        /// Dotted path, e.g. `router.max_candidates`.
        key: String,
        detail: String,
        /// Where to fix it: the file or environment variable that set it.
        hint: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        expected: String,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that parsed but violates a semantic constraint.
    #[error("validation error: {message}")]
    #[diagnostic(code(sava::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(sava::config::other))]
    Other(String),
}

fn section_label(section: Option<&str>) -> String {
    match section {
        Some(name) => format!("[{name}]"),
        None => "the top level".to_string(),
    }
}

fn unknown_key_help(section: Option<&str>, suggestion: Option<&str>, accepted: &str) -> String {
    let scope = match section {
        Some(name) => format!("[{name}] accepts: {accepted}"),
        None => format!("sava.toml sections are: {accepted}"),
    };
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {scope}"),
        None => scope,
    }
}

/// TOML text of every file layer, kept so diagnostics can point into it.
#[derive(Debug, Default, Clone)]
pub struct ConfigSources {
    files: Vec<(String, String)>,
}

impl ConfigSources {
    /// The system, user and local layers that exist on disk.
    pub fn discover() -> Self {
        let mut sources = Self::default();
        sources.add_file(Path::new(loader::SYSTEM_CONFIG));
        if let Some(user) = loader::user_config_path() {
            sources.add_file(&user);
        }
        let local = std::env::current_dir()
            .map(|dir| dir.join(loader::LOCAL_CONFIG))
            .unwrap_or_else(|_| loader::LOCAL_CONFIG.into());
        sources.add_file(&local);
        sources
    }

    /// A single explicitly named file.
    pub fn file(path: &Path) -> Self {
        let mut sources = Self::default();
        sources.add_file(path);
        sources
    }

    /// TOML that never touched the filesystem.
    pub fn inline(content: &str) -> Self {
        Self {
            files: vec![(INLINE_SOURCE.to_string(), content.to_string())],
        }
    }

    fn add_file(&mut self, path: &Path) {
        if let Ok(content) = std::fs::read_to_string(path) {
            self.files.push((path.display().to_string(), content));
        }
    }

    fn get(&self, name: &str) -> Option<&(String, String)> {
        self.files.iter().find(|(n, _)| n == name)
    }

    /// Span of `key` inside `section`, looking in the named source first.
    ///
    /// Merged tables keep the metadata of the layer that first defined them,
    /// so the remaining files are searched when the named one has no match.
    fn span_of(
        &self,
        name: Option<&str>,
        section: Option<&str>,
        key: &str,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        let preferred = name.and_then(|n| self.get(n));
        let found = preferred
            .into_iter()
            .chain(self.files.iter())
            .find_map(|(n, content)| {
                locate_key(content, section, key).map(|offset| {
                    (
                        SourceSpan::new(offset.into(), key.len()),
                        NamedSource::new(n, content.clone()),
                    )
                })
            });
        match found {
            Some((span, src)) => (Some(span), Some(src)),
            None => (None, None),
        }
    }

    fn span_unless_env(
        &self,
        layer: &Layer,
        section: Option<&str>,
        key: &str,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        match layer {
            Layer::Env => (None, None),
            Layer::File(name) => self.span_of(Some(name.as_str()), section, key),
            Layer::Other => self.span_of(None, section, key),
        }
    }
}

/// Which layer produced a failing value.
enum Layer {
    File(String),
    Env,
    Other,
}

fn layer_of(error: &figment::Error) -> Layer {
    let Some(metadata) = error.metadata.as_ref() else {
        return Layer::Other;
    };
    match &metadata.source {
        Some(figment::Source::File(path)) => Layer::File(path.display().to_string()),
        Some(figment::Source::Code(_)) | Some(figment::Source::Custom(_)) | None
            if metadata.name.contains("environment") =>
        {
            Layer::Env
        }
        // `Toml::string` reports its source as inline code.
        Some(figment::Source::Code(_)) => Layer::File(INLINE_SOURCE.to_string()),
        _ => Layer::Other,
    }
}

/// Convert every error in a figment chain into a [`ConfigError`].
pub fn from_figment(err: figment::Error, sources: &ConfigSources) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            let layer = layer_of(&error);

            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let section = path.first().cloned();
                    let (span, src) = sources.span_unless_env(&layer, section.as_deref(), field);
                    ConfigError::UnknownKey {
                        suggestion: closest_match(field, *expected),
                        accepted: expected.join(", "),
                        key: field.clone(),
                        section,
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    let (section, leaf) = match path.as_slice() {
                        [section, leaf, ..] => (Some(section.as_str()), leaf.as_str()),
                        [leaf] => (None, leaf.as_str()),
                        [] => (None, ""),
                    };
                    let (span, src) = sources.span_unless_env(&layer, section, leaf);
                    let hint = match &layer {
                        Layer::Env => format!(
                            "check the `{}` environment variable",
                            loader::env_var_name(&path)
                        ),
                        Layer::File(name) if name != INLINE_SOURCE => {
                            format!("fix the value in {name}")
                        }
                        _ => format!("`{}` must be {expected}", path.join(".")),
                    };
                    ConfigError::InvalidType {
                        key: path.join("."),
                        detail: format!("found {actual}, expected {expected}"),
                        expected: expected.to_string(),
                        hint,
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Byte offset of `key` as written inside the `[section]` table.
///
/// Only lines under the matching header count, so a key with the same name
/// in another table is never picked. `section = None` searches the lines
/// before the first header and matches table headers themselves.
pub fn locate_key(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if trimmed.starts_with('[') {
            let inner = trimmed.trim_start_matches('[');
            let name = inner.split(']').next().unwrap_or_default().trim();
            if section.is_none() && name == key {
                let lead = trimmed.len() - inner.trim_start().len();
                return Some(offset + indent + lead);
            }
            current = Some(name);
        } else if current == section
            && let Some((lhs, _)) = trimmed.split_once('=')
            && lhs.trim_end() == key
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// The accepted key closest to `unknown`, if any clears the threshold.
pub fn closest_match<S: AsRef<str>>(unknown: &str, accepted: &[S]) -> Option<String> {
    accepted
        .iter()
        .map(|k| (strsim::jaro_winkler(unknown, k.as_ref()), k.as_ref()))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, k)| k.to_string())
}

/// Print every error to stderr, colored only when stderr is a terminal.
pub fn render_errors(errors: &[ConfigError]) {
    let theme = if std::io::stderr().is_terminal() {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let handler = GraphicalReportHandler::new_themed(theme);
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("sava: {error}"),
        }
    }
    eprintln!(
        "sava: {} configuration problem{} found",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
}
