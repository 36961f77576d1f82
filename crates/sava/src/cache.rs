// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sava stats` and `sava sweep` command implementations.

use std::io::IsTerminal;

use colored::Colorize;
use sava_config::SavaConfig;
use sava_core::{CacheStats, PluginAdapter, ResultStore, SavaError, Sentiment};
use sava_storage::SqliteResultStore;
use serde::Serialize;
use tracing::warn;

/// Structured sweep output for `--json` mode.
#[derive(Debug, Serialize)]
struct SweepResponse {
    removed: u64,
    max_age_days: u32,
}

async fn open_store(config: &SavaConfig) -> Result<SqliteResultStore, SavaError> {
    let store = SqliteResultStore::new(config.storage.clone());
    store.initialize().await?;
    Ok(store)
}

async fn close_store(store: &SqliteResultStore) {
    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "result store shutdown failed");
    }
}

/// Run the `sava stats` command.
pub async fn run_stats(config: &SavaConfig, json: bool, plain: bool) -> Result<(), SavaError> {
    let store = open_store(config).await?;
    let stats = store.stats().await;
    close_store(&store).await;
    let stats = stats?;

    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| SavaError::Internal(format!("failed to serialize stats: {e}")))?;
        println!("{out}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print!("{}", render_stats(&stats, use_color));
    }
    Ok(())
}

/// Run the `sava sweep` command.
pub async fn run_sweep(
    config: &SavaConfig,
    max_age_days: Option<u32>,
    json: bool,
) -> Result<(), SavaError> {
    let max_age_days = max_age_days.unwrap_or(config.cache.sweep_max_age_days);
    let store = open_store(config).await?;
    let removed = store.sweep(max_age_days).await;
    close_store(&store).await;
    let removed = removed?;

    if json {
        let out = serde_json::to_string_pretty(&SweepResponse {
            removed,
            max_age_days,
        })
        .map_err(|e| SavaError::Internal(format!("failed to serialize sweep result: {e}")))?;
        println!("{out}");
    } else {
        println!("removed {removed} entries older than {max_age_days} days");
    }
    Ok(())
}

fn render_stats(stats: &CacheStats, use_color: bool) -> String {
    let mut out = String::new();
    let heading = "sava cache";
    if use_color {
        out.push_str(&format!("{}\n", heading.bold()));
    } else {
        out.push_str(&format!("{heading}\n"));
    }
    out.push_str(&format!("  entries:  {}\n", stats.total_entries));
    out.push_str(&format!("  lookups:  {}\n", stats.total_hits));
    out.push_str(&format!("  hit rate: {:.1}%\n", stats.hit_rate * 100.0));
    for label in Sentiment::ALL {
        let count = stats.distribution.get(&label).copied().unwrap_or(0);
        let name = format!("{:<8}", label.to_string());
        let name = match (use_color, label) {
            (false, _) => name.normal(),
            (true, Sentiment::Positive) => name.green(),
            (true, Sentiment::Negative) => name.red(),
            (true, Sentiment::Neutral) => name.yellow(),
        };
        out.push_str(&format!("  {name}  {count}\n"));
    }
    out
}
