// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SAVA - cached sentiment classification for agro-industrial news.
//!
//! This is the binary entry point for the `sava` command-line tool.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod cache;
mod classify;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sava_config::SavaConfig;

/// SAVA - cached sentiment classification for agro-industrial news.
#[derive(Parser, Debug)]
#[command(name = "sava", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify news texts as Positive, Negative or Neutral.
    Classify {
        /// Texts to classify. Read one per line from stdin when omitted.
        texts: Vec<String>,
        /// Read news items as JSON lines (`title`, `body`, ...) from this file, or `-` for stdin.
        #[arg(long, conflicts_with = "texts")]
        jsonl: Option<PathBuf>,
        /// Use the single-item prompt for each text instead of one batch call.
        #[arg(long)]
        one_by_one: bool,
        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Show cache counters and label distribution.
    Stats {
        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Delete cache entries older than the given age.
    Sweep {
        /// Maximum age in days; defaults to `cache.sweep_max_age_days`.
        #[arg(long)]
        max_age_days: Option<u32>,
        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            sava_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Commands::Classify {
            texts,
            jsonl,
            one_by_one,
            json,
            plain,
        } => {
            let options = classify::ClassifyOptions {
                one_by_one,
                json,
                plain,
            };
            classify::run_classify(&config, texts, jsonl.as_deref(), options).await
        }
        Commands::Stats { json, plain } => cache::run_stats(&config, json, plain).await,
        Commands::Sweep { max_age_days, json } => {
            cache::run_sweep(&config, max_age_days, json).await
        }
    };

    if let Err(e) = result {
        eprintln!("sava: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<SavaConfig, Vec<sava_config::ConfigError>> {
    match path {
        Some(path) => sava_config::load_and_validate_path(path),
        None => sava_config::load_and_validate(),
    }
}

/// Logs go to stderr so `--json` output stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sava={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
