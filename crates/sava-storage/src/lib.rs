// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite result store for the SAVA sentiment classifier.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. Classification
//! records are keyed by content fingerprint, expire softly on lookup, and
//! are removed only by an explicit sweep.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteResultStore;
pub use database::Database;
