// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use sava_core::SavaError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Timestamp format stored in every `created_at` column. Fixed width, so
/// lexical order is time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Maps a tokio-rusqlite call error into the storage error variant.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> SavaError {
    SavaError::storage(e)
}

/// Handle to the single SQLite connection owned by the writer thread.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and apply migrations.
    pub async fn open(path: &str) -> Result<Self, SavaError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode explicitly.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, SavaError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(SavaError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(SavaError::storage)?;

        let journal_mode = conn
            .call(move |conn| -> Result<String, rusqlite::Error> {
                conn.busy_timeout(BUSY_TIMEOUT)?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                let mode = if wal_mode { "WAL" } else { "DELETE" };
                conn.pragma_update_and_check(None, "journal_mode", mode, |row| row.get(0))
            })
            .await
            .map_err(map_tr_err)?;
        debug!(path, journal_mode = %journal_mode, "database opened");

        conn.call(|conn| -> Result<(), refinery::Error> { run_migrations(conn) })
            .await
            .map_err(SavaError::storage)?;

        Ok(Self { conn })
    }

    /// The shared connection; every query goes through `connection().call(..)`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Round-trip a trivial query to prove the connection is alive.
    pub async fn ping(&self) -> Result<(), SavaError> {
        self.conn
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await
            .map_err(map_tr_err)?;
        Ok(())
    }

    /// Fold the WAL back into the main database file.
    pub async fn checkpoint(&self) -> Result<(), SavaError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
