// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database handle: migrations on open, PRAGMA setup, and lifecycle.
//!
//! Every read and write goes through the single background thread owned by
//! the wrapped `tokio_rusqlite::Connection`, so closures passed to
//! [`Database::connection`]`.call()` run one at a time. Multi-statement
//! operations inside one closure are therefore atomic with respect to other
//! callers in this process.

use std::path::Path;

use leadline_core::LeadlineError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Per-connection settings applied to the shared connection.
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;";

/// An open, migrated SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` with WAL enabled.
    pub async fn open(path: &str) -> Result<Self, LeadlineError> {
        Self::open_with(path, true).await
    }

    /// Open the database at `path`, running migrations first.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, LeadlineError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| LeadlineError::Storage {
                source: Box::new(e),
            })?;
        }

        // Migrations need a plain rusqlite connection; run them off the runtime.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), LeadlineError> {
            let mut conn = rusqlite::Connection::open(&migrate_path).map_err(storage_err)?;
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(storage_err)?;
            }
            run_migrations(&mut conn)
        })
        .await
        .map_err(|e| LeadlineError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| LeadlineError::Storage {
                source: Box::new(e),
            })?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(CONNECTION_PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The shared connection. Do not open additional connections for writes.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), LeadlineError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), LeadlineError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(|e| LeadlineError::Storage {
            source: Box::new(e),
        })
    }
}

/// Convert a tokio-rusqlite call error into a storage error.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> LeadlineError {
    LeadlineError::Storage {
        source: Box::new(e),
    }
}

fn storage_err(e: rusqlite::Error) -> LeadlineError {
    LeadlineError::Storage {
        source: Box::new(e),
    }
}
