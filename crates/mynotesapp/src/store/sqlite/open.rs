//! Connection bootstrap for the relational store.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - The schema exists and the default group has been seeded exactly once
//!   (tracked in `PRAGMA user_version`).

use crate::error::Result;
use crate::model::{GroupId, DEFAULT_GROUP};
use log::{error, info};
use rusqlite::{params, Connection};
use std::path::Path;
use std::time::{Duration, Instant};

/// Schema version written after the first bootstrap.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA: &str = include_str!("schema.sql");

/// Opens (or creates) a SQLite file and prepares it for use.
pub fn open_db(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory SQLite database and prepares it for use.
pub fn open_db_in_memory() -> Result<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> Result<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=sqlite status=start mode={}", mode);

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=sqlite status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=sqlite status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=sqlite status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    let version: u32 = tx.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if version == 0 {
        tx.execute(
            "INSERT INTO groups (id, title, position) VALUES (?1, ?2, 1);",
            params![GroupId::generate().to_string(), DEFAULT_GROUP],
        )?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))?;
    }
    tx.commit()?;
    Ok(())
}
