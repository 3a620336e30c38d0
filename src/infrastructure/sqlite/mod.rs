pub mod account_repo;
pub mod article_repo;
pub mod migrations;
pub mod pool_repo;
pub mod rule_config_repo;
pub mod run_repo;
pub mod topic_repo;

use crate::domain::error::DomainError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// One connection shared by all repositories. SQLite serializes writers
/// anyway; a single guarded handle keeps transactions simple and lets the
/// in-memory database work across repos.
pub type SharedConn = Arc<Mutex<Connection>>;

pub fn open_database(path: &Path) -> Result<SharedConn, DomainError> {
    let conn = Connection::open(path)
        .map_err(|e| DomainError::Database(format!("Failed to open database: {e}")))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| DomainError::Database(e.to_string()))?;
    migrations::run_migrations(&conn).map_err(DomainError::Database)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub fn open_in_memory() -> Result<SharedConn, DomainError> {
    let conn = Connection::open_in_memory()
        .map_err(|e| DomainError::Database(format!("Failed to open database: {e}")))?;
    migrations::run_migrations(&conn).map_err(DomainError::Database)?;
    Ok(Arc::new(Mutex::new(conn)))
}
