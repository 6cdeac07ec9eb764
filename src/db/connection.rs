use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::errors::ServerError;

/// Process-wide SQLite handle. The connection is opened on first use and
/// shared by every worker; `shutdown` closes it explicitly.
#[derive(Clone)]
pub struct Database {
    path: PathBuf,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Provides the shared connection to the closure, opening it if needed.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ServerError>,
    {
        let mut slot = self.conn.lock().map_err(|_| ServerError::InternalError)?;
        if slot.is_none() {
            debug!(path = %self.path.display(), "opening database");
            let opened = Connection::open(&self.path)
                .map_err(|e| ServerError::DbError(format!("Open DB failed: {e}")))?;
            // Brand prefixes are matched with LIKE, which must respect case.
            opened
                .execute_batch("PRAGMA case_sensitive_like = ON;")
                .map_err(|e| ServerError::DbError(format!("Configure DB failed: {e}")))?;
            *slot = Some(opened);
        }
        let conn = slot.as_mut().ok_or(ServerError::InternalError)?;
        f(conn)
    }

    pub fn is_open(&self) -> bool {
        self.conn.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Closes the connection. A later `with_conn` reopens it.
    pub fn shutdown(&self) -> Result<(), ServerError> {
        let mut slot = self.conn.lock().map_err(|_| ServerError::InternalError)?;
        if let Some(conn) = slot.take() {
            if let Err((conn, e)) = conn.close() {
                warn!(error = %e, "database close failed, keeping handle");
                *slot = Some(conn);
                return Err(ServerError::DbError(format!("Close DB failed: {e}")));
            }
            info!(path = %self.path.display(), "database closed");
        }
        Ok(())
    }
}

/// Initialize database from a SQL schema file
pub fn init_db(db: &Database, schema_path: &str) -> Result<(), ServerError> {
    let schema_sql = fs::read_to_string(schema_path)
        .map_err(|e| ServerError::DbError(format!("Failed to read schema file: {e}")))?;

    db.with_conn(|conn| {
        conn.execute_batch(&schema_sql)
            .map_err(|e| ServerError::DbError(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })?;

    info!(schema = schema_path, "database initialized");
    Ok(())
}
