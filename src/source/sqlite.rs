use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use tracing::{debug, info};

use super::{DataSource, Row, SqlValue};
use crate::error::{AuditError, Result};

/// Reads a SQLite copy of the world database
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    /// Open an existing database read-only
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(AuditError::Connection(format!(
                "SQLite database not found: {:?}",
                db_path
            )));
        }

        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| AuditError::Connection(e.to_string()))?;

        info!(path = ?db_path, "Opened SQLite world database");
        Ok(Self { conn })
    }

    /// Wrap an already-open connection (in-memory fixtures)
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl DataSource for SqliteSource {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        debug!(sql, "sqlite query");

        let mut stmt = self
            .conn
            .prepare_cached(sql)
            .map_err(|e| AuditError::query(sql, e))?;
        let column_count = stmt.column_count();

        let mut rows = stmt.query([]).map_err(|e| AuditError::query(sql, e))?;
        let mut out = Vec::new();

        while let Some(row) = rows.next().map_err(|e| AuditError::query(sql, e))? {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                let value = row
                    .get_ref(idx)
                    .map(SqlValue::from)
                    .map_err(|e| AuditError::query(sql, e))?;
                values.push(value);
            }
            out.push(Row::new(values));
        }

        Ok(out)
    }
}
