use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, Row as _, ValueRef};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use super::{DataSource, Row, SqlValue};
use crate::config::{ConnectionSettings, Credentials};
use crate::error::{AuditError, Result};

/// Live MySQL world database.
///
/// sqlx is async only, so the source owns a current-thread runtime and blocks
/// on every call. One connection, one query in flight at a time.
pub struct MySqlSource {
    runtime: Runtime,
    conn: MySqlConnection,
}

impl MySqlSource {
    pub fn connect(settings: &ConnectionSettings, credentials: &Credentials) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AuditError::Connection(format!("Failed to create runtime: {}", e)))?;

        let options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.database)
            .username(credentials.user())
            .password(credentials.password());

        let conn = runtime
            .block_on(MySqlConnection::connect_with(&options))
            .map_err(|e| AuditError::Connection(e.to_string()))?;

        info!(
            host = %settings.host,
            port = settings.port,
            database = %settings.database,
            "Connected to MySQL world database"
        );

        Ok(Self { runtime, conn })
    }
}

impl DataSource for MySqlSource {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        debug!(sql, "mysql query");

        let rows = self
            .runtime
            .block_on(sqlx::query(sql).fetch_all(&mut self.conn))
            .map_err(|e| AuditError::query(sql, e))?;

        Ok(rows.iter().map(convert_row).collect())
    }
}

fn convert_row(row: &MySqlRow) -> Row {
    (0..row.len()).map(|idx| convert_cell(row, idx)).collect::<Vec<_>>().into()
}

/// Decode a cell without knowing its declared type up front.
/// AzerothCore mixes signed and unsigned integer columns.
fn convert_cell(row: &MySqlRow, idx: usize) -> SqlValue {
    match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => return SqlValue::Null,
        Ok(_) => {}
        Err(_) => return SqlValue::Null,
    }

    if let Ok(i) = row.try_get::<i64, _>(idx) {
        return SqlValue::Integer(i);
    }
    if let Ok(u) = row.try_get::<u64, _>(idx) {
        return narrow_unsigned(u);
    }
    if let Ok(f) = row.try_get::<f64, _>(idx) {
        return SqlValue::Real(f);
    }
    if let Ok(s) = row.try_get::<String, _>(idx) {
        return SqlValue::Text(s);
    }
    if let Ok(bytes) = row.try_get::<Vec<u8>, _>(idx) {
        return SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned());
    }

    warn!(column = idx, "Unsupported column type, treating as NULL");
    SqlValue::Null
}

/// BIGINT UNSIGNED values above `i64::MAX` lose precision as a real
fn narrow_unsigned(value: u64) -> SqlValue {
    match i64::try_from(value) {
        Ok(i) => SqlValue::Integer(i),
        Err(_) => SqlValue::Real(value as f64),
    }
}
