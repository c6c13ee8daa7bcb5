//! Scan parameters, connection settings and database credentials

use directories::ProjectDirs;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AuditError, Result};
use crate::source::queries::DEFAULT_ZONES;

pub const AUTH_FILE_NAME: &str = "db-auth.txt";
pub const USER_ENV: &str = "ACORE_DB_USER";
pub const PASSWORD_ENV: &str = "ACORE_DB_PASS";

/// Bands covered by a batch run, inclusive at both ends
pub const BATCH_BANDS: &[(i64, i64)] = &[(1, 19), (20, 29), (30, 39), (40, 49), (50, 58), (1, 58)];

/// Inclusive NPC level range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBand {
    pub min: i64,
    pub max: i64,
}

impl LevelBand {
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(AuditError::InvalidBand { min, max });
        }
        Ok(Self { min, max })
    }
}

impl fmt::Display for LevelBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Which side of the NPC's level range is being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Over,
    Under,
}

impl Direction {
    /// Zero and positive diffs look for overlevelled items
    pub fn from_level_diff(level_diff: i64) -> Self {
        if level_diff >= 0 {
            Direction::Over
        } else {
            Direction::Under
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Over => write!(f, "over"),
            Direction::Under => write!(f, "under"),
        }
    }
}

/// Everything one scan needs besides the data source
#[derive(Debug, Clone)]
pub struct ScanParams {
    pub band: LevelBand,
    /// Signed: the sign picks the direction, the magnitude the threshold
    pub level_diff: i64,
    pub generate_sql: bool,
    /// Map ids NPCs must spawn on; empty means every map
    pub zones: Vec<i64>,
}

impl ScanParams {
    pub fn new(band: LevelBand, level_diff: i64) -> Self {
        Self {
            band,
            level_diff,
            generate_sql: true,
            zones: DEFAULT_ZONES.to_vec(),
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::from_level_diff(self.level_diff)
    }
}

/// Where the MySQL server lives
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            database: "acore_world".to_string(),
        }
    }
}

/// Database user and password. Never printed.
#[derive(Clone)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Environment first, then the auth file (explicit path or the default location)
    pub fn load(auth_file: Option<&Path>) -> Result<Self> {
        if let Some(creds) = Self::from_env()? {
            debug!("Using database credentials from environment");
            return Ok(creds);
        }

        let path = match auth_file {
            Some(path) => path.to_path_buf(),
            None => default_auth_file(),
        };
        debug!(path = ?path, "Reading database credentials");
        Self::from_file(&path)
    }

    pub fn from_env() -> Result<Option<Self>> {
        Self::from_vars(std::env::var(USER_ENV).ok(), std::env::var(PASSWORD_ENV).ok())
    }

    fn from_vars(user: Option<String>, password: Option<String>) -> Result<Option<Self>> {
        match (user, password) {
            (Some(user), Some(password)) if !user.is_empty() => Ok(Some(Self::new(user, password))),
            (None, None) => Ok(None),
            _ => Err(AuditError::CredentialMalformed(format!(
                "{} and {} must both be set",
                USER_ENV, PASSWORD_ENV
            ))),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AuditError::CredentialMissing(format!("{:?}: {}", path, e)))?;
        Self::parse(&contents)
            .map_err(|msg| AuditError::CredentialMalformed(format!("{:?}: {}", path, msg)))
    }

    /// First line is the user, second the password. Blank lines are ignored.
    fn parse(contents: &str) -> std::result::Result<Self, String> {
        let mut lines = contents.lines().map(str::trim).filter(|l| !l.is_empty());

        let user = lines.next().ok_or("expected a user on the first line")?;
        let password = lines.next().ok_or("expected a password on the second line")?;

        Ok(Self::new(user, password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `db-auth.txt` in the platform config directory if present, otherwise the
/// working directory
pub fn default_auth_file() -> PathBuf {
    ProjectDirs::from("", "", "acore-loot-audit")
        .map(|dirs| dirs.config_dir().join(AUTH_FILE_NAME))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(AUTH_FILE_NAME))
}
