//! Failure classification.
//!
//! Callers only ever see five categories. Structured information from the
//! driver (error variant, server error number, SQLSTATE, SQLite result code)
//! decides first; substring matching on the driver text is the fallback.

use sqlx::error::DatabaseError;
use sqlx::mysql::MySqlDatabaseError;
use sqlx::sqlite::SqliteError;
use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Authentication rejected, host unreachable or blocked by a firewall.
    Connection,
    /// Driver missing or misconfigured.
    Driver,
    Timeout,
    /// Unknown table, view or procedure.
    ObjectNotFound,
    /// Anything else the server rejected.
    Sql,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Connection => "connection",
            FailureKind::Driver => "driver",
            FailureKind::Timeout => "timeout",
            FailureKind::ObjectNotFound => "object_not_found",
            FailureKind::Sql => "sql",
        }
    }

    /// User-facing message for this category. `subject` names what was being run.
    pub fn describe(self, subject: &str) -> String {
        match self {
            FailureKind::Connection => format!(
                "Could not connect to the database for {}: login failed, host unreachable or blocked by a firewall",
                subject
            ),
            FailureKind::Driver => format!(
                "Database driver unavailable or misconfigured; {} was not run",
                subject
            ),
            FailureKind::Timeout => format!("Timed out waiting for the database while running {}", subject),
            FailureKind::ObjectNotFound => format!("Object not found: {}", subject),
            FailureKind::Sql => format!("SQL error while running {}", subject),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in a call an error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Execute,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid procedure name '{0}'")]
    InvalidTarget(String),
    #[error("connect failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("connect timed out after {}s", .0.as_secs())]
    ConnectTimeout(Duration),
    #[error("execute failed: {0}")]
    Execute(#[source] sqlx::Error),
}

impl ExecError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExecError::InvalidTarget(_) => FailureKind::Sql,
            ExecError::Connect(e) => classify(e, Stage::Connect),
            ExecError::ConnectTimeout(_) => FailureKind::Timeout,
            ExecError::Execute(e) => classify(e, Stage::Execute),
        }
    }

    /// Raw driver text, for operators.
    pub fn detail(&self) -> String {
        match self {
            ExecError::Connect(e) | ExecError::Execute(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

pub fn classify(err: &sqlx::Error, stage: Stage) -> FailureKind {
    let structured = match err {
        sqlx::Error::Configuration(_) => Some(FailureKind::Driver),
        sqlx::Error::Tls(_) => Some(FailureKind::Connection),
        sqlx::Error::Io(e) => Some(classify_io(e)),
        sqlx::Error::PoolTimedOut => Some(FailureKind::Timeout),
        sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => Some(FailureKind::Connection),
        sqlx::Error::Database(db) => classify_database(db.as_ref()),
        _ => None,
    };
    structured
        .or_else(|| classify_message(&err.to_string()))
        .unwrap_or(match stage {
            Stage::Connect => FailureKind::Connection,
            Stage::Execute => FailureKind::Sql,
        })
}

fn classify_io(e: &io::Error) -> FailureKind {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => FailureKind::Timeout,
        _ => FailureKind::Connection,
    }
}

fn classify_database(db: &(dyn DatabaseError + 'static)) -> Option<FailureKind> {
    if let Some(kind) = db
        .try_downcast_ref::<MySqlDatabaseError>()
        .and_then(|e| mysql_error_number(e.number()))
    {
        return Some(kind);
    }
    if db.try_downcast_ref::<SqliteError>().is_some() {
        let primary = db
            .code()
            .and_then(|c| c.parse::<i32>().ok())
            .map(|c| c & 0xff);
        if let Some(kind) = primary.and_then(sqlite_result_code) {
            return Some(kind);
        }
    } else if let Some(kind) = db.code().as_deref().and_then(sqlstate) {
        return Some(kind);
    }
    classify_message(db.message())
}

/// MySQL / MariaDB server error numbers.
pub fn mysql_error_number(number: u16) -> Option<FailureKind> {
    match number {
        // access denied, unknown database, host blocked / not allowed
        1044 | 1045 | 1049 | 1129 | 1130 => Some(FailureKind::Connection),
        // client can't speak the server's auth plugin
        1251 | 2059 => Some(FailureKind::Driver),
        // lock wait timeout, max_execution_time exceeded
        1205 | 3024 => Some(FailureKind::Timeout),
        // unknown table, no such table, no such procedure
        1051 | 1146 | 1305 => Some(FailureKind::ObjectNotFound),
        _ => None,
    }
}

/// SQLSTATE classes shared by ODBC-style drivers.
pub fn sqlstate(state: &str) -> Option<FailureKind> {
    match state {
        "28000" => Some(FailureKind::Connection),
        s if s.starts_with("08") => Some(FailureKind::Connection),
        "42S02" => Some(FailureKind::ObjectNotFound),
        "HYT00" | "HYT01" => Some(FailureKind::Timeout),
        "IM002" | "IM003" | "IM004" => Some(FailureKind::Driver),
        _ => None,
    }
}

/// SQLite primary result codes.
pub fn sqlite_result_code(code: i32) -> Option<FailureKind> {
    match code {
        // SQLITE_BUSY
        5 => Some(FailureKind::Timeout),
        // SQLITE_CANTOPEN, SQLITE_AUTH
        14 | 23 => Some(FailureKind::Connection),
        // SQLITE_NOTADB
        26 => Some(FailureKind::Driver),
        _ => None,
    }
}

/// Last-resort heuristics over the driver's error text.
pub fn classify_message(text: &str) -> Option<FailureKind> {
    let text = text.to_ascii_lowercase();
    let any = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

    if any(&[
        "invalid object name",
        "no such table",
        "no such view",
        "doesn't exist",
        "does not exist",
        "unknown table",
    ]) {
        Some(FailureKind::ObjectNotFound)
    } else if any(&["timeout", "timed out", "hyt00"]) {
        Some(FailureKind::Timeout)
    } else if any(&[
        "login failed",
        "access denied",
        "authentication",
        "firewall",
        "connection refused",
        "could not connect",
        "unreachable",
    ]) {
        Some(FailureKind::Connection)
    } else if any(&[
        "im002",
        "data source name not found",
        "can't open lib",
        "driver not found",
        "no driver",
    ]) {
        Some(FailureKind::Driver)
    } else {
        None
    }
}
