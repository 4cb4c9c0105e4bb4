//! contable_executor: runs stored procedures and parameterized SELECTs and
//! normalizes the result set into a JSON-ready [`Envelope`].

use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub mod config;
pub mod drivers;
pub mod envelope;
pub mod error;

pub use config::{ConfigError, DbConfig, DriverKind};
pub use drivers::{Backend, Driver, QueryResult};
pub use envelope::{Envelope, RowMap};
pub use error::{ExecError, FailureKind, Stage};

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Stored procedure name, invoked as `CALL name(?, ...)`.
    Procedure(String),
    /// Complete statement text with `?` placeholders already in place.
    Query(String),
}

impl Target {
    pub fn procedure(name: impl Into<String>) -> Self {
        Target::Procedure(name.into())
    }

    pub fn query(sql: impl Into<String>) -> Self {
        Target::Query(sql.into())
    }

    /// The echo placed in a success envelope.
    pub fn label(&self) -> &str {
        match self {
            Target::Procedure(name) => name,
            Target::Query(sql) => sql,
        }
    }

    /// SQL text to send for a call with `arity` positional arguments.
    pub fn statement(&self, arity: usize) -> Result<String, ExecError> {
        match self {
            Target::Procedure(name) => {
                if !is_qualified_identifier(name) {
                    return Err(ExecError::InvalidTarget(name.clone()));
                }
                Ok(call_statement(name, arity))
            }
            Target::Query(sql) => Ok(sql.clone()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Procedure(name) => write!(f, "procedure {}", name),
            Target::Query(sql) => write!(f, "query `{}`", sql),
        }
    }
}

/// `CALL name(?, ?, ?)` with exactly `arity` placeholders; `CALL name()` for none.
pub fn call_statement(name: &str, arity: usize) -> String {
    let placeholders = vec!["?"; arity].join(", ");
    format!("CALL {}({})", name, placeholders)
}

/// ASCII letters, digits and `_`, not starting with a digit.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An identifier, optionally qualified by one schema: `schema.name`.
pub fn is_qualified_identifier(s: &str) -> bool {
    match s.split_once('.') {
        Some((schema, name)) => is_identifier(schema) && is_identifier(name),
        None => is_identifier(s),
    }
}

pub struct Executor<D> {
    driver: D,
    connect_timeout: Duration,
}

impl<D: Driver> Executor<D> {
    pub fn new(driver: D, connect_timeout: Duration) -> Self {
        Self {
            driver,
            connect_timeout,
        }
    }

    /// Run `target` on a fresh connection and wrap the outcome.
    ///
    /// Never retries. The connection is closed before this returns whether the
    /// query succeeded or not; if connecting failed there is nothing to close.
    pub async fn execute(&self, target: &Target, params: &[Value]) -> Envelope {
        tracing::debug!(call = %target, params = params.len(), "executing");
        match self.run(target, params).await {
            Ok(rows) => {
                tracing::debug!(call = %target, rows = rows.len(), "query succeeded");
                Envelope::success(target.label(), rows)
            }
            Err(err) => {
                let kind = err.kind();
                let detail = err.detail();
                tracing::error!(call = %target, kind = %kind, error = %detail, "query failed");
                Envelope::error(kind, kind.describe(target.label()), Some(detail))
            }
        }
    }

    async fn run(&self, target: &Target, params: &[Value]) -> Result<Vec<RowMap>, ExecError> {
        let sql = target.statement(params.len())?;

        let mut conn = match tokio::time::timeout(self.connect_timeout, self.driver.connect()).await
        {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(ExecError::Connect(e)),
            Err(_) => return Err(ExecError::ConnectTimeout(self.connect_timeout)),
        };

        let result = self.driver.query(&mut conn, &sql, params).await;
        self.driver.close(conn).await;

        Ok(result.map_err(ExecError::Execute)?.into_rows())
    }
}
