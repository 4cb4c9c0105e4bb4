pub mod mysql;
pub mod sqlite;

use crate::config::{DbConfig, DriverKind};
use crate::envelope::RowMap;
use serde_json::Value;
use std::future::Future;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>, // row-major
}

impl QueryResult {
    pub fn into_rows(self) -> Vec<RowMap> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|values| RowMap::zip(&columns, values))
            .collect()
    }
}

/// A SQL backend the executor can open connections against.
///
/// Connections are owned by exactly one call: `connect`, then `query`, then
/// `close`. Nothing is pooled or shared between calls.
pub trait Driver: Send + Sync + 'static {
    type Conn: Send;

    fn connect(&self) -> impl Future<Output = Result<Self::Conn, sqlx::Error>> + Send;

    /// Run `sql` with positional `params` and stringify every non-null cell.
    fn query(
        &self,
        conn: &mut Self::Conn,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<QueryResult, sqlx::Error>> + Send;

    fn close(&self, conn: Self::Conn) -> impl Future<Output = ()> + Send;
}

/// The configured backend, picked at startup from the driver identifier.
pub enum Backend {
    MySql(mysql::Driver),
    Sqlite(sqlite::Driver),
}

pub enum BackendConn {
    MySql(sqlx::MySqlConnection),
    Sqlite(sqlx::SqliteConnection),
}

impl Backend {
    pub fn from_config(cfg: &DbConfig) -> Result<Self, sqlx::Error> {
        match cfg.driver {
            DriverKind::MySql => Ok(Backend::MySql(mysql::Driver::new(cfg))),
            DriverKind::Sqlite => Ok(Backend::Sqlite(sqlite::Driver::new(&cfg.database)?)),
        }
    }
}

impl Driver for Backend {
    type Conn = BackendConn;

    async fn connect(&self) -> Result<BackendConn, sqlx::Error> {
        match self {
            Backend::MySql(d) => d.connect().await.map(BackendConn::MySql),
            Backend::Sqlite(d) => d.connect().await.map(BackendConn::Sqlite),
        }
    }

    async fn query(
        &self,
        conn: &mut BackendConn,
        sql: &str,
        params: &[Value],
    ) -> Result<QueryResult, sqlx::Error> {
        match (self, conn) {
            (Backend::MySql(d), BackendConn::MySql(c)) => d.query(c, sql, params).await,
            (Backend::Sqlite(d), BackendConn::Sqlite(c)) => d.query(c, sql, params).await,
            _ => Err(sqlx::Error::Protocol(
                "connection was opened by a different backend".into(),
            )),
        }
    }

    async fn close(&self, conn: BackendConn) {
        match (self, conn) {
            (Backend::MySql(d), BackendConn::MySql(c)) => d.close(c).await,
            (Backend::Sqlite(d), BackendConn::Sqlite(c)) => d.close(c).await,
            // dropping the handle still releases it
            _ => {}
        }
    }
}
