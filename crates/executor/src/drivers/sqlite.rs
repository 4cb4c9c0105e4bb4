use super::{Driver as DriverTrait, QueryResult};
use serde_json::Value;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};
use std::str::FromStr;

pub struct Driver {
    options: SqliteConnectOptions,
}

impl Driver {
    /// Accepts a `sqlite:` URL, `:memory:` or a plain file path.
    pub fn new(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&normalize_url(url))?;
        Ok(Self { options })
    }
}

pub fn normalize_url(url: &str) -> String {
    if url.starts_with("sqlite:") {
        url.to_string()
    } else if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}", url)
    }
}

impl DriverTrait for Driver {
    type Conn = SqliteConnection;

    async fn connect(&self) -> Result<SqliteConnection, sqlx::Error> {
        SqliteConnection::connect_with(&self.options).await
    }

    async fn query(
        &self,
        conn: &mut SqliteConnection,
        sql: &str,
        params: &[Value],
    ) -> Result<QueryResult, sqlx::Error> {
        let mut q = sqlx::query(sql);
        for v in params {
            q = bind_sqlite(q, v);
        }
        let rows = q.fetch_all(&mut *conn).await?;
        let columns: Vec<String> = rows
            .first()
            .map(|r| r.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let col_len = columns.len();
        let mut out_rows: Vec<Vec<Option<String>>> = Vec::with_capacity(rows.len());
        for r in rows.iter() {
            let mut row_vals = Vec::with_capacity(col_len);
            for i in 0..col_len {
                row_vals.push(cell_text(r, i)?);
            }
            out_rows.push(row_vals);
        }
        Ok(QueryResult {
            columns,
            rows: out_rows,
        })
    }

    async fn close(&self, conn: SqliteConnection) {
        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "closing sqlite connection failed");
        }
    }
}

fn cell_text(row: &SqliteRow, i: usize) -> Result<Option<String>, sqlx::Error> {
    let raw = row.try_get_raw(i)?;
    if raw.is_null() {
        return Ok(None);
    }
    // storage class of this value, not the declared column type
    let type_name = raw.type_info().name().to_string();
    let text = match type_name.as_str() {
        "INTEGER" => row.try_get::<i64, _>(i)?.to_string(),
        "REAL" => row.try_get::<f64, _>(i)?.to_string(),
        "BLOB" => String::from_utf8_lossy(&row.try_get::<Vec<u8>, _>(i)?).into_owned(),
        _ => row
            .try_get::<String, _>(i)
            .or_else(|_| row.try_get::<i64, _>(i).map(|v| v.to_string()))
            .or_else(|_| row.try_get::<f64, _>(i).map(|v| v.to_string()))?,
    };
    Ok(Some(text))
}

fn bind_sqlite<'q>(
    q: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    v: &Value,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match v {
        Value::Null => q.bind::<Option<String>>(None),
        Value::Bool(b) => q.bind(*b as i64),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q
            }
        }
        Value::String(s) => q.bind(s.clone()),
        other => q.bind(other.to_string()),
    }
}
