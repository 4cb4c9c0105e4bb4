use super::{Driver as DriverTrait, QueryResult};
use crate::config::DbConfig;
use serde_json::Value;
use futures_util::TryStreamExt;
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow, MySqlSslMode};
use sqlx::types::Decimal;
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{Column, Connection, Either, Executor as _, Row, TypeInfo, ValueRef};

pub struct Driver {
    options: MySqlConnectOptions,
}

impl Driver {
    pub fn new(cfg: &DbConfig) -> Self {
        let ssl_mode = if cfg.encrypt {
            MySqlSslMode::Required
        } else {
            MySqlSslMode::Preferred
        };
        let options = MySqlConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .username(&cfg.user)
            .password(&cfg.password)
            .database(&cfg.database)
            .ssl_mode(ssl_mode);
        Self { options }
    }
}

impl DriverTrait for Driver {
    type Conn = MySqlConnection;

    async fn connect(&self) -> Result<MySqlConnection, sqlx::Error> {
        MySqlConnection::connect_with(&self.options).await
    }

    async fn query(
        &self,
        conn: &mut MySqlConnection,
        sql: &str,
        params: &[Value],
    ) -> Result<QueryResult, sqlx::Error> {
        let mut q = sqlx::query(sql);
        for v in params {
            q = bind_mysql(q, v);
        }
        // A CALL can yield several result sets; stop once the first one ends.
        let mut items = Vec::new();
        {
            let mut stream = (&mut *conn).fetch_many(q);
            while let Some(item) = stream.try_next().await? {
                let set_done = item.is_left();
                items.push(item);
                if set_done {
                    break;
                }
            }
        }
        let rows = first_result_set(items);

        let columns: Vec<String> = rows
            .first()
            .map(|r| r.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let mut out_rows = Vec::with_capacity(rows.len());
        for r in rows.iter() {
            let mut row_vals = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                row_vals.push(cell_text(r, i)?);
            }
            out_rows.push(row_vals);
        }
        Ok(QueryResult {
            columns,
            rows: out_rows,
        })
    }

    async fn close(&self, conn: MySqlConnection) {
        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "closing mysql connection failed");
        }
    }
}

/// Rows of the first result set in a stream of results. A `Left` marks the
/// end of a set, so a first set with no rows yields nothing.
pub fn first_result_set<Q, R>(items: impl IntoIterator<Item = Either<Q, R>>) -> Vec<R> {
    items
        .into_iter()
        .map_while(|item| item.right())
        .collect()
}

/// BIT(n) values arrive as big-endian bytes.
pub fn bit_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(0u128, |acc, b| (acc << 8) | u128::from(*b))
        .to_string()
}

fn cell_text(row: &MySqlRow, i: usize) -> Result<Option<String>, sqlx::Error> {
    let raw = row.try_get_raw(i)?;
    if raw.is_null() {
        return Ok(None);
    }
    let type_name = raw.type_info().name().to_string();

    let text = match type_name.as_str() {
        "BOOLEAN" => row.try_get::<bool, _>(i)?.to_string(),
        t if t.ends_with(" UNSIGNED") => row.try_get::<u64, _>(i)?.to_string(),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<i64, _>(i)?.to_string()
        }
        "YEAR" => row.try_get_unchecked::<u64, _>(i)?.to_string(),
        "BIT" => bit_text(&row.try_get_unchecked::<Vec<u8>, _>(i)?),
        "FLOAT" => row.try_get::<f32, _>(i)?.to_string(),
        "DOUBLE" => row.try_get::<f64, _>(i)?.to_string(),
        // wider than rust_decimal's 28 digits: the server text is exact anyway
        "DECIMAL" => row
            .try_get::<Decimal, _>(i)
            .map(|d| d.to_string())
            .or_else(|_| row.try_get_unchecked::<String, _>(i))?,
        "DATE" => row.try_get::<NaiveDate, _>(i)?.to_string(),
        "DATETIME" => row.try_get::<NaiveDateTime, _>(i)?.to_string(),
        "TIMESTAMP" => row.try_get::<DateTime<Utc>, _>(i)?.naive_utc().to_string(),
        // negative or beyond 24h durations do not fit NaiveTime
        "TIME" => row
            .try_get::<NaiveTime, _>(i)
            .map(|t| t.to_string())
            .or_else(|_| row.try_get::<MySqlTime, _>(i).map(|t| t.to_string()))?,
        "JSON" => row.try_get::<Value, _>(i)?.to_string(),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            String::from_utf8_lossy(&row.try_get::<Vec<u8>, _>(i)?).into_owned()
        }
        _ => row
            .try_get::<String, _>(i)
            .or_else(|_| row.try_get::<i64, _>(i).map(|v| v.to_string()))
            .or_else(|_| row.try_get::<u64, _>(i).map(|v| v.to_string()))
            .or_else(|_| {
                row.try_get_unchecked::<Vec<u8>, _>(i)
                    .map(|b| String::from_utf8_lossy(&b).into_owned())
            })?,
    };
    Ok(Some(text))
}

fn bind_mysql<'q>(
    q: sqlx::query::Query<'q, MySql, MySqlArguments>,
    v: &Value,
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    match v {
        Value::Null => q.bind::<Option<String>>(None),
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                q.bind(u)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        other => q.bind(other.to_string()),
    }
}
