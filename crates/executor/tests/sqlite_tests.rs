use contable_executor::drivers::sqlite::{Driver as SqliteDriver, normalize_url};
use contable_executor::{Executor, FailureKind, Target};
use serde_json::json;
use sqlx::{Connection, SqliteConnection};
use std::path::PathBuf;
use std::time::Duration;

fn db_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("contable-exec-{}-{}.db", name, std::process::id()))
}

async fn seed(name: &str, statements: &[&str]) -> PathBuf {
    let path = db_path(name);
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let mut conn = SqliteConnection::connect(&url).await.unwrap();
    for stmt in statements {
        sqlx::query(stmt).execute(&mut conn).await.unwrap();
    }
    conn.close().await.unwrap();
    path
}

fn executor_for(path: &PathBuf) -> Executor<SqliteDriver> {
    let driver = SqliteDriver::new(&path.display().to_string()).unwrap();
    Executor::new(driver, Duration::from_secs(5))
}

#[test]
fn urls_are_normalized() {
    assert_eq!(normalize_url(":memory:"), "sqlite::memory:");
    assert_eq!(normalize_url("sqlite://x.db"), "sqlite://x.db");
    assert_eq!(normalize_url("data/dev.db"), "sqlite:data/dev.db");
}

#[tokio::test]
async fn cells_become_strings_and_nulls_stay_null() {
    let driver = SqliteDriver::new(":memory:").unwrap();
    let exec = Executor::new(driver, Duration::from_secs(5));

    let env = exec
        .execute(
            &Target::query("SELECT 1 AS id, 'Bancos' AS cuenta, NULL AS nota, 2.5 AS monto"),
            &[],
        )
        .await;

    let body = serde_json::to_value(&env).unwrap();
    assert_eq!(
        body,
        json!({
            "status": "success",
            "reporte": "SELECT 1 AS id, 'Bancos' AS cuenta, NULL AS nota, 2.5 AS monto",
            "data": [{"id": "1", "cuenta": "Bancos", "nota": null, "monto": "2.5"}]
        })
    );
}

#[tokio::test]
async fn parameterized_select_over_a_view() {
    let path = seed(
        "view",
        &[
            "CREATE TABLE cuentas (Empresa INTEGER, Cuenta TEXT, Saldo REAL)",
            "INSERT INTO cuentas VALUES (1, 'Bancos', 100.5), (1, 'Caja', NULL), (2, 'Bancos', 7)",
            "CREATE VIEW Activo AS SELECT Empresa, Cuenta, Saldo FROM cuentas",
        ],
    )
    .await;
    let exec = executor_for(&path);

    let env = exec
        .execute(
            &Target::query("SELECT * FROM main.Activo WHERE Empresa = ? ORDER BY Cuenta"),
            &[json!(1)],
        )
        .await;

    assert!(env.is_success());
    let data = env.data();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0].get("Cuenta"), Some(Some("Bancos")));
    assert_eq!(data[0].get("Saldo"), Some(Some("100.5")));
    assert_eq!(data[1].get("Saldo"), Some(None));
    for row in data {
        assert_eq!(row.len(), 3);
        assert!(row.iter().all(|(_, v)| v != Some("null") && v != Some("None")));
    }
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn empty_result_is_success_with_no_rows() {
    let path = seed("empty", &["CREATE TABLE Principal (REG_Empresa INTEGER, Nombre_empresa TEXT)"]).await;
    let exec = executor_for(&path);

    let env = exec
        .execute(&Target::query("SELECT REG_Empresa, Nombre_empresa FROM main.Principal"), &[])
        .await;

    assert!(env.is_success());
    assert!(env.data().is_empty());
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn unknown_table_is_object_not_found() {
    let driver = SqliteDriver::new(":memory:").unwrap();
    let exec = Executor::new(driver, Duration::from_secs(5));

    let env = exec
        .execute(&Target::query("SELECT * FROM main.NoSuchView WHERE Empresa = ?"), &[json!(5)])
        .await;

    assert_eq!(env.failure_kind(), Some(FailureKind::ObjectNotFound));
    let body = serde_json::to_value(&env).unwrap();
    assert!(body["detail"].as_str().unwrap().contains("no such table"));
}

#[tokio::test]
async fn syntax_errors_are_sql_failures() {
    let driver = SqliteDriver::new(":memory:").unwrap();
    let exec = Executor::new(driver, Duration::from_secs(5));

    // SQLite has no stored procedures, so CALL is rejected by the parser
    let env = exec
        .execute(&Target::procedure("SP_Generar_BalanceFinanciero"), &[json!(1)])
        .await;

    assert_eq!(env.failure_kind(), Some(FailureKind::Sql));
}

#[tokio::test]
async fn missing_database_file_is_an_error() {
    let path = db_path("missing");
    let _ = std::fs::remove_file(&path);
    let driver = SqliteDriver::new(&format!("sqlite://{}?mode=rw", path.display())).unwrap();
    let exec = Executor::new(driver, Duration::from_secs(5));

    let env = exec.execute(&Target::query("SELECT 1"), &[]).await;

    assert!(!env.is_success());
    assert!(env.data().is_empty());
}
