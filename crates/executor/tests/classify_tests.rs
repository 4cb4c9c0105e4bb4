use contable_executor::error::{
    classify, classify_message, mysql_error_number, sqlite_result_code, sqlstate,
};
use contable_executor::{ExecError, FailureKind, Stage};
use std::io;
use std::time::Duration;

#[test]
fn odbc_login_failure_is_connection() {
    let text = "('28000', \"[28000] [Microsoft][ODBC Driver 18 for SQL Server][SQL Server]Login failed for user 'grupo2'. (18456)\")";
    assert_eq!(classify_message(text), Some(FailureKind::Connection));
}

#[test]
fn firewall_rejection_is_connection() {
    let text = "Cannot open server requested by the login. Client is not allowed to access the server; check firewall rules";
    assert_eq!(classify_message(text), Some(FailureKind::Connection));
}

#[test]
fn missing_driver_is_driver() {
    let text = "('01000', \"[01000] [unixODBC][Driver Manager]Can't open lib 'ODBC Driver 18 for SQL Server' : file not found (0)\")";
    assert_eq!(classify_message(text), Some(FailureKind::Driver));
    assert_eq!(
        classify_message("[IM002] Data source name not found and no default driver specified"),
        Some(FailureKind::Driver)
    );
}

#[test]
fn login_timeout_is_timeout() {
    let text = "('HYT00', '[HYT00] [Microsoft][ODBC Driver 18 for SQL Server]Login timeout expired (0)')";
    assert_eq!(classify_message(text), Some(FailureKind::Timeout));
}

#[test]
fn invalid_object_name_is_not_found() {
    let text = "('42S02', \"[42S02] [Microsoft][ODBC Driver 18 for SQL Server][SQL Server]Invalid object name 'dbo.NoSuchView'. (208)\")";
    assert_eq!(classify_message(text), Some(FailureKind::ObjectNotFound));
    assert_eq!(
        classify_message("no such table: main.NoSuchView"),
        Some(FailureKind::ObjectNotFound)
    );
    assert_eq!(
        classify_message("Table 'contable.Nope' doesn't exist"),
        Some(FailureKind::ObjectNotFound)
    );
}

#[test]
fn unrecognized_text_is_unclassified() {
    assert_eq!(classify_message("Conversion failed when converting date"), None);
    assert_eq!(classify_message(""), None);
}

#[test]
fn io_errors_are_connection_or_timeout() {
    let refused = sqlx::Error::Io(io::Error::from(io::ErrorKind::ConnectionRefused));
    assert_eq!(classify(&refused, Stage::Connect), FailureKind::Connection);

    let timed_out = sqlx::Error::Io(io::Error::from(io::ErrorKind::TimedOut));
    assert_eq!(classify(&timed_out, Stage::Connect), FailureKind::Timeout);
}

#[test]
fn configuration_errors_are_driver() {
    let err = sqlx::Error::Configuration("unknown ssl mode".into());
    assert_eq!(classify(&err, Stage::Connect), FailureKind::Driver);
}

#[test]
fn pool_timeout_is_timeout() {
    assert_eq!(
        classify(&sqlx::Error::PoolTimedOut, Stage::Execute),
        FailureKind::Timeout
    );
}

#[test]
fn unclassified_falls_back_by_stage() {
    let err = sqlx::Error::Protocol("unexpected packet".into());
    assert_eq!(classify(&err, Stage::Connect), FailureKind::Connection);
    assert_eq!(classify(&err, Stage::Execute), FailureKind::Sql);
}

#[test]
fn mysql_error_numbers() {
    assert_eq!(mysql_error_number(1045), Some(FailureKind::Connection));
    assert_eq!(mysql_error_number(1146), Some(FailureKind::ObjectNotFound));
    assert_eq!(mysql_error_number(1305), Some(FailureKind::ObjectNotFound));
    assert_eq!(mysql_error_number(3024), Some(FailureKind::Timeout));
    assert_eq!(mysql_error_number(2059), Some(FailureKind::Driver));
    assert_eq!(mysql_error_number(1064), None);
}

#[test]
fn sqlstates() {
    assert_eq!(sqlstate("28000"), Some(FailureKind::Connection));
    assert_eq!(sqlstate("08S01"), Some(FailureKind::Connection));
    assert_eq!(sqlstate("42S02"), Some(FailureKind::ObjectNotFound));
    assert_eq!(sqlstate("HYT00"), Some(FailureKind::Timeout));
    assert_eq!(sqlstate("IM002"), Some(FailureKind::Driver));
    assert_eq!(sqlstate("42000"), None);
}

#[test]
fn sqlite_codes() {
    assert_eq!(sqlite_result_code(14), Some(FailureKind::Connection));
    assert_eq!(sqlite_result_code(5), Some(FailureKind::Timeout));
    assert_eq!(sqlite_result_code(1), None);
}

#[test]
fn exec_error_kinds() {
    assert_eq!(
        ExecError::ConnectTimeout(Duration::from_secs(30)).kind(),
        FailureKind::Timeout
    );
    assert_eq!(ExecError::InvalidTarget("x;".into()).kind(), FailureKind::Sql);
    let refused = sqlx::Error::Io(io::Error::from(io::ErrorKind::ConnectionRefused));
    assert_eq!(ExecError::Connect(refused).kind(), FailureKind::Connection);
}

#[test]
fn messages_name_the_subject() {
    for kind in [
        FailureKind::Connection,
        FailureKind::Driver,
        FailureKind::Timeout,
        FailureKind::ObjectNotFound,
        FailureKind::Sql,
    ] {
        assert!(kind.describe("SP_Generar_BalanceFinanciero").contains("SP_Generar_BalanceFinanciero"));
    }
}
