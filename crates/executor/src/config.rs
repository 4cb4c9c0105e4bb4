use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Which SQL backend the executor talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    MySql,
    Sqlite,
}

impl DriverKind {
    /// Network backends need host and credentials; file backends only need a path.
    pub fn is_networked(self) -> bool {
        matches!(self, DriverKind::MySql)
    }
}

impl FromStr for DriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DriverKind::MySql),
            "sqlite" | "sqlite3" => Ok(DriverKind::Sqlite),
            other => Err(format!("unsupported driver '{}'", other)),
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::MySql => f.write_str("mysql"),
            DriverKind::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Connection parameters, read once at startup and shared read-only afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub driver: DriverKind,
    pub host: String,
    pub port: u16,
    /// Database name, or the file path / URL for SQLite.
    pub database: String,
    pub user: String,
    pub password: String,
    pub encrypt: bool,
    pub connect_timeout: Duration,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("encrypt", &self.encrypt)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl DbConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config through `lookup`. Empty values count as absent, and every
    /// missing variable is reported in a single error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut missing = Vec::new();

        let driver_raw = get("DB_DRIVER");
        let database = get("DB_NAME");
        if driver_raw.is_none() {
            missing.push("DB_DRIVER".to_string());
        }
        if database.is_none() {
            missing.push("DB_NAME".to_string());
        }

        let driver = match driver_raw.as_deref().map(DriverKind::from_str) {
            Some(Ok(kind)) => Some(kind),
            Some(Err(reason)) => {
                return Err(ConfigError::Invalid {
                    var: "DB_DRIVER".into(),
                    reason,
                });
            }
            None => None,
        };

        let networked = driver.map(DriverKind::is_networked).unwrap_or(true);
        let mut required = |key: &str| -> String {
            match get(key) {
                Some(v) => v,
                None => {
                    if networked {
                        missing.push(key.to_string());
                    }
                    String::new()
                }
            }
        };
        let host = required("DB_SERVER");
        let user = required("DB_USER");
        let password = required("DB_PASSWORD");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let port = parse_or("DB_PORT", get("DB_PORT"), DEFAULT_PORT)?;
        let timeout_secs = parse_or("DB_TIMEOUT_SECS", get("DB_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS)?;
        let encrypt = match get("DB_ENCRYPT") {
            None => true,
            Some(v) => parse_flag(&v).ok_or_else(|| ConfigError::Invalid {
                var: "DB_ENCRYPT".into(),
                reason: format!("expected a boolean, got '{}'", v),
            })?,
        };

        Ok(DbConfig {
            // both checked above
            driver: driver.unwrap_or(DriverKind::MySql),
            host,
            port,
            database: database.unwrap_or_default(),
            user,
            password,
            encrypt,
            connect_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T: FromStr>(var: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: var.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
