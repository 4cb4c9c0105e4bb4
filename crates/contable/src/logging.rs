use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// timestamp LEVEL target - message
    Compact,
    /// JSON lines
    Json,
}

fn build_env_filter(level: &str) -> Result<EnvFilter, String> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    // sqlx logs every statement at info
    let directives = format!("{},sqlx::query=warn", level);
    EnvFilter::try_new(&directives).map_err(|e| format!("invalid log filter '{}': {}", directives, e))
}

/// Install the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), String> {
    let filter = build_env_filter(level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| format!("logging already initialised: {}", e))
}
