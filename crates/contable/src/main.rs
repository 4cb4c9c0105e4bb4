mod logging;

use clap::Parser;
use contable_engine::config::{DEFAULT_VIEWS, EngineConfig};
use contable_engine::engine::Engine;
use contable_executor::DbConfig;
use logging::LogFormat;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "contable",
    version,
    about = "JSON API over accounting report procedures and views",
    disable_help_subcommand = true
)]
struct Cli {
    /// Start the HTTP server at HOST:PORT
    #[arg(short = 'S', value_name = "HOST:PORT", default_value = "127.0.0.1:8000")]
    serve: String,

    /// Directory holding the web interface
    #[arg(short = 't', long = "docroot", value_name = "DIR")]
    docroot: Option<PathBuf>,

    /// Schema qualifying view and directory-table names
    #[arg(long, env = "DB_SCHEMA", default_value = "dbo")]
    schema: String,

    /// Views reachable through /api/reporte-vista (comma separated)
    #[arg(long, env = "REPORT_VIEWS", value_delimiter = ',')]
    views: Vec<String>,

    /// Table listing companies for /api/empresas
    #[arg(long, env = "COMPANY_TABLE", default_value = "Principal")]
    company_table: String,

    /// Origins allowed to call the API from a browser (comma separated, `*` for any)
    #[arg(long = "cors-origin", env = "CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Base log level; RUST_LOG overrides it
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

fn parse_host_port(s: &str) -> Result<(String, u16), String> {
    if let Some(rest) = s.strip_prefix('[') {
        // bracketed IPv6: [host]:port
        if let Some(end) = rest.find(']') {
            let host = &rest[..end];
            let remain = &rest[end + 1..];
            let port = remain
                .strip_prefix(':')
                .ok_or("missing port after IPv6 host")?;
            let port: u16 = port.parse().map_err(|_| "invalid port".to_string())?;
            return Ok((host.to_string(), port));
        }
        return Err("invalid bracketed IPv6 address".to_string());
    }
    let mut parts = s.rsplitn(2, ':');
    let port_str = parts.next().ok_or("missing port")?;
    let host = parts.next().ok_or("missing host")?;
    let port: u16 = port_str.parse().map_err(|_| "invalid port".to_string())?;
    Ok((host.to_string(), port))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(&cli.log_level, cli.log_format) {
        eprintln!("{}", e);
        std::process::exit(2);
    }

    let mut config = EngineConfig::default()
        .set_schema(cli.schema)
        .set_company_table(cli.company_table)
        .set_cors_origins(cli.cors_origins.into_iter().filter(|o| !o.trim().is_empty()));
    match parse_host_port(&cli.serve) {
        Ok((host, port)) => {
            config.host = host;
            config.port = port;
        }
        Err(e) => {
            eprintln!("-S expects HOST:PORT (e.g. 127.0.0.1:8000), error: {}", e);
            std::process::exit(2);
        }
    }
    if let Some(docroot) = cli.docroot {
        config = config.set_document_root(docroot);
    }
    let views: Vec<String> = cli
        .views
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    config = if views.is_empty() {
        config.set_views(DEFAULT_VIEWS.iter().copied())
    } else {
        config.set_views(views)
    };

    // credentials come only from the environment
    let db = match DbConfig::from_env() {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "database configuration incomplete");
            std::process::exit(2);
        }
    };

    let mut engine = Engine::new_with_config(config, db);
    if let Err(e) = engine.run().await {
        tracing::error!(error = %e, "engine stopped");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_port_forms() {
        assert_eq!(parse_host_port("0.0.0.0:8000"), Ok(("0.0.0.0".into(), 8000)));
        assert_eq!(parse_host_port("[::1]:9000"), Ok(("::1".into(), 9000)));
        assert!(parse_host_port("localhost").is_err());
        assert!(parse_host_port("localhost:http").is_err());
    }

    #[test]
    fn cli_reads_view_list() {
        let cli = Cli::try_parse_from([
            "contable",
            "-S",
            "0.0.0.0:8080",
            "--views",
            "Activo,Pasivo",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.serve, "0.0.0.0:8080");
        assert_eq!(cli.views, vec!["Activo", "Pasivo"]);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn cli_reads_cors_origins() {
        let cli = Cli::try_parse_from([
            "contable",
            "--cors-origin",
            "http://a.example,http://b.example",
        ])
        .unwrap();
        assert_eq!(cli.cors_origins, vec!["http://a.example", "http://b.example"]);
    }
}
