use std::path::{Path, PathBuf};

pub const DEFAULT_VIEWS: &[&str] = &[
    "Activo",
    "Pasivo",
    "Patrimonio",
    "view_ActivoCorriente",
    "view_ActivoNoCorriente",
    "view_PasivoCorriente",
    "view_PasivoNoCorriente",
];

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
    pub document_root: PathBuf,
    pub index_file: String,
    /// Schema that qualifies view and directory-table names.
    pub schema: String,
    /// Views reachable through `/api/reporte-vista/{view}`.
    pub views: Vec<String>,
    /// Directory table listing companies.
    pub company_table: String,
    /// Origins allowed to call the API from a browser. Empty or `*` allows any.
    pub cors_origins: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            document_root: PathBuf::from("static"),
            index_file: "index.html".to_string(),
            schema: "dbo".to_string(),
            views: DEFAULT_VIEWS.iter().map(|v| v.to_string()).collect(),
            company_table: "Principal".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn set_document_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.document_root = root.as_ref().to_path_buf();
        self
    }

    pub fn set_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn set_views<I, S>(mut self, views: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.views = views.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_company_table(mut self, table: impl Into<String>) -> Self {
        self.company_table = table.into();
        self
    }

    pub fn set_cors_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn http(&self) -> HttpServerConfig {
        self.into()
    }
}

#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl HttpServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&EngineConfig> for HttpServerConfig {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
        }
    }
}
