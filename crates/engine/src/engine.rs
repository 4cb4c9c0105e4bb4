use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::http::HttpServer;
use crate::routes::{self, AppState};
use contable_executor::{Backend, DbConfig, Executor};

pub struct Engine {
    config: EngineConfig,
    db: DbConfig,
}

impl Engine {
    pub fn new_with_config(config: EngineConfig, db: DbConfig) -> Self {
        Self { config, db }
    }

    /// Shared request state for the configured backend.
    pub fn state(&self) -> Result<AppState<Backend>, EngineError> {
        let backend =
            Backend::from_config(&self.db).map_err(|e| EngineError::Database(e.to_string()))?;
        let executor = Executor::new(backend, self.db.connect_timeout);
        AppState::new(executor, &self.config)
    }

    pub async fn run(&mut self) -> Result<(), EngineError> {
        let state = self.state()?;
        tracing::info!(
            driver = %self.db.driver,
            database = %self.db.database,
            schema = %self.config.schema,
            views = state.views.views().len(),
            "engine configured"
        );
        let router = routes::router(state);
        HttpServer::new(router, self.config.http()).start().await?;
        Ok(())
    }
}
