use crate::config::HttpServerConfig;
use axum::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct HttpServer {
    router: Arc<Router>,
    config: HttpServerConfig,
}

impl HttpServer {
    pub fn new(router: Router, config: HttpServerConfig) -> Self {
        Self {
            router: Arc::new(router),
            config,
        }
    }

    /// Serve until Ctrl-C. Requests in flight are allowed to finish.
    pub async fn start(&self) -> std::io::Result<()> {
        let addr = self.config.addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(addr = %addr, "listening");

        axum::serve(listener, (*self.router).clone())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c; shutdown only by kill");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
