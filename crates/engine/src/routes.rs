use crate::config::EngineConfig;
use crate::error::{ApiError, EngineError};
use crate::fs::{DocumentRoot, content_type};
use crate::reports::{REPORTS, ReportRoute};
use crate::views::ViewCatalog;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::{Json, Router, routing::get};
use contable_executor::{Driver, Envelope, Executor, FailureKind, Target};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub struct AppState<D> {
    pub executor: Arc<Executor<D>>,
    pub views: Arc<ViewCatalog>,
    pub directory_sql: Arc<str>,
    pub docroot: DocumentRoot,
    pub cors: CorsLayer,
}

// manual impl: derive would demand `D: Clone`
impl<D> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            views: Arc::clone(&self.views),
            directory_sql: Arc::clone(&self.directory_sql),
            docroot: self.docroot.clone(),
            cors: self.cors.clone(),
        }
    }
}

impl<D: Driver> AppState<D> {
    pub fn new(executor: Executor<D>, config: &EngineConfig) -> Result<Self, EngineError> {
        let views = ViewCatalog::new(&config.schema, config.views.iter().cloned())?;
        let directory_sql = views.directory_query(&config.company_table)?;
        Ok(Self {
            executor: Arc::new(executor),
            views: Arc::new(views),
            directory_sql: directory_sql.into(),
            docroot: DocumentRoot::new(config.document_root.clone(), config.index_file.clone()),
            cors: cors_layer(&config.cors_origins),
        })
    }
}

/// CORS policy for the API. No origins, or `*` among them, allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        tracing::debug!("CORS: allowing any origin");
        return cors.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    tracing::debug!(origins = ?origins, "CORS: allowed origins");
    cors.allow_origin(AllowOrigin::list(allowed))
}

pub fn router<D: Driver>(state: AppState<D>) -> Router {
    let mut router = Router::new()
        .route("/", get(index::<D>))
        .route("/static/{*path}", get(static_file::<D>))
        .route("/api/reporte-vista/{view_name}", get(reporte_vista::<D>))
        .route("/api/empresas", get(empresas::<D>))
        .route("/api/health", get(health::<D>));

    for report in REPORTS {
        router = router.route(
            &report.api_path(),
            get(
                move |State(state): State<AppState<D>>,
                      query: Result<Query<HashMap<String, String>>, QueryRejection>| async move {
                    match query {
                        Ok(Query(query)) => run_report(&state, report, &query).await,
                        Err(rejection) => ApiError::from(rejection).into_response(),
                    }
                },
            ),
        );
    }
    let cors = state.cors.clone();
    router.layer(cors).with_state(state)
}

/// Status code for an executor outcome. Only routes addressing a named
/// object report a missing object as 404; elsewhere it is a server fault.
pub fn status_for(envelope: &Envelope, not_found_is_404: bool) -> StatusCode {
    match envelope.failure_kind() {
        None => StatusCode::OK,
        Some(FailureKind::ObjectNotFound) if not_found_is_404 => StatusCode::NOT_FOUND,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond(envelope: Envelope, not_found_is_404: bool) -> Response {
    (status_for(&envelope, not_found_is_404), Json(envelope)).into_response()
}

async fn run_report<D: Driver>(
    state: &AppState<D>,
    report: &ReportRoute,
    query: &HashMap<String, String>,
) -> Response {
    let params = report.resolve_args(query);
    let envelope = state
        .executor
        .execute(&Target::procedure(report.procedure), &params)
        .await;
    respond(envelope, false)
}

#[derive(Debug, Deserialize)]
pub struct VistaParams {
    pub empresa_id: Option<String>,
}

async fn reporte_vista<D: Driver>(
    State(state): State<AppState<D>>,
    Path(view_name): Path<String>,
    params: Result<Query<VistaParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let sql = state
        .views
        .company_query(&view_name)
        .ok_or_else(|| ApiError::UnknownView(view_name.clone()))?;
    let Query(params) = params?;

    let raw = params
        .empresa_id
        .filter(|v| !v.trim().is_empty())
        .ok_or(ApiError::MissingParam("empresa_id"))?;
    let empresa_id: i64 = raw.trim().parse().map_err(|_| ApiError::InvalidParam {
        name: "empresa_id",
        value: raw.clone(),
    })?;

    let envelope = state
        .executor
        .execute(&Target::query(sql), &[Value::from(empresa_id)])
        .await;

    // allow-listed but absent from the database
    let envelope = match envelope {
        Envelope::Error {
            kind: FailureKind::ObjectNotFound,
            detail,
            ..
        } => Envelope::error(
            FailureKind::ObjectNotFound,
            ApiError::UnknownView(view_name).to_string(),
            detail,
        ),
        other => other,
    };
    Ok(respond(envelope, true))
}

async fn empresas<D: Driver>(State(state): State<AppState<D>>) -> Response {
    let envelope = state
        .executor
        .execute(&Target::query(state.directory_sql.as_ref()), &[])
        .await;
    respond(envelope, false)
}

async fn health<D: Driver>(State(state): State<AppState<D>>) -> Response {
    let envelope = state.executor.execute(&Target::query("SELECT 1"), &[]).await;
    let status = if envelope.is_success() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(envelope)).into_response()
}

async fn index<D: Driver>(State(state): State<AppState<D>>) -> Response {
    match state.docroot.read_index().await {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            tracing::warn!(path = %state.docroot.index_path().display(), error = %e, "index not readable");
            (StatusCode::NOT_FOUND, "Template file not found").into_response()
        }
    }
}

async fn static_file<D: Driver>(
    State(state): State<AppState<D>>,
    Path(path): Path<String>,
) -> Response {
    match state.docroot.read_file(&path).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, content_type(std::path::Path::new(&path)))],
            bytes,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
