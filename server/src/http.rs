use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use platform_api::{ApiError, ApiResult, decode_json, require_json};
use products_hr::{Employee, EmployeeFields, EmployeeId, EmployeeStore, PageRequest};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;

const BANNER: &str = "Employee Management API\n";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EmployeeStore>,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "employee api listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    info!("employee api stopped");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/", get(banner_handler))
        .route("/health", get(health_handler))
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(get_employee)
                .put(update_employee)
                .delete(delete_employee),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(log_request))
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

/// Access log: one event per inbound request, emitted before dispatch.
async fn log_request(request: Request, next: Next) -> Response {
    info!(
        target: "employee_api::access",
        method = %request.method(),
        uri = %request.uri(),
        "request"
    );
    next.run(request).await
}

async fn banner_handler() -> &'static str {
    BANNER
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    employees: usize,
    version: &'static str,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        employees: state.store.len(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn create_employee(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Employee>> {
    let fields: EmployeeFields = decode_json(&body)?;
    Ok(Json(state.store.create(fields)))
}

async fn get_employee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Employee>> {
    let id = parse_id(&raw_id)?;
    let employee = state.store.get(id).inspect_err(|_| log_missing(id))?;
    Ok(Json(employee))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Employee>> {
    let id = parse_id(&raw_id)?;
    require_json(&headers)?;
    let fields: EmployeeFields = decode_json(&body)?;
    let employee = state
        .store
        .update(id, fields)
        .inspect_err(|_| log_missing(id))?;
    Ok(Json(employee))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&raw_id)?;
    state.store.delete(id).inspect_err(|_| log_missing(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unparseable `page`/`pageSize` values fall back to defaults; the first
/// occurrence of a repeated key wins.
async fn list_employees(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Vec<Employee>> {
    let lookup = |key: &str| {
        params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    };
    let request = PageRequest::from_query(lookup("page"), lookup("pageSize"));
    Json(state.store.page(request))
}

fn parse_id(raw: &str) -> ApiResult<EmployeeId> {
    raw.parse::<EmployeeId>().map_err(|_| {
        warn!(id = raw, "invalid employee id");
        ApiError::invalid_input("Invalid employee ID")
    })
}

fn log_missing(id: EmployeeId) {
    warn!(id, "employee not found");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
