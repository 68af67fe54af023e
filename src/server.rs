//! HTTP surface over the [`Calculator`](crate::builder::Calculator)
//!
//! Routes:
//! - `POST /function/{evaluate,derive,integrate,simplify}` with body
//!   `{"function": "...", "variable": "x", "value": 3.0}`
//! - `GET /health`
//! - `GET /examples`
//!
//! Input and domain errors answer 400, anything else 500. Failure bodies are
//! `{"detail": "..."}`.

use std::env;
use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

use crate::builder::{Calculator, Operation, OperationRequest, OperationResult};
use crate::catalog::{EXAMPLES, Examples};
use crate::error::CalcError;
use crate::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES};

/// Daemon settings; every field falls back to its default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8000".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `FUNCALC_ADDR`, `FUNCALC_MAX_DEPTH` and `FUNCALC_MAX_NODES`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = env::var("FUNCALC_ADDR") {
            config.addr = addr;
        }
        if let Some(depth) = limit_from_env("FUNCALC_MAX_DEPTH") {
            config.max_depth = depth;
        }
        if let Some(nodes) = limit_from_env("FUNCALC_MAX_NODES") {
            config.max_nodes = nodes;
        }
        config
    }

    pub fn calculator(&self) -> Calculator {
        Calculator::new()
            .max_depth(self.max_depth)
            .max_nodes(self.max_nodes)
    }
}

fn limit_from_env(key: &str) -> Option<usize> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("ignoring {}={:?}: not a non-negative integer", key, raw);
            None
        }
    }
}

/// JSON body of the `/function/*` routes
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionBody {
    pub function: String,
    #[serde(default)]
    pub variable: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub engine_version: &'static str,
    pub message: &'static str,
}

/// Error answered to the caller as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<CalcError> for ApiError {
    fn from(err: CalcError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Build the application router
pub fn router(calculator: Calculator) -> Router {
    Router::new()
        .route("/function/evaluate", post(evaluate))
        .route("/function/derive", post(derive))
        .route("/function/integrate", post(integrate))
        .route("/function/simplify", post(simplify))
        .route("/health", get(health))
        .route("/examples", get(examples))
        .with_state(Arc::new(calculator))
}

/// Bind `config.addr` and serve until the process stops
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(&config.addr).await?;
    info!("funcalc listening on {}", listener.local_addr()?);
    axum::serve(listener, router(config.calculator())).await
}

type Shared = State<Arc<Calculator>>;

async fn evaluate(
    State(calc): Shared,
    Json(body): Json<FunctionBody>,
) -> Result<Json<OperationResult>, ApiError> {
    run(calc, Operation::Evaluate, body).await
}

async fn derive(
    State(calc): Shared,
    Json(body): Json<FunctionBody>,
) -> Result<Json<OperationResult>, ApiError> {
    run(calc, Operation::Derive, body).await
}

async fn integrate(
    State(calc): Shared,
    Json(body): Json<FunctionBody>,
) -> Result<Json<OperationResult>, ApiError> {
    run(calc, Operation::Integrate, body).await
}

async fn simplify(
    State(calc): Shared,
    Json(body): Json<FunctionBody>,
) -> Result<Json<OperationResult>, ApiError> {
    run(calc, Operation::Simplify, body).await
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        engine_version: env!("CARGO_PKG_VERSION"),
        message: "symbolic calculus engine is running",
    })
}

async fn examples() -> Json<Examples> {
    Json(EXAMPLES)
}

/// Run the engine off the async workers; a panic inside it becomes a 500
async fn run(
    calc: Arc<Calculator>,
    operation: Operation,
    body: FunctionBody,
) -> Result<Json<OperationResult>, ApiError> {
    let request = OperationRequest {
        function: body.function,
        operation,
        value: body.value,
        variable: body.variable,
    };
    let function = request.function.clone();

    let outcome = tokio::task::spawn_blocking(move || calc.run(&request))
        .await
        .map_err(|join| CalcError::Internal(join.to_string()))
        .and_then(|result| result);

    match outcome {
        Ok(result) => Ok(Json(result)),
        Err(err) if err.is_client_error() => {
            debug!("{} rejected '{}': {}", operation, function, err);
            Err(err.into())
        }
        Err(err) => {
            error!("{} failed for '{}': {}", operation, function, err);
            Err(ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: "internal engine error".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status() {
        let err = ApiError::from(CalcError::MissingValue);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let err = ApiError::from(CalcError::division_by_zero("x - 1"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.detail, "division by zero in 'x - 1'");
        let err = ApiError::from(CalcError::Internal("boom".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_config_defaults() {
        let config: ServerConfig = serde_json::from_str(r#"{"max_depth": 20}"#).unwrap();
        assert_eq!(config.addr, "0.0.0.0:8000");
        assert_eq!(config.max_depth, 20);
        assert_eq!(config.max_nodes, DEFAULT_MAX_NODES);
    }
}
