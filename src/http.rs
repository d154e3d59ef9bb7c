//! HTTP surface for the BMI advisory pipeline.
//!
//! Axum-based JSON API standing in for the original form boundary:
//! calculate/recommend/advise endpoints plus plain health, info, and
//! metrics.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::advisor::{BmiAdvisor, RECOMMENDATION_UNAVAILABLE_MESSAGE};
use crate::config::Config;
use crate::error::CoachError;
use crate::recommend::{RecommendationRequest, RecommendationResponse};

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub config: Arc<Config>,
    pub advisor: Arc<BmiAdvisor>,
    pub metrics: Arc<Mutex<HttpMetrics>>,
}

/// Metrics for HTTP server
#[derive(Debug, Clone, Default)]
pub struct HttpMetrics {
    pub total_requests: u64,
    pub calculations_total: u64,
    pub recommendations_total: u64,
    pub errors_total: u64,
}

impl IntoResponse for CoachError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            CoachError::Validation { errors } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "validation", "fields": errors }),
            ),
            CoachError::Calculation { message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "calculation",
                    "title": "Invalid calculation",
                    "message": message
                }),
            ),
            CoachError::Recommendation { message } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "recommendation",
                    "title": "AI Error",
                    "message": RECOMMENDATION_UNAVAILABLE_MESSAGE,
                    "detail": message
                }),
            ),
            CoachError::Config { message } | CoachError::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal", "message": message }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Health check endpoint
async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Info endpoint
async fn info_handler(State(state): State<HttpState>) -> impl IntoResponse {
    let provider_name = state.advisor.recommender_name();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        json!({
            "provider": {
                "name": provider_name,
                "model": state.config.provider.resolved_model(provider_name),
                "timeout_ms": state.config.provider.timeout_ms,
                "retries": state.config.provider.retries
            },
            "server": {
                "bind": state.config.server.bind
            }
        })
        .to_string(),
    )
}

/// Metrics endpoint
async fn metrics_handler(State(state): State<HttpState>) -> impl IntoResponse {
    let metrics = state.metrics.lock().await.clone();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        json!({
            "metrics_version": "1",
            "total_requests": metrics.total_requests,
            "calculations_total": metrics.calculations_total,
            "recommendations_total": metrics.recommendations_total,
            "errors_total": metrics.errors_total
        })
        .to_string(),
    )
}

/// Form submissions arrive as JSON, but browsers serialize number inputs as
/// strings; both shapes are accepted and coerced by the validator.
#[derive(Debug, Deserialize)]
struct MeasurementsBody {
    weight: Value,
    height: Value,
}

fn raw_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

async fn calculate_handler(
    State(state): State<HttpState>,
    Json(body): Json<MeasurementsBody>,
) -> Response {
    {
        let mut metrics = state.metrics.lock().await;
        metrics.total_requests += 1;
        metrics.calculations_total += 1;
    }

    match state
        .advisor
        .calculate_raw(&raw_field(&body.weight), &raw_field(&body.height))
    {
        Ok(result) => Json(result).into_response(),
        Err(err) => {
            state.metrics.lock().await.errors_total += 1;
            err.into_response()
        }
    }
}

async fn recommend_handler(
    State(state): State<HttpState>,
    Json(request): Json<RecommendationRequest>,
) -> Response {
    {
        let mut metrics = state.metrics.lock().await;
        metrics.total_requests += 1;
        metrics.recommendations_total += 1;
    }

    match state.advisor.recommend(request.bmi).await {
        Ok(recommendations) => Json(RecommendationResponse { recommendations }).into_response(),
        Err(err) => {
            state.metrics.lock().await.errors_total += 1;
            err.into_response()
        }
    }
}

/// One full interaction cycle. Provider failures degrade to a partial body:
/// the BMI result is present, recommendations absent, and an error message
/// carried alongside, mirroring the form's behavior of keeping the result
/// on screen.
async fn advise_handler(
    State(state): State<HttpState>,
    Json(body): Json<MeasurementsBody>,
) -> Response {
    {
        let mut metrics = state.metrics.lock().await;
        metrics.total_requests += 1;
        metrics.calculations_total += 1;
        metrics.recommendations_total += 1;
    }

    match state
        .advisor
        .advise_raw(&raw_field(&body.weight), &raw_field(&body.height))
        .await
    {
        Ok(advice) => {
            if advice.recommendation_error.is_some() {
                state.metrics.lock().await.errors_total += 1;
            }
            Json(advice).into_response()
        }
        Err(err) => {
            state.metrics.lock().await.errors_total += 1;
            err.into_response()
        }
    }
}

pub fn build_router(state: HttpState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/calculate", post(calculate_handler))
        .route("/api/recommend", post(recommend_handler))
        .route("/api/advise", post(advise_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: Arc<Config>, advisor: Arc<BmiAdvisor>) -> anyhow::Result<()> {
    let bind: std::net::SocketAddr = config.server.bind.parse()?;
    let state = HttpState {
        config,
        advisor,
        metrics: Arc::new(Mutex::new(HttpMetrics::default())),
    };
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("HTTP server listening on {bind}");
    axum::serve(listener, app).await?;
    Ok(())
}
