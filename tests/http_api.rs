use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

use bmi_coach::advisor::BmiAdvisor;
use bmi_coach::config::Config;
use bmi_coach::error::{CoachError, Result};
use bmi_coach::http::{HttpMetrics, HttpState, build_router};
use bmi_coach::recommend::Recommender;

struct FixedRecommender(&'static str);

#[async_trait]
impl Recommender for FixedRecommender {
    async fn recommend(&self, _bmi: f64) -> Result<String> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct FailingRecommender;

#[async_trait]
impl Recommender for FailingRecommender {
    async fn recommend(&self, _bmi: f64) -> Result<String> {
        Err(CoachError::Recommendation {
            message: "provider offline".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn router_with(recommender: Arc<dyn Recommender>) -> Router {
    let state = HttpState {
        config: Arc::new(Config::default()),
        advisor: Arc::new(BmiAdvisor::new(recommender)),
        metrics: Arc::new(Mutex::new(HttpMetrics::default())),
    };
    build_router(state)
}

async fn post_json(router: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_returns_ok() {
    let response = router_with(Arc::new(FixedRecommender("x")))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn calculate_returns_classified_result() {
    let (status, body) = post_json(
        router_with(Arc::new(FixedRecommender("x"))),
        "/api/calculate",
        r#"{"weight": 65, "height": 170}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "22.5");
    assert_eq!(body["category"], "Normal");
    assert_eq!(body["color"], "green");
}

#[tokio::test]
async fn calculate_accepts_form_style_strings() {
    let (status, body) = post_json(
        router_with(Arc::new(FixedRecommender("x"))),
        "/api/calculate",
        r#"{"weight": "65", "height": "170"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "22.5");
}

#[tokio::test]
async fn calculate_rejects_bad_fields_with_messages() {
    let (status, body) = post_json(
        router_with(Arc::new(FixedRecommender("x"))),
        "/api/calculate",
        r#"{"weight": "-5", "height": "abc"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");
    let fields = body["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["field"], "weight");
    assert_eq!(fields[0]["message"], "Weight must be a positive number.");
    assert_eq!(fields[1]["field"], "height");
    assert_eq!(fields[1]["message"], "Please enter a valid number.");
}

#[tokio::test]
async fn recommend_honors_wire_contract() {
    let (status, body) = post_json(
        router_with(Arc::new(FixedRecommender("Eat more greens."))),
        "/api/recommend",
        r#"{"bmi": 22.5}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"], "Eat more greens.");
}

#[tokio::test]
async fn recommend_surfaces_provider_failure_as_bad_gateway() {
    let (status, body) = post_json(
        router_with(Arc::new(FailingRecommender)),
        "/api/recommend",
        r#"{"bmi": 22.5}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "recommendation");
    assert_eq!(body["title"], "AI Error");
}

#[tokio::test]
async fn advise_returns_full_cycle() {
    let (status, body) = post_json(
        router_with(Arc::new(FixedRecommender("Eat more greens."))),
        "/api/advise",
        r#"{"weight": 65, "height": 170}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "22.5");
    assert_eq!(body["category"], "Normal");
    assert_eq!(body["recommendations"], "Eat more greens.");
    assert!(body.get("recommendation_error").is_none());
}

#[tokio::test]
async fn advise_degrades_to_partial_body_on_provider_failure() {
    let (status, body) = post_json(
        router_with(Arc::new(FailingRecommender)),
        "/api/advise",
        r#"{"weight": 65, "height": 170}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "22.5");
    assert!(body.get("recommendations").is_none());
    assert_eq!(
        body["recommendation_error"],
        "Could not fetch recommendations at this time. Please try again later."
    );
}

#[tokio::test]
async fn metrics_count_requests_and_errors() {
    let router = router_with(Arc::new(FixedRecommender("x")));

    let (status, _) = post_json(
        router.clone(),
        "/api/calculate",
        r#"{"weight": "0", "height": "170"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total_requests"], 1);
    assert_eq!(body["errors_total"], 1);
}
