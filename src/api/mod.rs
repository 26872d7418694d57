mod cli;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::core::{
    AllocationState, BudgetData, Error, build_report, format_budget_summary,
};

pub use cli::{Cli, Command, run};

#[derive(Clone)]
struct AppState {
    data: Arc<BudgetData>,
}

/// Scenario overrides applied on top of the payload defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportPayload {
    pub budget: Option<f64>,
    pub stage: Option<String>,
    pub allocations: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ReportQuery {
    budget: Option<f64>,
    stage: Option<String>,
}

impl From<ReportQuery> for ReportPayload {
    fn from(query: ReportQuery) -> Self {
        Self {
            budget: query.budget,
            stage: query.stage,
            allocations: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Builds a snapshot from the payload defaults and applies the requested
/// overrides. Budgets must be presets and stages must be known.
pub fn state_from_payload(
    data: &BudgetData,
    payload: ReportPayload,
) -> Result<AllocationState, String> {
    let mut state = AllocationState::from_defaults(data);

    if let Some(budget) = payload.budget {
        if !data.config.is_preset_budget(budget) {
            return Err(Error::InvalidBudget(budget).to_string());
        }
        state = state.with_budget(budget);
    }

    if let Some(stage) = payload.stage {
        if !data.analytics.has_stage(&stage) {
            return Err(Error::UnknownStage(stage).to_string());
        }
        state = state.with_stage(stage);
    }

    for (category_id, percent) in payload.allocations.unwrap_or_default() {
        state = state
            .with_percent(&category_id, percent)
            .map_err(|e| e.to_string())?;
    }

    Ok(state)
}

pub fn router(data: BudgetData) -> Router {
    let state = AppState {
        data: Arc::new(data),
    };
    Router::new()
        .route("/api/budget", get(budget_handler))
        .route("/api/summary", get(summary_handler))
        .route(
            "/api/report",
            get(report_get_handler).post(report_post_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(host: &str, port: u16, data: BudgetData) -> std::io::Result<()> {
    let ip = host
        .parse::<std::net::IpAddr>()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let addr = SocketAddr::new(ip, port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "budget allocator API listening");

    axum::serve(listener, router(data)).await
}

async fn budget_handler(State(state): State<AppState>) -> Response {
    json_response(StatusCode::OK, state.data.as_ref())
}

async fn summary_handler(State(state): State<AppState>) -> Response {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format_budget_summary(&state.data),
    ))
}

async fn report_get_handler(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Response {
    report_handler_impl(&state, query.into())
}

async fn report_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<ReportPayload>,
) -> Response {
    report_handler_impl(&state, payload)
}

fn report_handler_impl(state: &AppState, payload: ReportPayload) -> Response {
    debug!(?payload, "report requested");
    let allocation = match state_from_payload(&state.data, payload) {
        Ok(allocation) => allocation,
        Err(msg) => {
            warn!(error = %msg, "rejected report request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    json_response(StatusCode::OK, build_report(&state.data, &allocation))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BalanceStatus, HISTORY_SEED, budget_data};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn sample_data() -> BudgetData {
        budget_data(
            HISTORY_SEED,
            NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date"),
        )
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes()
            .to_vec()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).expect("body should be JSON")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request")
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    #[test]
    fn state_from_payload_applies_overrides() {
        let data = sample_data();
        let payload: ReportPayload = serde_json::from_str(
            r#"{"budget": 250000, "stage": "Growth", "allocations": {"marketing": 30, "rd": 5}}"#,
        )
        .expect("valid payload");

        let state = state_from_payload(&data, payload).expect("valid overrides");
        assert_eq!(state.budget(), 250_000.0);
        assert_eq!(state.stage(), "Growth");
        assert_eq!(state.percent("marketing"), Some(30.0));
        assert_eq!(state.percent("rd"), Some(5.0));
        assert_eq!(state.percent("engineering"), Some(35.0));
    }

    #[test]
    fn state_from_payload_rejects_non_preset_budget() {
        let payload = ReportPayload {
            budget: Some(123_456.0),
            ..Default::default()
        };
        let err = state_from_payload(&sample_data(), payload).expect_err("must reject budget");
        assert!(err.contains("preset"), "unexpected message: {err}");
    }

    #[test]
    fn state_from_payload_rejects_unknown_stage_and_category() {
        let payload = ReportPayload {
            stage: Some("Series Z".to_string()),
            ..Default::default()
        };
        let err = state_from_payload(&sample_data(), payload).expect_err("must reject stage");
        assert!(err.contains("Series Z"));

        let payload = ReportPayload {
            allocations: Some(BTreeMap::from([("legal".to_string(), 10.0)])),
            ..Default::default()
        };
        let err = state_from_payload(&sample_data(), payload).expect_err("must reject category");
        assert!(err.contains("legal"));
    }

    #[tokio::test]
    async fn budget_endpoint_returns_payload() {
        let response = router(sample_data())
            .oneshot(get_request("/api/budget"))
            .await
            .expect("request should complete");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
        let json = body_json(response).await;
        assert_eq!(json["config"]["defaultBudget"], 100_000.0);
        assert_eq!(json["config"]["categories"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["analytics"]["history"].as_array().map(Vec::len), Some(24));
        assert_eq!(json["analytics"]["defaultStage"], "Series A");
    }

    #[tokio::test]
    async fn summary_endpoint_returns_text() {
        let response = router(sample_data())
            .oneshot(get_request("/api/summary"))
            .await
            .expect("request should complete");

        assert_eq!(response.status(), StatusCode::OK);
        let text = String::from_utf8(body_bytes(response).await).expect("utf-8 body");
        assert!(text.starts_with("Budget Allocator Configuration"));
        assert!(text.contains("Default Stage: Series A"));
    }

    #[tokio::test]
    async fn report_get_uses_query_overrides() {
        let response = router(sample_data())
            .oneshot(get_request("/api/report?budget=500000&stage=Series%20B"))
            .await
            .expect("request should complete");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["budget"], 500_000.0);
        assert_eq!(json["stage"], "Series B");
        assert_eq!(json["allocatedAmount"], 500_000.0);
    }

    #[tokio::test]
    async fn report_post_reports_over_allocation_and_deviation() {
        let response = router(sample_data())
            .oneshot(post_json(
                "/api/report",
                r#"{"allocations": {"sales": 30}}"#,
            ))
            .await
            .expect("request should complete");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["totalPercent"], 115.0);
        assert_eq!(json["balance"]["status"], "over");
        assert_eq!(json["comparison"]["status"], "deviation");
        assert_eq!(json["comparison"]["category"], "Sales");
        assert_eq!(json["comparison"]["deviation"], 10);
        assert_eq!(json["comparison"]["direction"], "above");
    }

    #[tokio::test]
    async fn report_post_rejects_out_of_range_percent() {
        let response = router(sample_data())
            .oneshot(post_json(
                "/api/report",
                r#"{"allocations": {"sales": 130}}"#,
            ))
            .await
            .expect("request should complete");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        let error = json["error"].as_str().expect("error message");
        assert!(error.contains("sales"), "unexpected message: {error}");
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let response = router(sample_data())
            .oneshot(get_request("/api/nope"))
            .await
            .expect("request should complete");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Not found");
    }

    #[test]
    fn default_state_from_empty_payload_is_balanced() {
        let data = sample_data();
        let state = state_from_payload(&data, ReportPayload::default()).expect("defaults");
        assert_eq!(state.balance(), BalanceStatus::Balanced);
        assert_eq!(state.stage(), "Series A");
    }
}
