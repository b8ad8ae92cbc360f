// HTTP route handlers for the Proctor API

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use proctor_common::types::{EvaluateRequest, JudgeResult};
use proctor_judge::service::{is_trivial_code, FEEDBACK_TRIVIAL_CODE};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::metrics;
use crate::AppState;

pub const FEEDBACK_CUSTOM_RUN: &str = "Custom input executed (not evaluated)";

/// Response for custom-input dry runs; nothing is judged
fn custom_run_result() -> JudgeResult {
    JudgeResult {
        passed: true,
        pass_count: 0,
        total_tests: 0,
        results: Vec::new(),
        feedback: FEEDBACK_CUSTOM_RUN.to_string(),
    }
}

/// POST /evaluate - Judge a submission synchronously
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EvaluateRequest>,
) -> Json<JudgeResult> {
    let submission_id = Uuid::new_v4();

    if payload.is_custom_run() {
        // Placeholder code is rejected even on dry runs
        if is_trivial_code(&payload.code) {
            info!(submission_id = %submission_id, "Rejected trivial custom run");
            return Json(JudgeResult::rejected(FEEDBACK_TRIVIAL_CODE));
        }
        info!(submission_id = %submission_id, "Custom run, skipping judge");
        metrics::CUSTOM_RUNS_TOTAL
            .with_label_values(&[payload.language.as_str()])
            .inc();
        return Json(custom_run_result());
    }

    let span = tracing::info_span!(
        "submission",
        submission_id = %submission_id,
        problem_id = %payload.problem_id,
        language = %payload.language,
    );

    let started = Instant::now();
    let result = state
        .judge
        .run(&payload.code, &payload.language, &payload.problem_id)
        .instrument(span.clone())
        .await;
    metrics::record_submission(&result, started.elapsed().as_secs_f64());

    span.in_scope(|| {
        info!(
            verdict = result.verdict().as_str(),
            pass_count = result.pass_count,
            total_tests = result.total_tests,
            "Submission evaluated"
        );
    });

    Json(result)
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /problems - List known problem ids
pub async fn list_problems(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.judge.store().list_problem_ids().await {
        Ok(ids) => (StatusCode::OK, Json(serde_json::json!({ "problems": ids }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list problems");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to list problems: {}", e)
                })),
            )
                .into_response()
        }
    }
}

/// GET /problems/:problem_id - Candidate view of a problem (hidden cases removed)
pub async fn get_problem(
    State(state): State<Arc<AppState>>,
    Path(problem_id): Path<String>,
) -> impl IntoResponse {
    match state.judge.store().get_problem(&problem_id).await {
        Ok(Some(problem)) => (StatusCode::OK, Json(problem.candidate_view())).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Problem not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(problem_id = %problem_id, error = %e, "Failed to fetch problem");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to fetch problem: {}", e)
                })),
            )
                .into_response()
        }
    }
}

/// GET /metrics - Prometheus scrape endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}
