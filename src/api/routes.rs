//! HTTP route handlers for Axum.

use axum::{extract::State, Json};
use tokio::task;
use tracing::{debug, info, instrument, warn};

use crate::api::types::{
    AnalyzeRequest, AnalyzeResponse, ApiError, FeedbackRequest, FeedbackResponse, HealthDto,
};

use super::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Probing may read artifacts from disk, so it runs on the blocking pool.
pub async fn health(State(state): State<AppState>) -> Json<HealthDto> {
    let analyzer = state.analyzer.clone();
    let model_loaded = task::spawn_blocking(move || analyzer.is_model_available())
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "model probe task failed");
            false
        });
    Json(HealthDto {
        status: "ok",
        model_loaded,
    })
}

#[instrument(skip_all)]
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<AnalyzeResponse> {
    debug!(report_id = req.report_id.as_deref().unwrap_or("-"), "analyze request");
    if req.text.trim().is_empty() {
        return Err(ApiError::EmptyText);
    }
    let result = state.analyzer.analyze(&req.text).await?;
    Ok(Json(AnalyzeResponse {
        analysis_id: None,
        flags: result.flags,
        metadata: result.metadata,
    }))
}

/// Acknowledge reviewer feedback. Nothing is stored.
pub async fn feedback(Json(req): Json<FeedbackRequest>) -> Json<FeedbackResponse> {
    info!(
        analysis_id = %req.analysis_id,
        flag_index = req.flag_index,
        user_action = %req.user_action,
        corrected_label = req.corrected_label.as_deref().unwrap_or("-"),
        has_notes = req.notes.is_some(),
        "feedback received"
    );
    Json(FeedbackResponse {
        success: true,
        message: "Feedback received.",
    })
}
