use super::board::{BoardError, MoveOutcome, PipelineBoard};
use super::service::{load_board, push_update, remove_lead, with_board};
use super::types::{DragEnd, Lead};
use crate::core::shared::{ApiError, AppState, CurrentUser};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    #[serde(flatten)]
    pub board: PipelineBoard,
    pub total_leads: usize,
    pub pipeline_value: f64,
}

impl From<&PipelineBoard> for BoardResponse {
    fn from(board: &PipelineBoard) -> Self {
        Self {
            board: board.clone(),
            total_leads: board.total_leads(),
            pipeline_value: board.pipeline_value(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub lead: Lead,
    pub fallback_mode: bool,
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::LeadNotFound(_) => Self::NotFound(err.to_string()),
            BoardError::FinalStage(_) => Self::Validation(err.to_string()),
        }
    }
}

pub fn configure_pipeline_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/pipeline", get(board_handler))
        .route("/api/pipeline/move", post(move_handler))
        .route("/api/pipeline/:id", delete(delete_handler))
        .route("/api/pipeline/:id/advance", post(advance_handler))
}

pub async fn board_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Query(query): Query<BoardQuery>,
) -> Response {
    let Some(user) = user else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let board = load_board(&state, &user.id, query.refresh).await;
    Json(BoardResponse::from(&board)).into_response()
}

/// Drag-end from the board. The move is applied locally first and kept even
/// when the store rejects it.
pub async fn move_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Json(event): Json<DragEnd>,
) -> Result<Response, ApiError> {
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let now = Utc::now();
    let outcome = with_board(&state, &user.id, |board| board.apply_drag_end(&event, now)).await?;

    if let MoveOutcome::Moved(lead) = outcome {
        info!("Lead {} moved to {} by {}", lead.id, lead.stage, user.id);
        push_update(&state, &lead).await;
    }
    let board = load_board(&state, &user.id, false).await;
    Ok(Json(BoardResponse::from(&board)).into_response())
}

pub async fn advance_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Path(lead_id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let now = Utc::now();
    let lead = with_board(&state, &user.id, |board| board.advance(&lead_id, now)).await?;
    push_update(&state, &lead).await;
    let fallback_mode = load_board(&state, &user.id, false).await.fallback_mode;
    Ok(Json(AdvanceResponse {
        lead,
        fallback_mode,
    })
    .into_response())
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Path(lead_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT);
    };
    let removed = remove_lead(&state, &user.id, &lead_id).await?;
    info!("Lead {} removed from pipeline by {}", removed.id, user.id);
    Ok(StatusCode::NO_CONTENT)
}
