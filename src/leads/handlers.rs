use super::convert::convert_to_pipeline_lead;
use super::types::{CapturedLead, UpdateStageRequest};
use crate::core::shared::{ApiError, AppState, CurrentUser};
use crate::pipeline::service::add_lead;
use crate::pipeline::Lead;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use log::info;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct LeadListResponse {
    pub agent_email: String,
    pub leads: Vec<CapturedLead>,
    pub total_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub lead: Lead,
    /// False when the pipeline store rejected the lead and it only lives on
    /// the cached board.
    pub stored: bool,
}

pub fn configure_leads_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leads", get(list_leads_handler))
        .route("/api/leads/:id", delete(delete_lead_handler))
        .route("/api/leads/:id/stage", put(update_stage_handler))
        .route("/api/leads/:id/convert", post(convert_lead_handler))
}

/// Loads a captured lead, reporting leads captured for another agent as
/// missing.
async fn owned_lead(
    state: &AppState,
    user: &CurrentUser,
    lead_id: &str,
) -> Result<CapturedLead, ApiError> {
    let lead = state.leads.get(lead_id).await?;
    if lead.agent_email != user.email {
        return Err(ApiError::NotFound(format!("captured lead {lead_id}")));
    }
    Ok(lead)
}

/// Captured leads whose agent email is the signed-in user's.
pub async fn list_leads_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
) -> Result<Response, ApiError> {
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let leads = state.leads.get_leads_by_agent(&user.email).await?;
    Ok(Json(LeadListResponse {
        total_count: leads.len(),
        agent_email: user.email,
        leads,
    })
    .into_response())
}

pub async fn update_stage_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Path(lead_id): Path<String>,
    Json(request): Json<UpdateStageRequest>,
) -> Result<Response, ApiError> {
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    owned_lead(&state, &user, &lead_id).await?;
    let lead = state
        .leads
        .update_lead_stage(&lead_id, request.stage)
        .await?;
    Ok(Json(lead).into_response())
}

pub async fn delete_lead_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Path(lead_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT);
    };
    owned_lead(&state, &user, &lead_id).await?;
    state.leads.delete_lead(&lead_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Promotes a captured lead onto the signed-in user's pipeline board.
pub async fn convert_lead_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Path(lead_id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let captured = owned_lead(&state, &user, &lead_id).await?;
    let lead = convert_to_pipeline_lead(&captured, &user.id, Utc::now());
    info!(
        "Converting captured lead {} to pipeline lead {} for {}",
        captured.id, lead.id, user.id
    );

    let stored = add_lead(&state, lead.clone()).await;
    Ok((StatusCode::CREATED, Json(ConvertResponse { lead, stored })).into_response())
}
