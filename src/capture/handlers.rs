use super::form::{CaptureError, CaptureSubmission};
use super::page::{render_confirmation, render_form};
use super::params::AgentContext;
use crate::core::shared::AppState;
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use chrono::Utc;
use log::{error, info};
use std::sync::Arc;

pub fn configure_capture_routes() -> Router<Arc<AppState>> {
    Router::new().route("/capture", get(capture_form_handler).post(capture_submit_handler))
}

pub async fn capture_form_handler(RawQuery(query): RawQuery) -> Html<String> {
    let agent = AgentContext::from_query(query.as_deref());
    Html(render_form(&agent, None, &[]))
}

pub async fn capture_submit_handler(
    State(state): State<Arc<AppState>>,
    Form(submission): Form<CaptureSubmission>,
) -> Response {
    let agent = submission.agent();
    let lead = match submission.clone().into_lead(Utc::now()) {
        Ok(lead) => lead,
        Err(errors) => {
            let html = render_form(&agent, Some(&submission), &errors);
            return (StatusCode::BAD_REQUEST, Html(html)).into_response();
        }
    };

    let page = render_confirmation(&lead, &agent);
    let lead_id = lead.id.clone();
    match state.leads.add(lead).await {
        Ok(()) => {
            info!(
                "Captured lead {lead_id} for agent '{}'",
                agent.agent_email
            );
            Html(page).into_response()
        }
        Err(e) => {
            error!("Failed to store captured lead {lead_id}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_form(
                    &agent,
                    Some(&submission),
                    &[CaptureError::NotSaved],
                )),
            )
                .into_response()
        }
    }
}
