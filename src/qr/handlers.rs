use super::encoder::{encode_payload, ContactInfo, PayloadMode};
use super::renderer::encode_png;
use super::surface::Bitmap;
use crate::core::shared::{ApiError, AppState, CurrentUser};
use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const RENDER_STATUS_HEADER: &str = "x-render-status";
pub const RENDER_DIAGNOSTIC_HEADER: &str = "x-render-diagnostic";

const MIN_SIZE: u32 = 64;
const MAX_SIZE: u32 = 2048;

#[derive(Debug, Deserialize)]
pub struct QrRequest {
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub mode: PayloadMode,
    pub size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PayloadResponse {
    pub mode: PayloadMode,
    pub payload: String,
}

pub fn configure_qr_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/qr/payload", post(payload_handler))
        .route("/api/qr/render", post(render_handler))
}

fn build_payload(state: &AppState, request: &QrRequest) -> Result<String, ApiError> {
    if request.contact.is_empty() {
        return Err(ApiError::Validation(
            "Enter at least one contact field".to_string(),
        ));
    }
    Ok(encode_payload(
        &request.contact,
        request.mode,
        &state.config.capture.base_origin,
    ))
}

pub async fn payload_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Json(request): Json<QrRequest>,
) -> Result<Response, ApiError> {
    if user.is_none() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let payload = build_payload(&state, &request)?;
    Ok(Json(PayloadResponse {
        mode: request.mode,
        payload,
    })
    .into_response())
}

/// Renders the payload to a PNG. Render failures still answer 200 with the
/// diagnostic panel as the image; the outcome is in `X-Render-Status` and
/// its message, if any, in `X-Render-Diagnostic`.
pub async fn render_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Json(request): Json<QrRequest>,
) -> Result<Response, ApiError> {
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let size = request
        .size
        .unwrap_or(state.renderer.config().default_size);
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        return Err(ApiError::Validation(format!(
            "size must be between {MIN_SIZE} and {MAX_SIZE} pixels"
        )));
    }
    let payload = build_payload(&state, &request)?;

    let mut surface = Bitmap::new(size, size);
    let outcome = state.renderer.render_when_ready(&mut surface, &payload).await;
    info!(
        "QR render for user {}: {} ({size}px, {:?})",
        user.id,
        outcome.status(),
        request.mode
    );

    let png = encode_png(&surface, &outcome).map_err(|e| {
        error!("PNG encoding failed: {e}");
        ApiError::Internal(format!("PNG encoding failed: {e}"))
    })?;

    let mut response = (
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                HeaderName::from_static(RENDER_STATUS_HEADER),
                outcome.status().to_string(),
            ),
        ],
        png,
    )
        .into_response();
    if let Some(value) = outcome
        .diagnostic()
        .and_then(|d| HeaderValue::from_str(&d).ok())
    {
        response
            .headers_mut()
            .insert(HeaderName::from_static(RENDER_DIAGNOSTIC_HEADER), value);
    }
    Ok(response)
}
