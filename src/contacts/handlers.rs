use super::book::{build_contact, ContactBook};
use super::service::{add_contact, load_book, remove_contact};
use super::types::{Contact, ContactListResponse, CreateContactRequest};
use crate::core::shared::{ApiError, AppState, CurrentUser};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct ContactListQuery {
    #[serde(default)]
    pub refresh: bool,
}

pub fn configure_contacts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/contacts",
            get(list_contacts_handler).post(create_contact_handler),
        )
        .route("/api/contacts/:id", delete(delete_contact_handler))
}

fn list_response(book: &ContactBook) -> ContactListResponse {
    ContactListResponse {
        contacts: book.contacts.clone(),
        total_count: book.contacts.len(),
        fallback_mode: book.fallback_mode,
    }
}

pub async fn list_contacts_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Query(query): Query<ContactListQuery>,
) -> Response {
    let Some(user) = user else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let book = load_book(&state, &user.id, query.refresh).await;
    Json(list_response(&book)).into_response()
}

pub async fn create_contact_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Json(request): Json<CreateContactRequest>,
) -> Result<Response, ApiError> {
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let contact: Contact = build_contact(&user.id, request, Utc::now())?;

    add_contact(&state, contact.clone()).await;
    Ok((StatusCode::CREATED, Json(contact)).into_response())
}

pub async fn delete_contact_handler(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
    Path(contact_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let Some(user) = user else {
        return Ok(StatusCode::NO_CONTENT);
    };
    if remove_contact(&state, &user.id, &contact_id).await.is_none() {
        return Err(ApiError::NotFound(format!("contact {contact_id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}
