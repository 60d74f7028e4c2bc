use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::USER_AGENT, HeaderMap},
    Json,
};
use chrono::{DateTime, Utc};
use folio_core::{Contact, ContactForm, ContactId, ContactStats};
use serde::{Deserialize, Serialize};

use crate::{
    auth::AdminUser,
    error::ApiError,
    response::ApiResponse,
    state::{with_db, SharedState},
};

const SUBMIT_MESSAGE: &str = "Thank you for your message! I'll get back to you soon.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    id: ContactId,
    submitted_at: String,
}

pub async fn submit_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<ApiResponse<SubmitReceipt>, ApiError> {
    let Json(form) = payload?;
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let contact = with_db(&state, move |state, conn| {
        Ok(state.contact_service(conn).submit(form, user_agent)?)
    })
    .await?;

    let submitted_at = DateTime::<Utc>::from_timestamp_millis(contact.created_at)
        .map(|at| at.to_rfc3339())
        .unwrap_or_default();
    Ok(ApiResponse::created(SubmitReceipt {
        id: contact.id,
        submitted_at,
    })
    .with_message(SUBMIT_MESSAGE))
}

pub async fn list_handler(
    State(state): State<SharedState>,
    _admin: AdminUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<Contact>>, ApiError> {
    let Query(query) = query?;
    let page = with_db(&state, move |state, conn| {
        Ok(state.contact_service(conn).list(query.page, query.limit)?)
    })
    .await?;

    Ok(ApiResponse::ok(page.items).with_pagination(page.pagination))
}

pub async fn stats_handler(
    State(state): State<SharedState>,
    _admin: AdminUser,
) -> Result<ApiResponse<ContactStats>, ApiError> {
    let stats = with_db(&state, |state, conn| {
        Ok(state.contact_service(conn).stats()?)
    })
    .await?;

    Ok(ApiResponse::ok(stats))
}

pub async fn get_handler(
    State(state): State<SharedState>,
    _admin: AdminUser,
    id: Result<Path<ContactId>, PathRejection>,
) -> Result<ApiResponse<Contact>, ApiError> {
    let Path(id) = id?;
    let contact = with_db(&state, move |state, conn| {
        Ok(state.contact_service(conn).get_and_mark_read(id)?)
    })
    .await?;

    Ok(ApiResponse::ok(contact))
}

pub async fn toggle_read_handler(
    State(state): State<SharedState>,
    _admin: AdminUser,
    id: Result<Path<ContactId>, PathRejection>,
) -> Result<ApiResponse<Contact>, ApiError> {
    let Path(id) = id?;
    let contact = with_db(&state, move |state, conn| {
        Ok(state.contact_service(conn).toggle_read(id)?)
    })
    .await?;

    let message = if contact.is_read {
        "Contact marked as read"
    } else {
        "Contact marked as unread"
    };
    Ok(ApiResponse::ok(contact).with_message(message))
}

pub async fn delete_handler(
    State(state): State<SharedState>,
    _admin: AdminUser,
    id: Result<Path<ContactId>, PathRejection>,
) -> Result<ApiResponse<()>, ApiError> {
    let Path(id) = id?;
    with_db(&state, move |state, conn| {
        Ok(state.contact_service(conn).delete(id)?)
    })
    .await?;

    Ok(ApiResponse::ok(()).with_message("Contact submission deleted successfully"))
}
