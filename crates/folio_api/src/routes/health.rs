use axum::extract::State;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    response::ApiResponse,
    state::{with_db, SharedState},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    status: &'static str,
    uptime_secs: u64,
    timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct TableCounts {
    users: u64,
    projects: u64,
    contacts: u64,
}

pub async fn root_handler() -> ApiResponse<Value> {
    ApiResponse::ok(json!({
        "service": "folio",
        "version": env!("CARGO_PKG_VERSION"),
        "coreVersion": folio_core::core_version(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
    .with_message("Portfolio backend is running")
}

pub async fn health_handler(State(state): State<SharedState>) -> ApiResponse<Health> {
    ApiResponse::ok(Health {
        status: "healthy",
        uptime_secs: state.uptime_secs(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn connection_handler(
    State(state): State<SharedState>,
) -> Result<ApiResponse<TableCounts>, ApiError> {
    let counts = with_db(&state, |state, conn| {
        Ok(TableCounts {
            users: state.auth_service(conn).count_users()?,
            projects: state.project_service(conn).count()?,
            contacts: state.contact_service(conn).count()?,
        })
    })
    .await?;

    Ok(ApiResponse::ok(counts).with_message("Database connection successful"))
}
