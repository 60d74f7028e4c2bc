//! Account routes.
//!
//! # Invariants
//! - bcrypt runs on the blocking pool without the database lock; only the
//!   lookups and writes around it go through `with_db`.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use folio_core::{check_credentials, LoginResult, NewAccount, Profile, RegisterRequest, User};
use serde::Deserialize;

use crate::{
    auth::AuthUser,
    error::ApiError,
    response::ApiResponse,
    state::{blocking, with_db, SharedState},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    email: String,
    password: String,
}

pub async fn register_handler(
    State(state): State<SharedState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiResponse<LoginResult>, ApiError> {
    let Json(request) = payload?;
    let bcrypt_cost = state.config.bcrypt_cost;
    let account =
        blocking(move || Ok(NewAccount::from_registration(request, bcrypt_cost)?)).await?;

    let result = with_db(&state, move |state, conn| {
        Ok(state.auth_service(conn).register_prepared(account)?)
    })
    .await?;

    Ok(ApiResponse::created(result).with_message("User registered successfully"))
}

pub async fn login_handler(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<LoginResult>, ApiError> {
    let Json(request) = payload?;
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let LoginRequest { email, password } = request;
    let candidate = with_db(&state, move |state, conn| {
        Ok(state.auth_service(conn).login_candidate(&email)?)
    })
    .await?;

    let bcrypt_cost = state.config.bcrypt_cost;
    let user_id =
        blocking(move || Ok(check_credentials(candidate.as_ref(), &password, bcrypt_cost)?))
            .await?;

    let result = with_db(&state, move |state, conn| {
        Ok(state.auth_service(conn).complete_login(user_id)?)
    })
    .await?;

    Ok(ApiResponse::ok(result).with_message("Login successful"))
}

pub async fn profile_handler(AuthUser(user): AuthUser) -> ApiResponse<User> {
    ApiResponse::ok(user).with_message("Profile retrieved successfully")
}

pub async fn update_profile_handler(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<Profile>, JsonRejection>,
) -> Result<ApiResponse<User>, ApiError> {
    let Json(profile) = payload?;
    let updated = with_db(&state, move |state, conn| {
        Ok(state.auth_service(conn).update_profile(user.id, profile)?)
    })
    .await?;

    Ok(ApiResponse::ok(updated).with_message("Profile updated successfully"))
}
