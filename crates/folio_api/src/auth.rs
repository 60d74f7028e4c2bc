//! Bearer-token request guards.
//!
//! # Invariants
//! - A missing, malformed or rejected token yields 401.
//! - `AdminUser` additionally yields 403 for authenticated non-admins.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use folio_core::User;
use log::warn;

use super::{
    error::ApiError,
    state::{with_db, SharedState},
};

const BEARER_PREFIX: &str = "Bearer ";

/// Any active, authenticated account.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// An authenticated account with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("No token, authorization denied".to_string()))?;

        let user = with_db(state, move |state, conn| {
            Ok(state.auth_service(conn).authenticate(&token)?)
        })
        .await?;
        Ok(Self(user))
    }
}

impl FromRequestParts<SharedState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            warn!(
                "event=admin_guard module=api status=error error_code=forbidden user_id={}",
                user.id
            );
            return Err(ApiError::Forbidden(
                "Access denied. Admin rights required.".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::bearer_token;
    use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).expect("header"));
        headers
    }

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")).as_deref(), Some("abc.def"));
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
