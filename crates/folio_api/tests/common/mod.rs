#![allow(dead_code)]

use std::collections::HashMap;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use folio_api::{build_router, AppState, Config, SharedState};
use folio_core::{
    db::open_db_in_memory, AuthService, Profile, SqliteUserRepository, TokenSigner, User,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@portfolio.com";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestApp {
    pub router: Router,
    pub state: SharedState,
    pub admin: User,
    pub admin_token: String,
    _uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_upload_limit(1024 * 1024)
    }

    pub fn with_upload_limit(max_upload_bytes: usize) -> Self {
        Self::build(max_upload_bytes, 4)
    }

    /// Request-path hashing uses `bcrypt_cost`; the seeded admin stays cheap.
    pub fn with_bcrypt_cost(bcrypt_cost: u32) -> Self {
        Self::build(1024 * 1024, bcrypt_cost)
    }

    fn build(max_upload_bytes: usize, bcrypt_cost: u32) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let vars: HashMap<&str, String> = HashMap::from([
            ("FOLIO_JWT_SECRET", "test-secret".to_string()),
            ("FOLIO_BCRYPT_COST", bcrypt_cost.to_string()),
            (
                "FOLIO_UPLOAD_DIR",
                uploads.path().to_string_lossy().into_owned(),
            ),
            ("FOLIO_MAX_UPLOAD_BYTES", max_upload_bytes.to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let conn = open_db_in_memory().unwrap();
        let signer = TokenSigner::new(&config.jwt_secret, config.token_ttl_days).unwrap();
        let admin = AuthService::new(SqliteUserRepository::new(&conn), signer.clone(), 4)
            .create_admin("admin", ADMIN_EMAIL, ADMIN_PASSWORD, Profile::default())
            .unwrap();
        let admin_token = signer.issue(&admin).unwrap();

        let state = AppState::with_connection(config, conn).unwrap();
        Self {
            router: build_router(state.clone()),
            state,
            admin,
            admin_token,
            _uploads: uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    /// Registers a regular account and returns its token.
    pub async fn register_user(&self, username: &str) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/api/auth/register",
                None,
                &serde_json::json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "password1",
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn project_body(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "shortDescription": "A short summary",
        "description": "A longer description of the project.",
        "technologies": ["Rust", "Axum"],
        "category": "web-development",
        "images": { "thumbnail": "/api/uploads/projects/thumb.png" },
        "links": { "github": "https://github.com/example/project" },
        "startDate": "2024-01-15",
        "isPublished": true
    })
}
