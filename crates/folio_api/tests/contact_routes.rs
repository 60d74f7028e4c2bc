mod common;

use axum::http::StatusCode;
use common::{empty_request, json_request, TestApp};
use serde_json::{json, Value};

async fn submit(app: &TestApp, name: &str) -> String {
    let (status, response) = app
        .send(json_request(
            "POST",
            "/api/contact",
            None,
            &json!({
                "name": name,
                "email": "visitor@example.com",
                "message": "I would like to discuss a project with you.",
                "type": "project-inquiry"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{response}");
    response["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn public_submission_returns_receipt() {
    let app = TestApp::new();
    let (status, response) = app
        .send(json_request(
            "POST",
            "/api/contact",
            None,
            &json!({
                "name": "Visitor",
                "email": "visitor@example.com",
                "message": "Hello there, nice portfolio!"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["success"], true);
    assert!(response["data"]["id"].is_string());
    assert!(response["data"]["submittedAt"].is_string());
}

#[tokio::test]
async fn invalid_submission_returns_400() {
    let app = TestApp::new();
    let (status, response) = app
        .send(json_request(
            "POST",
            "/api/contact",
            None,
            &json!({ "name": "Visitor", "email": "nope", "message": "Hello there, nice work" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
}

#[tokio::test]
async fn an_unauthenticated_request_to_delete_a_contact_returns_401() {
    let app = TestApp::new();
    let id = submit(&app, "Visitor").await;

    let (status, response) = app
        .send(empty_request("DELETE", &format!("/api/contact/{id}"), None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["success"], false);
}

#[tokio::test]
async fn inbox_routes_require_admin() {
    let app = TestApp::new();
    let token = app.register_user("visitor").await;

    for uri in ["/api/contact", "/api/contact/stats"] {
        let (status, _) = app.send(empty_request("GET", uri, Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn admin_lists_with_pagination() {
    let app = TestApp::new();
    for index in 0..3 {
        submit(&app, &format!("Sender {index}")).await;
    }

    let (status, response) = app
        .send(empty_request(
            "GET",
            "/api/contact?page=1&limit=2",
            Some(&app.admin_token),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"].as_array().unwrap().len(), 2);
    assert_eq!(
        response["pagination"],
        json!({ "current": 1, "pages": 2, "total": 3, "limit": 2 })
    );
    assert_eq!(response["data"][0]["type"], "project-inquiry");
}

#[tokio::test]
async fn viewing_toggling_and_deleting_a_contact() {
    let app = TestApp::new();
    let id = submit(&app, "Visitor").await;
    let uri = format!("/api/contact/{id}");
    let token = Some(app.admin_token.as_str());

    let (status, response) = app.send(empty_request("GET", &uri, token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["isRead"], true);
    assert!(response["data"]["readAt"].is_number());

    let (status, response) = app
        .send(empty_request("PUT", &format!("{uri}/read"), token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["isRead"], false);
    assert_eq!(response["data"]["readAt"], Value::Null);
    assert_eq!(response["message"], "Contact marked as unread");

    let (status, response) = app
        .send(empty_request("GET", "/api/contact/stats", token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["data"],
        json!({ "total": 1, "unread": 1, "read": 0, "today": 1 })
    );

    let (status, _) = app.send(empty_request("DELETE", &uri, token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = app.send(empty_request("GET", &uri, token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["message"], "Contact not found");
}
