//! Integration tests for REST API endpoints
//!
//! Tests the workspace endpoints end to end: authentication, ownership
//! checks, fault-to-status mapping, and the transactional operations.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{fixture_form, fixture_workspace, TestClient};
use formdesk_workspace::{form::find_form, FormStatus, Workspace};
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_workspace_endpoint() {
    let (client, _pool) = TestClient::new_with_db().await;

    let response = client
        .post(
            "/api/v1/workspaces",
            &json!({ "title": "Grant applications" }),
            Some("alice"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let workspace: Workspace = common::extract_json_body(response).await;
    assert_eq!(workspace.title, "Grant applications");
    assert_eq!(workspace.admin, "alice"); // Always the authenticated user
    assert!(workspace.form_ids.is_empty());
}

#[tokio::test]
async fn test_workspace_json_uses_camel_case() {
    let (client, _pool) = TestClient::new_with_db().await;
    client.create_workspace("Casing", "alice").await;

    let response = client.get("/api/v1/workspaces", Some("alice")).await;
    let body: Value = common::extract_json_body(response).await;

    assert!(body[0]["formIds"].is_array());
    assert!(body[0]["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_workspace_without_auth_fails() {
    let (client, _pool) = TestClient::new_with_db().await;

    let response = client
        .post("/api/v1/workspaces", &json!({ "title": "Nope" }), None)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_workspace_with_blank_title_is_bad_request() {
    let (client, _pool) = TestClient::new_with_db().await;

    let response = client
        .post("/api/v1/workspaces", &json!({ "title": "   " }), Some("alice"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = common::extract_json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_list_workspaces_filters_by_user() {
    let (client, _pool) = TestClient::new_with_db().await;
    client.create_workspace("A1", "alice").await;
    client.create_workspace("A2", "alice").await;
    client.create_workspace("B1", "bob").await;

    let response = client.get("/api/v1/workspaces", Some("alice")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let workspaces: Vec<Workspace> = common::extract_json_body(response).await;
    assert_eq!(workspaces.len(), 2);
    assert!(workspaces.iter().all(|w| w.admin == "alice"));
}

#[tokio::test]
async fn test_update_title_endpoint() {
    let (client, _pool) = TestClient::new_with_db().await;
    let workspace = client.create_workspace("Before", "alice").await;

    let response = client
        .put(
            &format!("/api/v1/workspaces/{}/title", workspace.id),
            &json!({ "title": "After" }),
            Some("alice"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let updated: Workspace = common::extract_json_body(response).await;
    assert_eq!(updated.title, "After");
}

#[tokio::test]
async fn test_update_title_of_foreign_workspace_is_forbidden() {
    let (client, _pool) = TestClient::new_with_db().await;
    let workspace = client.create_workspace("Alice's", "alice").await;

    let response = client
        .put(
            &format!("/api/v1/workspaces/{}/title", workspace.id),
            &json!({ "title": "Mallory's now" }),
            Some("mallory"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client.get("/api/v1/workspaces", Some("alice")).await;
    let workspaces: Vec<Workspace> = common::extract_json_body(response).await;
    assert_eq!(workspaces[0].title, "Alice's");
}

#[tokio::test]
async fn test_update_title_of_missing_workspace_is_not_found() {
    let (client, _pool) = TestClient::new_with_db().await;

    let response = client
        .put(
            "/api/v1/workspaces/does-not-exist/title",
            &json!({ "title": "Anything" }),
            Some("alice"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_workspace_with_forms() {
    let (client, pool) = TestClient::new_with_db().await;
    let form = fixture_form(&pool, "Survey", "alice").await;
    let workspace = fixture_workspace(&pool, "Doomed", "alice", &[form.id.as_str()]).await;

    let response = client
        .delete(
            &format!("/api/v1/workspaces/{}", workspace.id),
            &json!({ "shouldDeleteForms": true }),
            Some("alice"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get("/api/v1/workspaces", Some("alice")).await;
    let workspaces: Vec<Workspace> = common::extract_json_body(response).await;
    assert!(workspaces.is_empty());

    let form = find_form(&pool, &form.id).await.unwrap().unwrap();
    assert_eq!(form.status, FormStatus::Archived);
}

#[tokio::test]
async fn test_delete_workspace_defaults_to_keeping_forms() {
    let (client, pool) = TestClient::new_with_db().await;
    let form = fixture_form(&pool, "Survey", "alice").await;
    let workspace = fixture_workspace(&pool, "Doomed", "alice", &[form.id.as_str()]).await;

    let response = client
        .delete(
            &format!("/api/v1/workspaces/{}", workspace.id),
            &json!({}),
            Some("alice"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let form = find_form(&pool, &form.id).await.unwrap().unwrap();
    assert_eq!(form.status, FormStatus::Public);
}

#[tokio::test]
async fn test_delete_workspace_without_body() {
    let (client, pool) = TestClient::new_with_db().await;
    let form = fixture_form(&pool, "Survey", "alice").await;
    let workspace = fixture_workspace(&pool, "Doomed", "alice", &[form.id.as_str()]).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/workspaces/{}", workspace.id))
        .header("x-user", "alice")
        .body(Body::empty())
        .unwrap();
    let response = client.send_request(request).await;

    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get("/api/v1/workspaces", Some("alice")).await;
    let workspaces: Vec<Workspace> = common::extract_json_body(response).await;
    assert!(workspaces.is_empty());

    let form = find_form(&pool, &form.id).await.unwrap().unwrap();
    assert_eq!(form.status, FormStatus::Public);
}

#[tokio::test]
async fn test_delete_foreign_workspace_is_forbidden() {
    let (client, _pool) = TestClient::new_with_db().await;
    let workspace = client.create_workspace("Keep out", "alice").await;

    let response = client
        .delete(
            &format!("/api/v1/workspaces/{}", workspace.id),
            &json!({ "shouldDeleteForms": true }),
            Some("mallory"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client.get("/api/v1/workspaces", Some("alice")).await;
    let workspaces: Vec<Workspace> = common::extract_json_body(response).await;
    assert_eq!(workspaces.len(), 1);
}

#[tokio::test]
async fn test_move_forms_endpoint() {
    let (client, pool) = TestClient::new_with_db().await;
    let source = fixture_workspace(&pool, "Source", "alice", &["f1"]).await;
    let dest = client.create_workspace("Dest", "alice").await;

    let response = client
        .post(
            &format!("/api/v1/workspaces/{}/move", dest.id),
            &json!({ "sourceWorkspaceId": source.id, "formIds": ["f1"] }),
            Some("alice"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let moved: Workspace = common::extract_json_body(response).await;
    assert_eq!(moved.id, dest.id);
    assert_eq!(moved.form_ids, vec!["f1".to_string()]);

    let response = client.get("/api/v1/workspaces", Some("alice")).await;
    let workspaces: Vec<Workspace> = common::extract_json_body(response).await;
    let source = workspaces.iter().find(|w| w.id == source.id).unwrap();
    assert!(source.form_ids.is_empty());
}

#[tokio::test]
async fn test_move_forms_without_source() {
    let (client, pool) = TestClient::new_with_db().await;
    fixture_workspace(&pool, "Old home", "alice", &["f1"]).await;
    let dest = client.create_workspace("New home", "alice").await;

    let response = client
        .post(
            &format!("/api/v1/workspaces/{}/move", dest.id),
            &json!({ "formIds": ["f1", "f2"] }),
            Some("alice"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let moved: Workspace = common::extract_json_body(response).await;
    assert_eq!(moved.form_ids, vec!["f1".to_string(), "f2".to_string()]);
}

#[tokio::test]
async fn test_move_forms_requires_form_ids() {
    let (client, _pool) = TestClient::new_with_db().await;
    let dest = client.create_workspace("Dest", "alice").await;

    let response = client
        .post(
            &format!("/api/v1/workspaces/{}/move", dest.id),
            &json!({ "formIds": [] }),
            Some("alice"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_move_into_foreign_workspace_is_forbidden() {
    let (client, _pool) = TestClient::new_with_db().await;
    let foreign = client.create_workspace("Bob's", "bob").await;

    let response = client
        .post(
            &format!("/api/v1/workspaces/{}/move", foreign.id),
            &json!({ "formIds": ["f1"] }),
            Some("alice"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_endpoints() {
    let (client, _pool) = TestClient::new_with_db().await;

    let response = client.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get("/health/ready", None).await;
    let body: Value = common::extract_json_body(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_openapi_document_lists_workspace_routes() {
    let (client, _pool) = TestClient::new_with_db().await;

    let response = client.get("/api-docs/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = common::extract_json_body(response).await;
    assert!(body["paths"]["/api/v1/workspaces/{id}/move"].is_object());
    assert!(body["components"]["schemas"]["Workspace"].is_object());
}
