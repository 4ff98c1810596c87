//! Common test utilities and helpers for formdesk-api tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use formdesk_workspace::Workspace;
use serde::Serialize;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub use formdesk_workspace::test_utils::{create_test_db, fixture_form, fixture_workspace};

/// Create a test app with the given database pool
pub async fn create_test_app(pool: SqlitePool) -> Router {
    formdesk_api::create_app(pool)
        .await
        .expect("Failed to create test app")
}

/// Helper to extract JSON body from axum response
pub async fn extract_json_body<T>(response: Response<Body>) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}

/// TestClient to encapsulate API interaction logic
pub struct TestClient {
    pub app: Router,
}

impl TestClient {
    pub async fn new(pool: SqlitePool) -> Self {
        let app = create_test_app(pool).await;
        Self { app }
    }

    /// Create a new TestClient with a new in-memory DB
    pub async fn new_with_db() -> (Self, SqlitePool) {
        let pool = create_test_db().await;
        let client = Self::new(pool.clone()).await;
        (client, pool)
    }

    pub async fn send_request(&self, request: Request<Body>) -> Response<Body> {
        // Router is cheap to clone
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn send_json<T: Serialize>(
        &self,
        method: &str,
        uri: &str,
        body: &T,
        user: Option<&str>,
    ) -> Response<Body> {
        let req_body = serde_json::to_string(body).expect("Failed to serialize request body");
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");

        if let Some(user) = user {
            builder = builder.header("x-user", user);
        }

        self.send_request(builder.body(Body::from(req_body)).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str, user: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);

        if let Some(user) = user {
            builder = builder.header("x-user", user);
        }

        self.send_request(builder.body(Body::empty()).unwrap())
            .await
    }

    pub async fn post<T: Serialize>(
        &self,
        uri: &str,
        body: &T,
        user: Option<&str>,
    ) -> Response<Body> {
        self.send_json("POST", uri, body, user).await
    }

    pub async fn put<T: Serialize>(
        &self,
        uri: &str,
        body: &T,
        user: Option<&str>,
    ) -> Response<Body> {
        self.send_json("PUT", uri, body, user).await
    }

    pub async fn delete<T: Serialize>(
        &self,
        uri: &str,
        body: &T,
        user: Option<&str>,
    ) -> Response<Body> {
        self.send_json("DELETE", uri, body, user).await
    }

    /// Create a workspace over HTTP and return it
    pub async fn create_workspace(&self, title: &str, user: &str) -> Workspace {
        let response = self
            .post(
                "/api/v1/workspaces",
                &serde_json::json!({ "title": title }),
                Some(user),
            )
            .await;
        assert!(response.status().is_success());
        extract_json_body(response).await
    }
}
