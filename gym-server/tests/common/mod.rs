//! Test harness: the fully layered router over an in-memory database

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use gym_server::{Config, ServerState, api};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const USER: &str = "frontdesk";
pub const PASS: &str = "correct horse battery";

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
}

impl TestApp {
    pub async fn new() -> Self {
        let state = ServerState::initialize(&Config::in_memory(USER, PASS))
            .await
            .expect("in-memory state");
        let app = api::build_app(state.clone());
        Self { app, state }
    }

    /// New app plus a valid token
    pub async fn logged_in() -> (Self, String) {
        let app = Self::new().await;
        let token = app.login(USER, PASS).await;
        (app, token)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    /// Create a client and return its id
    pub async fn client(&self, token: &str, full_name: &str) -> i64 {
        let (status, body) = self
            .post("/api/clients", token, json!({ "full_name": full_name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create client: {body}");
        body["id"].as_i64().expect("client id")
    }
}

/// Error code of an `ApiResponse` error body
pub fn code(body: &Value) -> u64 {
    body["code"].as_u64().unwrap_or_default()
}
