//! Shared helpers for in-process router tests.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::llm_client::testing::ScriptedGenerator;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::MemoryStore;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub llm: Arc<ScriptedGenerator>,
}

impl TestApp {
    pub fn new(llm: ScriptedGenerator) -> Self {
        let store = Arc::new(MemoryStore::new());
        let llm = Arc::new(llm);
        let router = build_router(AppState {
            store: store.clone(),
            llm: llm.clone(),
            config: Config::for_tests(),
        });
        Self { router, store, llm }
    }

    /// A test app whose generative service always fails.
    pub fn offline() -> Self {
        Self::new(ScriptedGenerator::failing())
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(body) => {
                self.send_raw(method, uri, token, Some("application/json"), &body.to_string())
                    .await
            }
            None => self.send_raw(method, uri, token, None, "").await,
        }
    }

    /// Sends `body` verbatim, with `content_type` as the Content-Type header when given.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Registers a user and returns their bearer token.
    pub async fn signup(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({ "fullName": "Test User", "email": email, "password": "password123" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }
}
