#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use contacts_api::{
    app,
    config::{Config, HashingConfig, StorageBackend},
    state::AppState,
};

pub struct TestApp {
    pub router: Router,
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config {
            storage: StorageBackend::Memory,
            database_url: String::new(),
            db_pool_max_size: 1,
            server_addr: "127.0.0.1:0".parse().unwrap(),
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            hashing: HashingConfig { memory_kib: 64, iterations: 1, parallelism: 1 },
        };
        Self { router: app(AppState::in_memory(config)) }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        Reply { status, body }
    }

    pub async fn register(&self, username: &str, password: &str, name: &str) -> Reply {
        self.send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({"username": username, "password": password, "name": name})),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Reply {
        self.send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({"username": username, "password": password})),
        )
        .await
    }

    /// Registers and logs in, returning the issued token.
    pub async fn user(&self, username: &str) -> String {
        assert_eq!(self.register(username, "secret", username).await.status, StatusCode::CREATED);
        let reply = self.login(username, "secret").await;
        assert_eq!(reply.status, StatusCode::OK);
        reply.body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn create_contact(&self, token: &str, body: Value) -> Reply {
        self.send(Method::POST, "/api/contacts", Some(token), Some(body)).await
    }
}
