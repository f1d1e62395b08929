//! Router harness for handler tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use jardim_core::notify::LogNotifier;
use jardim_core::store::MemoryStore;
use jardim_shared::config::JwtConfig;
use jardim_shared::types::UserId;
use jardim_shared::{JwtService, Role, StoreConfig};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{AppState, create_router};

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let jwt_service = JwtService::new(&JwtConfig {
            secret: "test-secret-key-that-is-at-least-32-bytes".to_string(),
            access_token_expiry_secs: 3600,
        });
        let state = AppState::new(
            store.clone(),
            Arc::new(LogNotifier),
            jwt_service,
            &StoreConfig::default(),
        );
        Self {
            router: create_router(state.clone()),
            store,
            state,
        }
    }

    pub fn token(&self, user: UserId, role: Role) -> String {
        self.state
            .jwt_service
            .generate_access_token(user.into_inner(), role)
            .expect("should generate token")
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
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }
}

pub fn items_json() -> Value {
    json!([
        {
            "product_id": "pedra-sao-tome",
            "name": "Pedra São Tomé",
            "price": "45.00",
            "quantity": 2,
            "category": "pedras",
            "unit": "m²"
        },
        {
            "product_id": "bloquete-16",
            "name": "Bloquete 16 faces",
            "price": "22.00",
            "quantity": 1,
            "category": "bloquetes"
        }
    ])
}

pub fn user_info_json() -> Value {
    json!({
        "name": "Maria Silva",
        "email": "maria@example.com",
        "phone": "19 99999-0000",
        "address": "Rua das Flores 10",
        "city": "Campinas",
        "zip": "13000-000",
        "payment_method": "pix"
    })
}
