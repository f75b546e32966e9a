#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use order_server::api::build_router;
use order_server::auth::{JwtConfig, JwtService};
use order_server::core::Config;
use order_server::services::InMemoryCatalog;
use order_server::{OrderStorage, OrdersManager, ServerState, SubscriptionHub};
use serde_json::Value;
use shared::Role;
use shared::order::{CatalogEntry, CatalogRef};
use tower::ServiceExt;

pub fn test_jwt() -> JwtService {
    JwtService::with_config(JwtConfig {
        secret: "integration-secret-that-is-long-enough".to_string(),
        expiration_minutes: 60,
        issuer: "order-server".to_string(),
        audience: "order-clients".to_string(),
    })
}

fn entry(catalog: CatalogRef, name: &str, price: f64) -> CatalogEntry {
    CatalogEntry {
        catalog,
        name: name.to_string(),
        price,
        expense: 0.0,
        available: true,
    }
}

/// State backed by an in-memory ledger and a small menu
pub fn test_state() -> ServerState {
    let catalog = Arc::new(InMemoryCatalog::from_entries([
        entry(CatalogRef::dish("pho"), "Pho bo", 50_000.0),
        entry(CatalogRef::dish("tra"), "Tra da", 10_000.0),
        entry(CatalogRef::combo("lunch"), "Lunch set", 120_000.0),
    ]));
    let storage = OrderStorage::open_in_memory().unwrap();
    let orders = OrdersManager::with_storage(storage, catalog);

    let mut config = Config::with_overrides("./target/test-data", 0);
    config.jwt = test_jwt().config.clone();

    ServerState::new(config, orders, SubscriptionHub::new(64), Arc::new(test_jwt()))
}

pub fn token(state: &ServerState, user_id: &str, role: Role) -> String {
    state
        .jwt_service()
        .issue(user_id, user_id, role)
        .unwrap()
}

/// Thin request helper over the router
pub struct TestApp {
    pub state: ServerState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = test_state();
        let router = build_router(state.clone());
        Self { state, router }
    }

    pub fn token(&self, user_id: &str, role: Role) -> String {
        token(&self.state, user_id, role)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send_with(method, uri, token, body, &[]).await
    }

    pub async fn send_with(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

pub fn dish(id: &str, quantity: i32) -> Value {
    serde_json::json!({
        "catalog": { "variant": "dish", "id": id },
        "quantity": quantity
    })
}
