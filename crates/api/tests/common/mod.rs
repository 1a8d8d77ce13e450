#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use kiraa_api::auth::jwt::{generate_access_token, JwtConfig};
use kiraa_api::config::ServerConfig;
use kiraa_api::router::build_app_router;
use kiraa_api::state::AppState;
use kiraa_core::memory::InMemoryStore;
use kiraa_core::product::{NewProduct, Product, ProductStatus};
use kiraa_core::roles::{ROLE_ADMIN, ROLE_USER};
use kiraa_core::types::DbId;
use kiraa_events::EventBus;
use tower::ServiceExt;

pub const ADMIN_ID: DbId = 1;
pub const REQUESTER_ID: DbId = 5;
pub const OTHER_USER_ID: DbId = 6;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        db_max_connections: 1,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Router over a fresh in-memory store, plus handles to inspect side effects.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub event_bus: Arc<EventBus>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(InMemoryStore::new());
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
        event_bus: event_bus.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        event_bus,
    }
}

pub fn user_token(user_id: DbId) -> String {
    generate_access_token(user_id, ROLE_USER, &test_config().jwt).unwrap()
}

pub fn admin_token() -> String {
    generate_access_token(ADMIN_ID, ROLE_ADMIN, &test_config().jwt).unwrap()
}

/// An available product as it might already sit in the catalogue.
pub async fn seed_product(store: &InMemoryStore) -> Product {
    store
        .seed_product(NewProduct {
            name: "مثقاب كهربائي".to_string(),
            category: "أدوات".to_string(),
            description: None,
            daily_price: 100.0,
            weekly_price: None,
            monthly_price: None,
            city: Some("سلا".to_string()),
            phone: None,
            image_url: None,
            rating: 0.0,
            reviews_count: 0,
            status: ProductStatus::Available,
        })
        .await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_as(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_as(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

/// POST with no body and no content type.
pub async fn post_as(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn delete_as(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
