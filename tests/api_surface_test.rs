mod common;

use axum::{body::Body, routing::get, Router};
use http::{header, Request, StatusCode};
use rust_decimal_macros::dec;
use std::sync::Arc;
use storechain_api as api;
use storechain_api::auth::{AuthConfig, AuthService, Principal, Role};
use storechain_api::config::AppConfig;
use storechain_api::events::{EventSender, MessageHub};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        jwt_secret: "integration_test_secret_that_is_long_enough_123".into(),
        jwt_expiration: 3600,
        host: "127.0.0.1".into(),
        port: 8080,
        environment: "development".into(),
        log_level: "info".into(),
        log_json: false,
        auto_migrate: false,
        auth_issuer: "storechain-auth".into(),
        auth_audience: "storechain-api".into(),
        owner_email: "owner@test.local".into(),
        owner_name: "Owner".into(),
        owner_password_hash: None,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        db_max_connections: 5,
        db_min_connections: 1,
        db_connect_timeout_secs: 30,
        db_idle_timeout_secs: 600,
        db_acquire_timeout_secs: 8,
        event_channel_capacity: 64,
        api_default_page_size: 20,
        api_max_page_size: 100,
    }
}

async fn test_app(db_name: &str) -> (Router, Arc<AuthService>, Arc<api::db::DbPool>) {
    let db = common::setup_db(db_name).await;
    let cfg = test_config();

    let (tx, mut rx) = mpsc::channel(64);
    tokio::spawn(async move { while rx.recv().await.is_some() {} });
    let event_sender = EventSender::new(tx);
    let message_hub = MessageHub::default();

    let auth_service = Arc::new(AuthService::new(
        AuthConfig::from_app_config(&cfg),
        db.clone(),
    ));
    let services = api::handlers::AppServices::new(
        db.clone(),
        Arc::new(event_sender.clone()),
        message_hub.clone(),
    );

    let state = api::AppState {
        db: db.clone(),
        config: cfg,
        event_sender,
        services,
        message_hub,
    };

    let app = Router::<api::AppState>::new()
        .route("/status", get(api::api_status))
        .route("/health", get(api::health_check))
        .nest("/api", api::api_routes())
        .layer(axum::middleware::from_fn_with_state(
            auth_service.clone(),
            |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
             mut req: axum::http::Request<axum::body::Body>,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ))
        .with_state(state);

    (app, auth_service, db)
}

fn bearer_for(auth: &AuthService, role: Role) -> String {
    let principal = Principal {
        id: Uuid::new_v4(),
        name: "Test User".to_string(),
        role,
        branch_id: None,
    };
    let token = auth
        .generate_token(&principal)
        .expect("Failed to issue token");
    format!("Bearer {}", token.access_token)
}

#[tokio::test]
async fn test_status_and_health_are_public() {
    let (app, _auth, _db) = test_app("surface_public").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/status")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_routes_require_a_token() {
    let (app, _auth, _db) = test_app("surface_unauthorized").await;

    for uri in [
        "/api/owner/employees",
        "/api/manager/stock",
        "/api/salesman/sales",
        "/api/company/orders",
        "/api/customer/products",
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("Failed to build request"),
            )
            .await
            .expect("Request failed");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_roles_cannot_cross_portals() {
    let (app, auth, _db) = test_app("surface_forbidden").await;
    let salesman_token = bearer_for(&auth, Role::Salesman);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/owner/employees")
                .header(header::AUTHORIZATION, salesman_token.as_str())
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The matching portal accepts the same token
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/salesman/sales")
                .header(header::AUTHORIZATION, salesman_token.as_str())
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_owner_portal_lists_employees() {
    let (app, auth, db) = test_app("surface_owner_list").await;

    let branch = common::create_branch(&db, "SF-01").await;
    common::create_employee(&db, "sf@test.local", "salesman", Some(branch.id), dec!(1500)).await;

    let owner_token = bearer_for(&auth, Role::Owner);
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/owner/employees?branch_id={}", branch.id))
                .header(header::AUTHORIZATION, owner_token.as_str())
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let payload: serde_json::Value = serde_json::from_slice(&body).expect("Body should be JSON");
    assert_eq!(payload["success"], true);
    assert_eq!(payload["data"]["total"], 1);
}

#[tokio::test]
async fn test_page_size_is_bounded_by_config() {
    let (app, auth, _db) = test_app("surface_page_bounds").await;
    let owner_token = bearer_for(&auth, Role::Owner);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/owner/employees?limit=999999999&page=0")
                .header(header::AUTHORIZATION, owner_token.as_str())
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let payload: serde_json::Value = serde_json::from_slice(&body).expect("Body should be JSON");
    // Clamped to api_max_page_size, and page floors at 1
    assert_eq!(payload["data"]["limit"], 100);
    assert_eq!(payload["data"]["page"], 1);
}

#[test]
fn test_list_query_resolves_against_config() {
    let cfg = test_config();

    let defaults = api::ListQuery {
        page: 1,
        limit: None,
    };
    assert_eq!(defaults.resolve(&cfg), (1, 20));

    let oversized = api::ListQuery {
        page: 0,
        limit: Some(5000),
    };
    assert_eq!(oversized.resolve(&cfg), (1, 100));

    let zero = api::ListQuery {
        page: 3,
        limit: Some(0),
    };
    assert_eq!(zero.resolve(&cfg), (3, 1));
}
