//! StoreChain API Library
//!
//! Backend for a multi-branch retail chain: owner, branch managers,
//! salesmen, supplier companies and customers each get a role-scoped
//! slice of the API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod request_id;
pub mod services;

use axum::{extract::State, response::Json, routing::get, routing::post, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{Role, RoleRouterExt};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
    pub message_hub: events::MessageHub,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page", deserialize_with = "de_query_u64")]
    pub page: u64,
    #[serde(default, deserialize_with = "de_query_opt_u64")]
    pub limit: Option<u64>,
}

impl ListQuery {
    /// Resolves `(page, limit)` against the configured page-size bounds.
    pub fn resolve(&self, config: &config::AppConfig) -> (u64, u64) {
        let limit = self
            .limit
            .unwrap_or(config.api_default_page_size)
            .clamp(1, config.api_max_page_size);
        (self.page.max(1), limit)
    }
}

fn default_page() -> u64 {
    1
}

// Query-string values arrive as strings when this struct is flattened
// into a larger query type, so accept both forms.
fn de_query_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct QueryU64;

    impl serde::de::Visitor<'_> for QueryU64 {
        type Value = u64;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a non-negative integer")
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<u64, E> {
            v.parse().map_err(serde::de::Error::custom)
        }
    }

    deserializer.deserialize_any(QueryU64)
}

fn de_query_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    de_query_u64(deserializer).map(Some)
}

// Common response wrappers
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::request_id::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Role-scoped API routes
pub fn api_routes() -> Router<AppState> {
    let owner = Router::new()
        .route(
            "/employees",
            post(handlers::employees::create_employee).get(handlers::employees::list_employees),
        )
        .route(
            "/employees/:id",
            get(handlers::employees::get_employee).put(handlers::employees::update_employee),
        )
        .route(
            "/employees/:id/resign",
            post(handlers::employees::resign_employee),
        )
        .route(
            "/employees/:id/fire",
            post(handlers::employees::fire_employee),
        )
        .route(
            "/employees/:id/assign-branch",
            post(handlers::employees::assign_branch),
        )
        .route(
            "/branches",
            post(handlers::branches::create_branch).get(handlers::branches::list_branches),
        )
        .route(
            "/branches/:id",
            get(handlers::branches::get_branch)
                .put(handlers::branches::update_branch)
                .delete(handlers::branches::delete_branch),
        )
        .route("/products", get(handlers::products::list_products))
        .route(
            "/products/:id/approve",
            post(handlers::products::approve_product),
        )
        .route(
            "/products/:id/reject",
            post(handlers::products::reject_product),
        )
        .route(
            "/companies",
            post(handlers::accounts::create_company).get(handlers::accounts::list_companies),
        )
        .route("/stock", get(handlers::stock::all_stock))
        .route(
            "/payroll/:employee_id",
            get(handlers::payroll::employee_statement),
        )
        .route("/analytics/summary", get(handlers::analytics::summary))
        .route(
            "/analytics/branches",
            get(handlers::analytics::branch_summaries),
        )
        .route(
            "/messages",
            post(handlers::messages::send_message).get(handlers::messages::inbox),
        )
        .with_role(Role::Owner);

    let manager = Router::new()
        .route("/salesmen", get(handlers::employees::list_branch_salesmen))
        .route("/stock", get(handlers::stock::branch_stock))
        .route(
            "/orders",
            post(handlers::orders::place_order).get(handlers::orders::branch_orders),
        )
        .route("/orders/:id/cancel", post(handlers::orders::cancel_order))
        .route("/orders/:id/deliver", post(handlers::orders::deliver_order))
        .route(
            "/sales",
            post(handlers::sales::record_sale).get(handlers::sales::branch_sales),
        )
        .route("/sales/summary", get(handlers::analytics::my_branch_summary))
        .route("/payroll", get(handlers::payroll::my_statement))
        .route(
            "/messages",
            post(handlers::messages::send_message).get(handlers::messages::inbox),
        )
        .with_role(Role::Manager);

    let salesman = Router::new()
        .route(
            "/sales",
            post(handlers::sales::record_sale).get(handlers::sales::my_sales),
        )
        .route(
            "/sales/:id/install",
            post(handlers::sales::complete_installation),
        )
        .route("/commission", get(handlers::payroll::my_statement))
        .route("/stock", get(handlers::stock::branch_stock))
        .route(
            "/messages",
            post(handlers::messages::send_message).get(handlers::messages::inbox),
        )
        .with_role(Role::Salesman);

    let company = Router::new()
        .route(
            "/products",
            post(handlers::products::submit_product).get(handlers::products::company_products),
        )
        .route("/orders", get(handlers::orders::company_orders))
        .route("/orders/:id/accept", post(handlers::orders::accept_order))
        .route("/orders/:id/reject", post(handlers::orders::reject_order))
        .route("/orders/:id/ship", post(handlers::orders::ship_order))
        .route("/stock", get(handlers::stock::company_stock))
        .with_role(Role::Company);

    let customer = Router::new()
        .route("/products", get(handlers::products::catalog))
        .route("/purchases", get(handlers::sales::my_purchases))
        .route(
            "/purchases/:id/review",
            post(handlers::sales::add_review),
        )
        .with_role(Role::Customer);

    Router::new()
        .nest("/owner", owner)
        .nest("/manager", manager)
        .nest("/salesman", salesman)
        .nest("/company", company)
        .nest("/customer", customer)
}

/// Service status endpoint
pub async fn api_status() -> Json<Value> {
    Json(json!({
        "service": "storechain-api",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Health check endpoint with a database ping
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(json!({
        "status": if database == "up" { "healthy" } else { "degraded" },
        "database": database,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response = crate::request_id::scope_request_id(
            crate::request_id::RequestId::new("meta-123"),
            async { ApiResponse::success("ok") },
        )
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response = crate::request_id::scope_request_id(
            crate::request_id::RequestId::new("meta-err"),
            async { ApiResponse::<()>::error("oops".into()) },
        )
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[test]
    fn paginated_response_computes_total_pages() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 45, 1, 20);
        assert_eq!(page.total_pages, 3);

        let exact = PaginatedResponse::<i32>::new(vec![], 40, 1, 20);
        assert_eq!(exact.total_pages, 2);

        let empty = PaginatedResponse::<i32>::new(vec![], 0, 1, 20);
        assert_eq!(empty.total_pages, 0);
    }
}
