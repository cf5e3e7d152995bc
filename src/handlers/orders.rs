use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::purchase_order::{Model as OrderModel, OrderStatus};
use crate::errors::ServiceError;
use crate::services::orders::{OrderListFilter, PlaceOrderRequest};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(flatten)]
    pub page: ListQuery,
    pub status: Option<OrderStatus>,
}

/// Manager: place a replenishment order for the caller's branch.
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<PlaceOrderRequest>,
) -> ApiResult<OrderModel> {
    let branch_id = user.require_branch()?;
    let order = state
        .services
        .orders
        .place_order(branch_id, user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Manager: orders of the caller's branch.
pub async fn branch_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<PaginatedResponse<OrderModel>> {
    let branch_id = user.require_branch()?;
    let (page, limit) = query.page.resolve(&state.config);
    let filter = OrderListFilter {
        branch_id: Some(branch_id),
        company_id: None,
        status: query.status,
    };
    let (orders, total) = state
        .services
        .orders
        .list_orders(filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        orders, total, page, limit,
    ))))
}

/// Manager: cancel a pending order of the caller's branch.
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderModel> {
    let branch_id = user.require_branch()?;
    ensure_branch_order(&state, id, branch_id).await?;
    let order = state
        .services
        .orders
        .update_status(id, OrderStatus::Cancelled)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Manager: confirm receipt of a shipped order, which replenishes
/// branch stock.
pub async fn deliver_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderModel> {
    let branch_id = user.require_branch()?;
    ensure_branch_order(&state, id, branch_id).await?;
    let order = state
        .services
        .orders
        .update_status(id, OrderStatus::Delivered)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Company: orders addressed to the calling company.
pub async fn company_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<PaginatedResponse<OrderModel>> {
    let (page, limit) = query.page.resolve(&state.config);
    let filter = OrderListFilter {
        branch_id: None,
        company_id: Some(user.user_id),
        status: query.status,
    };
    let (orders, total) = state
        .services
        .orders
        .list_orders(filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        orders, total, page, limit,
    ))))
}

pub async fn accept_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderModel> {
    ensure_company_order(&state, id, user.user_id).await?;
    let order = state
        .services
        .orders
        .update_status(id, OrderStatus::Accepted)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

pub async fn reject_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderModel> {
    ensure_company_order(&state, id, user.user_id).await?;
    let order = state
        .services
        .orders
        .update_status(id, OrderStatus::Rejected)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

pub async fn ship_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderModel> {
    ensure_company_order(&state, id, user.user_id).await?;
    let order = state
        .services
        .orders
        .update_status(id, OrderStatus::Shipped)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

async fn ensure_branch_order(
    state: &AppState,
    order_id: Uuid,
    branch_id: Uuid,
) -> Result<(), ServiceError> {
    let order = state.services.orders.get_order(order_id).await?;
    if order.branch_id != branch_id {
        return Err(ServiceError::Forbidden(
            "This order belongs to a different branch".to_string(),
        ));
    }
    Ok(())
}

async fn ensure_company_order(
    state: &AppState,
    order_id: Uuid,
    company_id: Uuid,
) -> Result<(), ServiceError> {
    let order = state.services.orders.get_order(order_id).await?;
    if order.company_id != company_id {
        return Err(ServiceError::Forbidden(
            "This order is addressed to a different company".to_string(),
        ));
    }
    Ok(())
}
