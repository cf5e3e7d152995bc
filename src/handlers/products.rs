use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::product::{ApprovalStatus, Model as ProductModel};
use crate::services::products::{ProductListFilter, SubmitProductRequest};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    #[serde(flatten)]
    pub page: ListQuery,
    pub company_id: Option<Uuid>,
    pub approval_status: Option<ApprovalStatus>,
}

/// Owner view: all products, any status.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<PaginatedResponse<ProductModel>> {
    let (page, limit) = query.page.resolve(&state.config);
    let filter = ProductListFilter {
        company_id: query.company_id,
        approval_status: query.approval_status,
    };
    let (products, total) = state
        .services
        .products
        .list_products(filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        products, total, page, limit,
    ))))
}

pub async fn approve_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductModel> {
    let product = state
        .services
        .products
        .review_product(id, ApprovalStatus::Accepted)
        .await?;
    Ok(Json(ApiResponse::success(product)))
}

pub async fn reject_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductModel> {
    let product = state
        .services
        .products
        .review_product(id, ApprovalStatus::Rejected)
        .await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Company portal: submit a product for owner review.
pub async fn submit_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SubmitProductRequest>,
) -> ApiResult<ProductModel> {
    let product = state
        .services
        .products
        .submit_product(user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Company portal: own products with their review status.
pub async fn company_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<ProductModel>> {
    let (page, limit) = query.resolve(&state.config);
    let filter = ProductListFilter {
        company_id: Some(user.user_id),
        approval_status: None,
    };
    let (products, total) = state
        .services
        .products
        .list_products(filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        products, total, page, limit,
    ))))
}

/// Customer portal: the sellable catalog (accepted products only).
pub async fn catalog(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<ProductModel>> {
    let (page, limit) = query.resolve(&state.config);
    let filter = ProductListFilter {
        company_id: None,
        approval_status: Some(ApprovalStatus::Accepted),
    };
    let (products, total) = state
        .services
        .products
        .list_products(filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        products, total, page, limit,
    ))))
}
