use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::sale::Model as SaleModel;
use crate::services::payroll::month_window;
use crate::services::sales::{AddReviewRequest, RecordSaleRequest, SaleListFilter};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct SaleListQuery {
    #[serde(flatten)]
    pub page: ListQuery,
    /// Optional YYYY-MM filter
    pub month: Option<String>,
}

fn month_bounds(
    month: &Option<String>,
) -> Result<
    (
        Option<chrono::DateTime<chrono::Utc>>,
        Option<chrono::DateTime<chrono::Utc>>,
    ),
    crate::errors::ServiceError,
> {
    match month {
        Some(m) => {
            let (start, end) = month_window(m)?;
            Ok((Some(start), Some(end)))
        }
        None => Ok((None, None)),
    }
}

/// Record a sale at the caller's branch. Managers and salesmen share
/// this handler; the seller of record is the caller.
pub async fn record_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<RecordSaleRequest>,
) -> ApiResult<SaleModel> {
    let branch_id = user.require_branch()?;
    let sale = state
        .services
        .sales
        .record_sale(branch_id, user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(sale)))
}

/// Salesman: own sales, optionally filtered to one month.
pub async fn my_sales(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SaleListQuery>,
) -> ApiResult<PaginatedResponse<SaleModel>> {
    let (page, limit) = query.page.resolve(&state.config);
    let (sold_after, sold_before) = month_bounds(&query.month)?;
    let filter = SaleListFilter {
        branch_id: None,
        salesman_id: Some(user.user_id),
        sold_after,
        sold_before,
    };
    let (sales, total) = state
        .services
        .sales
        .list_sales(filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        sales, total, page, limit,
    ))))
}

/// Manager: sales of the caller's branch.
pub async fn branch_sales(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SaleListQuery>,
) -> ApiResult<PaginatedResponse<SaleModel>> {
    let branch_id = user.require_branch()?;
    let (page, limit) = query.page.resolve(&state.config);
    let (sold_after, sold_before) = month_bounds(&query.month)?;
    let filter = SaleListFilter {
        branch_id: Some(branch_id),
        salesman_id: None,
        sold_after,
        sold_before,
    };
    let (sales, total) = state
        .services
        .sales
        .list_sales(filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        sales, total, page, limit,
    ))))
}

/// Salesman: mark an installation as done on a sale they made.
pub async fn complete_installation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<SaleModel> {
    let sale = state
        .services
        .sales
        .complete_installation(id, user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(sale)))
}

/// Customer: purchases matched to the caller's registered phone.
pub async fn my_purchases(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<SaleModel>> {
    let purchases = state
        .services
        .sales
        .purchases_for_customer(user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(purchases)))
}

/// Customer: review a purchase. One review per sale.
pub async fn add_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AddReviewRequest>,
) -> ApiResult<SaleModel> {
    let sale = state
        .services
        .sales
        .add_review_for_customer(id, user.user_id, request)
        .await?;
    Ok(Json(ApiResponse::success(sale)))
}
