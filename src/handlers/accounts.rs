use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::entities::company::Model as CompanyModel;
use crate::entities::customer::Model as CustomerModel;
use crate::services::accounts::{CreateCompanyRequest, RegisterCustomerRequest};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

/// Owner: onboard a supplier company.
pub async fn create_company(
    State(state): State<AppState>,
    Json(request): Json<CreateCompanyRequest>,
) -> ApiResult<CompanyModel> {
    let company = state.services.accounts.create_company(request).await?;
    Ok(Json(ApiResponse::success(company)))
}

pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<CompanyModel>> {
    let (page, limit) = query.resolve(&state.config);
    let (companies, total) = state
        .services
        .accounts
        .list_companies(page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        companies, total, page, limit,
    ))))
}

/// Public: customer self-registration.
pub async fn register_customer(
    State(state): State<AppState>,
    Json(request): Json<RegisterCustomerRequest>,
) -> ApiResult<CustomerModel> {
    let customer = state.services.accounts.register_customer(request).await?;
    Ok(Json(ApiResponse::success(customer)))
}
