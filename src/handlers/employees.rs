use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::employee::{EmployeeStatus, Model as EmployeeModel, StaffRole};
use crate::services::employees::{
    CreateEmployeeRequest, EmployeeListFilter, UpdateEmployeeRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct EmployeeListQuery {
    #[serde(flatten)]
    pub page: ListQuery,
    pub role: Option<StaffRole>,
    pub branch_id: Option<Uuid>,
    pub status: Option<EmployeeStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AssignBranchRequest {
    pub branch_id: Uuid,
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(request): Json<CreateEmployeeRequest>,
) -> ApiResult<EmployeeModel> {
    let employee = state.services.employees.create_employee(request).await?;
    Ok(Json(ApiResponse::success(employee)))
}

pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeListQuery>,
) -> ApiResult<PaginatedResponse<EmployeeModel>> {
    let (page, limit) = query.page.resolve(&state.config);
    let filter = EmployeeListFilter {
        role: query.role,
        branch_id: query.branch_id,
        status: query.status,
    };
    let (employees, total) = state
        .services
        .employees
        .list_employees(filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        employees, total, page, limit,
    ))))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<EmployeeModel> {
    let employee = state.services.employees.get_employee(id).await?;
    Ok(Json(ApiResponse::success(employee)))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> ApiResult<EmployeeModel> {
    let employee = state
        .services
        .employees
        .update_employee(id, request)
        .await?;
    Ok(Json(ApiResponse::success(employee)))
}

pub async fn resign_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<EmployeeModel> {
    let employee = state.services.employees.resign_employee(id).await?;
    Ok(Json(ApiResponse::success(employee)))
}

pub async fn fire_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<EmployeeModel> {
    let employee = state.services.employees.fire_employee(id).await?;
    Ok(Json(ApiResponse::success(employee)))
}

pub async fn assign_branch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignBranchRequest>,
) -> ApiResult<EmployeeModel> {
    let employee = state
        .services
        .employees
        .assign_branch(id, request.branch_id)
        .await?;
    Ok(Json(ApiResponse::success(employee)))
}

/// Active salesmen of the calling manager's branch.
pub async fn list_branch_salesmen(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<EmployeeModel>> {
    let branch_id = user.require_branch()?;
    let (page, limit) = query.resolve(&state.config);
    let filter = EmployeeListFilter {
        role: Some(StaffRole::Salesman),
        branch_id: Some(branch_id),
        status: Some(EmployeeStatus::Active),
    };
    let (employees, total) = state
        .services
        .employees
        .list_employees(filter, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        employees, total, page, limit,
    ))))
}
