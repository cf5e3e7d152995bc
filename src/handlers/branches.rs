use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::branch::Model as BranchModel;
use crate::entities::employee::{self, Entity as EmployeeEntity};
use crate::services::branches::{CreateBranchRequest, UpdateBranchRequest};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

/// Branch with its manager's name resolved for display.
#[derive(Debug, Serialize)]
pub struct BranchView {
    #[serde(flatten)]
    pub branch: BranchModel,
    pub manager_name: Option<String>,
}

pub async fn create_branch(
    State(state): State<AppState>,
    Json(request): Json<CreateBranchRequest>,
) -> ApiResult<BranchModel> {
    let branch = state.services.branches.create_branch(request).await?;
    Ok(Json(ApiResponse::success(branch)))
}

pub async fn list_branches(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<BranchView>> {
    let (page, limit) = query.resolve(&state.config);
    let (branches, total) = state
        .services
        .branches
        .list_branches(page, limit)
        .await?;

    let manager_ids: Vec<Uuid> = branches.iter().filter_map(|b| b.manager_id).collect();
    let mut names: HashMap<Uuid, String> = HashMap::new();
    if !manager_ids.is_empty() {
        for m in EmployeeEntity::find()
            .filter(employee::Column::Id.is_in(manager_ids))
            .all(&*state.db)
            .await
            .map_err(crate::errors::ServiceError::DatabaseError)?
        {
            names.insert(m.id, m.name);
        }
    }

    let views = branches
        .into_iter()
        .map(|b| {
            let manager_name = b.manager_id.and_then(|id| names.get(&id).cloned());
            BranchView {
                branch: b,
                manager_name,
            }
        })
        .collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        views, total, page, limit,
    ))))
}

pub async fn get_branch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<BranchModel> {
    let branch = state.services.branches.get_branch(id).await?;
    Ok(Json(ApiResponse::success(branch)))
}

pub async fn update_branch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBranchRequest>,
) -> ApiResult<BranchModel> {
    let branch = state.services.branches.update_branch(id, request).await?;
    Ok(Json(ApiResponse::success(branch)))
}

pub async fn delete_branch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.branches.delete_branch(id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}
