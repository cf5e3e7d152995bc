use crate::{
    db::DbPool,
    entities::branch::{
        self, ActiveModel as BranchActiveModel, Entity as BranchEntity, Model as BranchModel,
    },
    entities::employee::{self, Entity as EmployeeEntity},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBranchRequest {
    #[validate(length(min = 1, message = "Branch code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "Branch name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBranchRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    pub manager_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct BranchService {
    db_pool: Arc<DbPool>,
}

impl BranchService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create_branch(
        &self,
        request: CreateBranchRequest,
    ) -> Result<BranchModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let existing = BranchEntity::find()
            .filter(branch::Column::Code.eq(request.code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Branch code {} is already in use",
                request.code
            )));
        }

        let branch_id = Uuid::new_v4();
        let model = BranchActiveModel {
            id: Set(branch_id),
            code: Set(request.code),
            name: Set(request.name),
            address: Set(request.address),
            manager_id: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
        .insert(db)
        .await?;

        info!(branch_id = %branch_id, code = %model.code, "Branch created");
        Ok(model)
    }

    pub async fn get_branch(&self, id: Uuid) -> Result<BranchModel, ServiceError> {
        BranchEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Branch {} not found", id)))
    }

    pub async fn list_branches(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<BranchModel>, u64), ServiceError> {
        let paginator = BranchEntity::find()
            .order_by_asc(branch::Column::Code)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let branches = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((branches, total))
    }

    /// Updates branch details. When a manager is set, the employee must
    /// be an active manager.
    #[instrument(skip(self, request))]
    pub async fn update_branch(
        &self,
        id: Uuid,
        request: UpdateBranchRequest,
    ) -> Result<BranchModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = self.get_branch(id).await?;

        if let Some(manager_id) = request.manager_id {
            let manager = EmployeeEntity::find_by_id(manager_id)
                .one(&*self.db_pool)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Employee {} not found", manager_id))
                })?;
            if manager.role != "manager" || !manager.is_active() {
                return Err(ServiceError::InvalidOperation(
                    "Branch manager must be an active manager".to_string(),
                ));
            }
        }

        let mut active: BranchActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(address) = request.address {
            active.address = Set(address);
        }
        if let Some(manager_id) = request.manager_id {
            active.manager_id = Set(Some(manager_id));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        Ok(active.update(&*self.db_pool).await?)
    }

    /// Removes a branch. Refused while employees are still assigned to it.
    #[instrument(skip(self))]
    pub async fn delete_branch(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_branch(id).await?;

        let assigned = EmployeeEntity::find()
            .filter(employee::Column::BranchId.eq(id))
            .count(&*self.db_pool)
            .await?;
        if assigned > 0 {
            return Err(ServiceError::Conflict(format!(
                "Branch {} still has {} assigned employees",
                id, assigned
            )));
        }

        existing.delete(&*self.db_pool).await?;
        info!(branch_id = %id, "Branch deleted");
        Ok(())
    }
}
