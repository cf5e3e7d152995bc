use crate::{
    auth,
    db::DbPool,
    entities::branch::Entity as BranchEntity,
    entities::employee::{
        self, ActiveModel as EmployeeActiveModel, EmployeeStatus, Entity as EmployeeEntity,
        Model as EmployeeModel, StaffRole,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: StaffRole,
    pub branch_id: Option<Uuid>,
    pub base_salary: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub phone: Option<String>,
    pub base_salary: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeListFilter {
    pub role: Option<StaffRole>,
    pub branch_id: Option<Uuid>,
    pub status: Option<EmployeeStatus>,
}

/// Service for managing the staff roster
#[derive(Clone)]
pub struct EmployeeService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl EmployeeService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Hires a new employee. Email must be unused across the roster.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_employee(
        &self,
        request: CreateEmployeeRequest,
    ) -> Result<EmployeeModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.base_salary < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Base salary cannot be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let existing = EmployeeEntity::find()
            .filter(employee::Column::Email.eq(request.email.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "An employee with email {} already exists",
                request.email
            )));
        }

        if let Some(branch_id) = request.branch_id {
            BranchEntity::find_by_id(branch_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Branch {} not found", branch_id))
                })?;
        }

        let password_hash = auth::hash_password(&request.password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let now = Utc::now();
        let employee_id = Uuid::new_v4();
        let active_model = EmployeeActiveModel {
            id: Set(employee_id),
            name: Set(request.name),
            email: Set(request.email),
            phone: Set(request.phone),
            password_hash: Set(password_hash),
            role: Set(request.role.to_string()),
            branch_id: Set(request.branch_id),
            base_salary: Set(request.base_salary),
            status: Set(EmployeeStatus::Active.to_string()),
            joined_at: Set(now.into()),
            separated_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            error!(error = %e, employee_id = %employee_id, "Failed to insert employee");
            ServiceError::DatabaseError(e)
        })?;

        info!(employee_id = %employee_id, role = %model.role, "Employee created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::EmployeeCreated {
                    employee_id,
                    role: model.role.clone(),
                })
                .await
            {
                warn!(error = %e, "Failed to send employee created event");
            }
        }

        Ok(model)
    }

    pub async fn get_employee(&self, id: Uuid) -> Result<EmployeeModel, ServiceError> {
        EmployeeEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_employees(
        &self,
        filter: EmployeeListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<EmployeeModel>, u64), ServiceError> {
        let mut query = EmployeeEntity::find();
        if let Some(role) = filter.role {
            query = query.filter(employee::Column::Role.eq(role.to_string()));
        }
        if let Some(branch_id) = filter.branch_id {
            query = query.filter(employee::Column::BranchId.eq(branch_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(employee::Column::Status.eq(status.to_string()));
        }

        let paginator = query
            .order_by_asc(employee::Column::Name)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let employees = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((employees, total))
    }

    /// Edits profile fields. Separated employees are immutable.
    #[instrument(skip(self, request))]
    pub async fn update_employee(
        &self,
        id: Uuid,
        request: UpdateEmployeeRequest,
    ) -> Result<EmployeeModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = self.get_employee(id).await?;
        self.ensure_active(&existing)?;

        if let Some(salary) = request.base_salary {
            if salary < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Base salary cannot be negative".to_string(),
                ));
            }
        }

        let mut active: EmployeeActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(phone);
        }
        if let Some(salary) = request.base_salary {
            active.base_salary = Set(salary);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        Ok(active.update(&*self.db_pool).await?)
    }

    /// Marks the employee as resigned. Terminal.
    pub async fn resign_employee(&self, id: Uuid) -> Result<EmployeeModel, ServiceError> {
        self.separate(id, EmployeeStatus::Resigned).await
    }

    /// Marks the employee as fired. Terminal.
    pub async fn fire_employee(&self, id: Uuid) -> Result<EmployeeModel, ServiceError> {
        self.separate(id, EmployeeStatus::Fired).await
    }

    #[instrument(skip(self))]
    async fn separate(
        &self,
        id: Uuid,
        status: EmployeeStatus,
    ) -> Result<EmployeeModel, ServiceError> {
        let existing = self.get_employee(id).await?;
        self.ensure_active(&existing)?;

        let now = Utc::now();
        let mut active: EmployeeActiveModel = existing.into();
        active.status = Set(status.to_string());
        active.separated_at = Set(Some(now.into()));
        active.updated_at = Set(Some(now.into()));

        let model = active.update(&*self.db_pool).await?;
        info!(employee_id = %id, status = %status, "Employee separated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::EmployeeStatusChanged {
                    employee_id: id,
                    status: status.to_string(),
                })
                .await
            {
                warn!(error = %e, "Failed to send employee status event");
            }
        }

        Ok(model)
    }

    /// Moves an employee to a branch. Assigning a manager also records
    /// them as the branch manager; a branch can only have one active
    /// manager at a time.
    #[instrument(skip(self))]
    pub async fn assign_branch(
        &self,
        id: Uuid,
        branch_id: Uuid,
    ) -> Result<EmployeeModel, ServiceError> {
        let existing = self.get_employee(id).await?;
        self.ensure_active(&existing)?;

        let db = &*self.db_pool;
        let branch = BranchEntity::find_by_id(branch_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Branch {} not found", branch_id)))?;

        let txn = db.begin().await?;

        if existing.role == "manager" {
            if let Some(current_manager_id) = branch.manager_id {
                if current_manager_id != id {
                    let current = EmployeeEntity::find_by_id(current_manager_id)
                        .one(&txn)
                        .await?;
                    if current.map(|m| m.is_active()).unwrap_or(false) {
                        return Err(ServiceError::Conflict(format!(
                            "Branch {} already has an active manager",
                            branch.code
                        )));
                    }
                }
            }

            let mut branch_active: crate::entities::branch::ActiveModel = branch.into();
            branch_active.manager_id = Set(Some(id));
            branch_active.updated_at = Set(Some(Utc::now().into()));
            branch_active.update(&txn).await?;
        }

        let mut active: EmployeeActiveModel = existing.into();
        active.branch_id = Set(Some(branch_id));
        active.updated_at = Set(Some(Utc::now().into()));
        let model = active.update(&txn).await?;

        txn.commit().await?;
        info!(employee_id = %id, branch_id = %branch_id, "Employee assigned to branch");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::BranchAssigned {
                    employee_id: id,
                    branch_id,
                })
                .await
            {
                warn!(error = %e, "Failed to send branch assignment event");
            }
        }

        Ok(model)
    }

    fn ensure_active(&self, employee: &EmployeeModel) -> Result<(), ServiceError> {
        if !employee.is_active() {
            return Err(ServiceError::InvalidOperation(format!(
                "Employee {} is {} and can no longer be modified",
                employee.id, employee.status
            )));
        }
        Ok(())
    }
}
