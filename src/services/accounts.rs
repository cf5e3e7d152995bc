use crate::{
    auth,
    db::DbPool,
    entities::company::{
        self, ActiveModel as CompanyActiveModel, Entity as CompanyEntity, Model as CompanyModel,
    },
    entities::customer::{
        self, ActiveModel as CustomerActiveModel, Entity as CustomerEntity,
        Model as CustomerModel,
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "Contact person is required"))]
    pub contact_person: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterCustomerRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Account management for the non-staff principals: supplier companies
/// (onboarded by the owner) and customers (self-registered).
#[derive(Clone)]
pub struct AccountService {
    db_pool: Arc<DbPool>,
}

impl AccountService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_company(
        &self,
        request: CreateCompanyRequest,
    ) -> Result<CompanyModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let existing = CompanyEntity::find()
            .filter(company::Column::Email.eq(request.email.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A company with email {} already exists",
                request.email
            )));
        }

        let password_hash = auth::hash_password(&request.password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let company_id = Uuid::new_v4();
        let model = CompanyActiveModel {
            id: Set(company_id),
            name: Set(request.name),
            email: Set(request.email),
            contact_person: Set(request.contact_person),
            phone: Set(request.phone),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;

        info!(company_id = %company_id, "Company account created");
        Ok(model)
    }

    pub async fn list_companies(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<CompanyModel>, u64), ServiceError> {
        let paginator = CompanyEntity::find()
            .order_by_asc(company::Column::Name)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let companies = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((companies, total))
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register_customer(
        &self,
        request: RegisterCustomerRequest,
    ) -> Result<CustomerModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let existing = CustomerEntity::find()
            .filter(customer::Column::Email.eq(request.email.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A customer with email {} already exists",
                request.email
            )));
        }

        let password_hash = auth::hash_password(&request.password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let customer_id = Uuid::new_v4();
        let model = CustomerActiveModel {
            id: Set(customer_id),
            name: Set(request.name),
            email: Set(request.email),
            phone: Set(request.phone),
            address: Set(request.address),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;

        info!(customer_id = %customer_id, "Customer registered");
        Ok(model)
    }
}
