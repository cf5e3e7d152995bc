use crate::{
    db::DbPool,
    entities::product::{
        self, ActiveModel as ProductActiveModel, ApprovalStatus, Entity as ProductEntity,
        Model as ProductModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitProductRequest {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListFilter {
    pub company_id: Option<Uuid>,
    pub approval_status: Option<ApprovalStatus>,
}

#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Submits a product for owner review. It starts on hold and cannot
    /// be sold or ordered until accepted.
    #[instrument(skip(self, request), fields(company_id = %company_id, name = %request.name))]
    pub async fn submit_product(
        &self,
        company_id: Uuid,
        request: SubmitProductRequest,
    ) -> Result<ProductModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.cost_price <= Decimal::ZERO || request.sale_price <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Prices must be positive".to_string(),
            ));
        }

        let product_id = Uuid::new_v4();
        let model = ProductActiveModel {
            id: Set(product_id),
            company_id: Set(company_id),
            name: Set(request.name),
            model: Set(request.model),
            cost_price: Set(request.cost_price),
            sale_price: Set(request.sale_price),
            approval_status: Set(ApprovalStatus::Hold.to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(product_id = %product_id, company_id = %company_id, "Product submitted for review");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ProductSubmitted {
                    product_id,
                    company_id,
                })
                .await
            {
                warn!(error = %e, "Failed to send product submitted event");
            }
        }

        Ok(model)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<ProductModel, ServiceError> {
        ProductEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ProductModel>, u64), ServiceError> {
        let mut query = ProductEntity::find();
        if let Some(company_id) = filter.company_id {
            query = query.filter(product::Column::CompanyId.eq(company_id));
        }
        if let Some(status) = filter.approval_status {
            query = query.filter(product::Column::ApprovalStatus.eq(status.to_string()));
        }

        let paginator = query
            .order_by_asc(product::Column::Name)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((products, total))
    }

    /// Owner decision on a held product. Review is one-shot: a product
    /// that is already accepted or rejected cannot be re-reviewed.
    #[instrument(skip(self))]
    pub async fn review_product(
        &self,
        id: Uuid,
        decision: ApprovalStatus,
    ) -> Result<ProductModel, ServiceError> {
        if decision == ApprovalStatus::Hold {
            return Err(ServiceError::BadRequest(
                "Review decision must be accepted or rejected".to_string(),
            ));
        }

        let existing = self.get_product(id).await?;
        let current = existing
            .approval_status()
            .map_err(|_| ServiceError::InvalidStatus(existing.approval_status.clone()))?;
        if current.is_reviewed() {
            return Err(ServiceError::InvalidOperation(format!(
                "Product {} has already been reviewed ({})",
                id, existing.approval_status
            )));
        }

        let mut active: ProductActiveModel = existing.into();
        active.approval_status = Set(decision.to_string());
        active.updated_at = Set(Some(Utc::now().into()));
        let model = active.update(&*self.db_pool).await?;

        info!(product_id = %id, decision = %decision, "Product reviewed");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ProductReviewed {
                    product_id: id,
                    approval_status: decision.to_string(),
                })
                .await
            {
                warn!(error = %e, "Failed to send product reviewed event");
            }
        }

        Ok(model)
    }
}
