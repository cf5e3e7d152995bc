use crate::{
    db::DbPool,
    entities::customer::Entity as CustomerEntity,
    entities::product::Entity as ProductEntity,
    entities::sale::{
        self, ActiveModel as SaleActiveModel, Entity as SaleEntity, InstallationStatus,
        Model as SaleModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock,
};
use chrono::{DateTime, Utc};
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
pub struct RecordSaleRequest {
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "Customer phone is required"))]
    pub customer_phone: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default)]
    pub installation_required: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleListFilter {
    pub branch_id: Option<Uuid>,
    pub salesman_id: Option<Uuid>,
    pub sold_after: Option<DateTime<Utc>>,
    pub sold_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddReviewRequest {
    #[validate(length(min = 1, max = 2000, message = "Review text is required"))]
    pub review: String,
}

/// Service for point-of-sale records. Recording a sale decrements branch
/// stock in the same transaction, so overselling cannot happen even under
/// concurrent requests.
#[derive(Clone)]
pub struct SaleService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl SaleService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records a sale by a salesman at their branch.
    #[instrument(skip(self, request), fields(branch_id = %branch_id, salesman_id = %salesman_id))]
    pub async fn record_sale(
        &self,
        branch_id: Uuid,
        salesman_id: Uuid,
        request: RecordSaleRequest,
    ) -> Result<SaleModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for sale");
            ServiceError::DatabaseError(e)
        })?;

        let product = ProductEntity::find_by_id(request.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", request.product_id))
            })?;
        if !product.is_accepted() {
            return Err(ServiceError::InvalidOperation(
                "Only accepted products can be sold".to_string(),
            ));
        }

        // Decrement first; fails with InsufficientStock before anything is written
        let (old_quantity, new_quantity) = stock::apply_delta(
            &txn,
            branch_id,
            product.id,
            product.company_id,
            -request.quantity,
        )
        .await?;

        let quantity_dec = Decimal::from(request.quantity);
        let amount = product.sale_price * quantity_dec;
        let profit_or_loss = (product.sale_price - product.cost_price) * quantity_dec;

        let sale_id = Uuid::new_v4();
        let now = Utc::now();
        let installation_status = request
            .installation_required
            .then(|| InstallationStatus::Pending.to_string());

        let model = SaleActiveModel {
            id: Set(sale_id),
            sale_number: Set(generate_sale_number()),
            branch_id: Set(branch_id),
            salesman_id: Set(salesman_id),
            product_id: Set(product.id),
            company_id: Set(product.company_id),
            customer_name: Set(request.customer_name),
            customer_phone: Set(request.customer_phone),
            quantity: Set(request.quantity),
            unit_price: Set(product.sale_price),
            amount: Set(amount),
            profit_or_loss: Set(profit_or_loss),
            installation_required: Set(request.installation_required),
            installation_status: Set(installation_status),
            review: Set(None),
            sold_at: Set(now.into()),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, sale_id = %sale_id, "Failed to commit sale transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(sale_id = %sale_id, amount = %amount, "Sale recorded");

        if let Some(event_sender) = &self.event_sender {
            let recorded = event_sender
                .send(Event::SaleRecorded {
                    sale_id,
                    branch_id,
                    amount,
                    profit_or_loss,
                })
                .await;
            let adjusted = event_sender
                .send(Event::StockAdjusted {
                    branch_id,
                    product_id: product.id,
                    old_quantity,
                    new_quantity,
                })
                .await;
            if let Err(e) = recorded.and(adjusted) {
                warn!(error = %e, sale_id = %sale_id, "Failed to send sale events");
            }
        }

        Ok(model)
    }

    pub async fn get_sale(&self, id: Uuid) -> Result<SaleModel, ServiceError> {
        SaleEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Sale {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_sales(
        &self,
        filter: SaleListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<SaleModel>, u64), ServiceError> {
        let mut query = SaleEntity::find();
        if let Some(branch_id) = filter.branch_id {
            query = query.filter(sale::Column::BranchId.eq(branch_id));
        }
        if let Some(salesman_id) = filter.salesman_id {
            query = query.filter(sale::Column::SalesmanId.eq(salesman_id));
        }
        if let Some(after) = filter.sold_after {
            query = query.filter(sale::Column::SoldAt.gte(after));
        }
        if let Some(before) = filter.sold_before {
            query = query.filter(sale::Column::SoldAt.lt(before));
        }

        let paginator = query
            .order_by_desc(sale::Column::SoldAt)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let sales = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((sales, total))
    }

    /// Marks an installation as completed by the salesman who sold it.
    #[instrument(skip(self))]
    pub async fn complete_installation(
        &self,
        id: Uuid,
        salesman_id: Uuid,
    ) -> Result<SaleModel, ServiceError> {
        let existing = self.get_sale(id).await?;

        if existing.salesman_id != salesman_id {
            return Err(ServiceError::Forbidden(
                "Only the selling salesman can complete this installation".to_string(),
            ));
        }
        if !existing.installation_required {
            return Err(ServiceError::InvalidOperation(
                "This sale does not include installation".to_string(),
            ));
        }
        if existing.installation_status() == Some(InstallationStatus::Completed) {
            return Err(ServiceError::InvalidOperation(
                "Installation is already completed".to_string(),
            ));
        }

        let mut active: SaleActiveModel = existing.into();
        active.installation_status = Set(Some(InstallationStatus::Completed.to_string()));
        let model = active.update(&*self.db_pool).await?;

        info!(sale_id = %id, "Installation completed");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::InstallationCompleted { sale_id: id })
                .await
            {
                warn!(error = %e, sale_id = %id, "Failed to send installation event");
            }
        }

        Ok(model)
    }

    /// Purchases of a registered customer, matched on the phone captured
    /// at point of sale.
    #[instrument(skip(self))]
    pub async fn purchases_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<SaleModel>, ServiceError> {
        let customer = self.get_customer(customer_id).await?;
        self.purchases_for_phone(&customer.phone).await
    }

    /// Attaches a review on behalf of a registered customer.
    #[instrument(skip(self, request))]
    pub async fn add_review_for_customer(
        &self,
        sale_id: Uuid,
        customer_id: Uuid,
        request: AddReviewRequest,
    ) -> Result<SaleModel, ServiceError> {
        let customer = self.get_customer(customer_id).await?;
        self.add_review(sale_id, &customer.phone, request).await
    }

    async fn get_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<crate::entities::customer::Model, ServiceError> {
        CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))
    }

    /// Purchases matched on the phone captured at point of sale.
    #[instrument(skip(self))]
    pub async fn purchases_for_phone(&self, phone: &str) -> Result<Vec<SaleModel>, ServiceError> {
        Ok(SaleEntity::find()
            .filter(sale::Column::CustomerPhone.eq(phone))
            .order_by_desc(sale::Column::SoldAt)
            .all(&*self.db_pool)
            .await?)
    }

    /// Attaches a customer review to a purchase. One review per sale;
    /// the phone on the sale must match the reviewing customer.
    #[instrument(skip(self, request))]
    pub async fn add_review(
        &self,
        id: Uuid,
        customer_phone: &str,
        request: AddReviewRequest,
    ) -> Result<SaleModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = self.get_sale(id).await?;

        if existing.customer_phone != customer_phone {
            return Err(ServiceError::Forbidden(
                "This purchase belongs to a different customer".to_string(),
            ));
        }
        if existing.review.is_some() {
            return Err(ServiceError::Conflict(
                "This purchase has already been reviewed".to_string(),
            ));
        }

        let mut active: SaleActiveModel = existing.into();
        active.review = Set(Some(request.review));
        let model = active.update(&*self.db_pool).await?;

        info!(sale_id = %id, "Review added");
        Ok(model)
    }
}

fn generate_sale_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("S-{}-{}", Utc::now().format("%Y%m%d"), &suffix[..8])
}
