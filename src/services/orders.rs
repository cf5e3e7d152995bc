use crate::{
    db::DbPool,
    entities::product::Entity as ProductEntity,
    entities::purchase_order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
        OrderStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock,
};
use chrono::Utc;
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
pub struct PlaceOrderRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListFilter {
    pub branch_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

/// Service for replenishment orders placed by branch managers against
/// supplier companies.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Places an order for an accepted product on behalf of a branch.
    #[instrument(skip(self, request), fields(branch_id = %branch_id, product_id = %request.product_id))]
    pub async fn place_order(
        &self,
        branch_id: Uuid,
        placed_by: Uuid,
        request: PlaceOrderRequest,
    ) -> Result<OrderModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let product = ProductEntity::find_by_id(request.product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", request.product_id))
            })?;
        if !product.is_accepted() {
            return Err(ServiceError::InvalidOperation(
                "Only accepted products can be ordered".to_string(),
            ));
        }

        let order_id = Uuid::new_v4();
        let order_number = generate_order_number();
        let now = Utc::now();

        let model = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(order_number),
            branch_id: Set(branch_id),
            product_id: Set(product.id),
            company_id: Set(product.company_id),
            quantity: Set(request.quantity),
            status: Set(OrderStatus::Pending.to_string()),
            placed_by: Set(placed_by),
            notes: Set(request.notes),
            delivered_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(None),
        }
        .insert(db)
        .await?;

        info!(order_id = %order_id, order_number = %model.order_number, "Order placed");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::OrderPlaced {
                    order_id,
                    branch_id,
                    quantity: request.quantity,
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send order placed event");
            }
        }

        Ok(model)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<OrderModel, ServiceError> {
        OrderEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: OrderListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<OrderModel>, u64), ServiceError> {
        let mut query = OrderEntity::find();
        if let Some(branch_id) = filter.branch_id {
            query = query.filter(purchase_order::Column::BranchId.eq(branch_id));
        }
        if let Some(company_id) = filter.company_id {
            query = query.filter(purchase_order::Column::CompanyId.eq(company_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(purchase_order::Column::Status.eq(status.to_string()));
        }

        let paginator = query
            .order_by_desc(purchase_order::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((orders, total))
    }

    /// Advances an order through its lifecycle. Delivery additionally
    /// replenishes branch stock inside the same transaction, so an order
    /// can never be counted into inventory twice.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        next: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order status update");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        let current = order
            .status()
            .map_err(|_| ServiceError::InvalidStatus(order.status.clone()))?;
        if !current.can_transition_to(next) {
            return Err(ServiceError::InvalidOperation(format!(
                "Order {} cannot move from {} to {}",
                id, current, next
            )));
        }

        let branch_id = order.branch_id;
        let product_id = order.product_id;
        let company_id = order.company_id;
        let quantity = order.quantity;
        let now = Utc::now();

        let mut active: OrderActiveModel = order.into();
        active.status = Set(next.to_string());
        active.updated_at = Set(Some(now.into()));

        let stock_change = if next == OrderStatus::Delivered {
            active.delivered_at = Set(Some(now.into()));
            Some(
                stock::apply_delta(&txn, branch_id, product_id, company_id, quantity).await?,
            )
        } else {
            None
        };

        let model = active.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %id, "Failed to commit order status transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %id, status = %next, "Order status updated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::OrderStatusChanged {
                    order_id: id,
                    status: next.to_string(),
                })
                .await
            {
                warn!(error = %e, order_id = %id, "Failed to send order status event");
            }

            if let Some((old_quantity, new_quantity)) = stock_change {
                let delivered = event_sender
                    .send(Event::OrderDelivered {
                        order_id: id,
                        branch_id,
                        product_id,
                        quantity,
                    })
                    .await;
                let adjusted = event_sender
                    .send(Event::StockAdjusted {
                        branch_id,
                        product_id,
                        old_quantity,
                        new_quantity,
                    })
                    .await;
                if let Err(e) = delivered.and(adjusted) {
                    warn!(error = %e, order_id = %id, "Failed to send delivery events");
                }
            }
        }

        Ok(model)
    }
}

fn generate_order_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("PO-{}-{}", Utc::now().format("%Y%m%d"), &suffix[..8])
}
