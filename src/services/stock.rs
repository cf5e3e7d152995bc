use crate::{
    db::DbPool,
    entities::stock_level::{
        self, ActiveModel as StockActiveModel, Entity as StockEntity, Model as StockModel,
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Read side of inventory. Mutations happen inside order delivery and
/// sale transactions through [`apply_delta`].
#[derive(Clone)]
pub struct StockService {
    db_pool: Arc<DbPool>,
}

impl StockService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn stock_for_branch(&self, branch_id: Uuid) -> Result<Vec<StockModel>, ServiceError> {
        Ok(StockEntity::find()
            .filter(stock_level::Column::BranchId.eq(branch_id))
            .order_by_asc(stock_level::Column::ProductId)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn stock_for_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<StockModel>, ServiceError> {
        Ok(StockEntity::find()
            .filter(stock_level::Column::CompanyId.eq(company_id))
            .order_by_asc(stock_level::Column::BranchId)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn all_stock(&self) -> Result<Vec<StockModel>, ServiceError> {
        Ok(StockEntity::find()
            .order_by_asc(stock_level::Column::BranchId)
            .all(&*self.db_pool)
            .await?)
    }
}

/// Applies a signed quantity change to the (branch, product, company)
/// stock row inside the caller's transaction. A missing row is created
/// for positive deltas; negative deltas may never take stock below zero.
/// Returns (old_quantity, new_quantity).
pub(crate) async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    branch_id: Uuid,
    product_id: Uuid,
    company_id: Uuid,
    delta: i32,
) -> Result<(i32, i32), ServiceError> {
    let existing = StockEntity::find()
        .filter(stock_level::Column::BranchId.eq(branch_id))
        .filter(stock_level::Column::ProductId.eq(product_id))
        .filter(stock_level::Column::CompanyId.eq(company_id))
        .one(conn)
        .await?;

    match existing {
        Some(row) => {
            let old_quantity = row.quantity;
            let new_quantity = old_quantity + delta;
            if new_quantity < 0 {
                return Err(ServiceError::InsufficientStock(format!(
                    "Requested {} but only {} in stock",
                    -delta, old_quantity
                )));
            }

            let mut active: StockActiveModel = row.into();
            active.quantity = Set(new_quantity);
            active.updated_at = Set(Utc::now().into());
            active.update(conn).await?;

            Ok((old_quantity, new_quantity))
        }
        None => {
            if delta < 0 {
                return Err(ServiceError::InsufficientStock(format!(
                    "Requested {} but the branch holds no stock of this product",
                    -delta
                )));
            }

            StockActiveModel {
                id: Set(Uuid::new_v4()),
                branch_id: Set(branch_id),
                product_id: Set(product_id),
                company_id: Set(company_id),
                quantity: Set(delta),
                updated_at: Set(Utc::now().into()),
            }
            .insert(conn)
            .await?;

            Ok((0, delta))
        }
    }
}
