use crate::{
    db::DbPool,
    entities::branch::Entity as BranchEntity,
    entities::employee::{self, Entity as EmployeeEntity, EmployeeStatus},
    entities::product::{self, ApprovalStatus, Entity as ProductEntity},
    entities::purchase_order::{self, Entity as OrderEntity, OrderStatus},
    entities::sale::{self, Entity as SaleEntity},
    errors::ServiceError,
    services::payroll::month_window,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Business-wide snapshot for the owner dashboard.
#[derive(Debug, Serialize)]
pub struct BusinessSummary {
    pub month: String,
    pub active_employees: u64,
    pub branches: u64,
    pub products_accepted: u64,
    pub products_on_hold: u64,
    pub orders_pending: u64,
    pub sales_count: u64,
    pub revenue: Decimal,
    pub profit_or_loss: Decimal,
}

/// Per-branch rollup for the same month.
#[derive(Debug, Serialize)]
pub struct BranchSummary {
    pub branch_id: Uuid,
    pub branch_code: String,
    pub branch_name: String,
    pub sales_count: u64,
    pub revenue: Decimal,
    pub profit_or_loss: Decimal,
}

#[derive(Clone)]
pub struct AnalyticsService {
    db_pool: Arc<DbPool>,
}

impl AnalyticsService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, month: &str) -> Result<BusinessSummary, ServiceError> {
        let (start, end) = month_window(month)?;
        let db = &*self.db_pool;

        let active_employees = EmployeeEntity::find()
            .filter(employee::Column::Status.eq(EmployeeStatus::Active.to_string()))
            .count(db)
            .await?;
        let branches = BranchEntity::find().count(db).await?;
        let products_accepted = ProductEntity::find()
            .filter(product::Column::ApprovalStatus.eq(ApprovalStatus::Accepted.to_string()))
            .count(db)
            .await?;
        let products_on_hold = ProductEntity::find()
            .filter(product::Column::ApprovalStatus.eq(ApprovalStatus::Hold.to_string()))
            .count(db)
            .await?;
        let orders_pending = OrderEntity::find()
            .filter(purchase_order::Column::Status.eq(OrderStatus::Pending.to_string()))
            .count(db)
            .await?;

        let sales = SaleEntity::find()
            .filter(sale::Column::SoldAt.gte(start))
            .filter(sale::Column::SoldAt.lt(end))
            .all(db)
            .await?;

        let revenue: Decimal = sales.iter().map(|s| s.amount).sum();
        let profit_or_loss: Decimal = sales.iter().map(|s| s.profit_or_loss).sum();

        Ok(BusinessSummary {
            month: month.to_string(),
            active_employees,
            branches,
            products_accepted,
            products_on_hold,
            orders_pending,
            sales_count: sales.len() as u64,
            revenue,
            profit_or_loss,
        })
    }

    /// Groups the month's sales by branch. Branches without sales still
    /// appear with zeroed figures.
    #[instrument(skip(self))]
    pub async fn branch_summaries(&self, month: &str) -> Result<Vec<BranchSummary>, ServiceError> {
        let (start, end) = month_window(month)?;
        let db = &*self.db_pool;

        let branches = BranchEntity::find().all(db).await?;
        let sales = SaleEntity::find()
            .filter(sale::Column::SoldAt.gte(start))
            .filter(sale::Column::SoldAt.lt(end))
            .all(db)
            .await?;

        let mut grouped: HashMap<Uuid, (u64, Decimal, Decimal)> = HashMap::new();
        for s in &sales {
            let entry = grouped
                .entry(s.branch_id)
                .or_insert((0, Decimal::ZERO, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += s.amount;
            entry.2 += s.profit_or_loss;
        }

        Ok(branches
            .into_iter()
            .map(|b| {
                let (sales_count, revenue, profit_or_loss) = grouped
                    .get(&b.id)
                    .copied()
                    .unwrap_or((0, Decimal::ZERO, Decimal::ZERO));
                BranchSummary {
                    branch_id: b.id,
                    branch_code: b.code,
                    branch_name: b.name,
                    sales_count,
                    revenue,
                    profit_or_loss,
                }
            })
            .collect())
    }

    /// Month sales rollup for a single branch (manager dashboard).
    #[instrument(skip(self))]
    pub async fn branch_month(
        &self,
        branch_id: Uuid,
        month: &str,
    ) -> Result<BranchSummary, ServiceError> {
        let (start, end) = month_window(month)?;
        let db = &*self.db_pool;

        let branch = BranchEntity::find_by_id(branch_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Branch {} not found", branch_id)))?;

        let sales = SaleEntity::find()
            .filter(sale::Column::BranchId.eq(branch_id))
            .filter(sale::Column::SoldAt.gte(start))
            .filter(sale::Column::SoldAt.lt(end))
            .all(db)
            .await?;

        Ok(BranchSummary {
            branch_id: branch.id,
            branch_code: branch.code,
            branch_name: branch.name,
            sales_count: sales.len() as u64,
            revenue: sales.iter().map(|s| s.amount).sum(),
            profit_or_loss: sales.iter().map(|s| s.profit_or_loss).sum(),
        })
    }
}
