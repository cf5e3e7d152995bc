use crate::{
    db::DbPool,
    entities::employee::{Entity as EmployeeEntity, StaffRole},
    entities::sale::{self, Entity as SaleEntity},
    errors::ServiceError,
};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Monthly pay breakdown for one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayStatement {
    pub employee_id: Uuid,
    pub name: String,
    pub role: String,
    /// Month in YYYY-MM form
    pub month: String,
    pub base_salary: Decimal,
    /// Summed profit_or_loss over the month's sales in scope
    pub total_profit: Decimal,
    pub commission_rate: Decimal,
    pub commission: Decimal,
    pub net_pay: Decimal,
}

#[derive(Clone)]
pub struct PayrollService {
    db_pool: Arc<DbPool>,
}

impl PayrollService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Computes the statement for one employee and month.
    ///
    /// Salesmen earn commission on their own sales; managers earn it on
    /// every sale at their branch. Losses reduce commission, but net pay
    /// never drops below zero.
    #[instrument(skip(self))]
    pub async fn statement(
        &self,
        employee_id: Uuid,
        month: &str,
    ) -> Result<PayStatement, ServiceError> {
        let (start, end) = month_window(month)?;

        let employee = EmployeeEntity::find_by_id(employee_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Employee {} not found", employee_id))
            })?;

        let role = employee
            .staff_role()
            .map_err(|_| ServiceError::InvalidStatus(employee.role.clone()))?;

        let mut query = SaleEntity::find()
            .filter(sale::Column::SoldAt.gte(start))
            .filter(sale::Column::SoldAt.lt(end));
        query = match role {
            StaffRole::Salesman => query.filter(sale::Column::SalesmanId.eq(employee_id)),
            StaffRole::Manager => {
                let branch_id = employee.branch_id.ok_or_else(|| {
                    ServiceError::InvalidOperation(format!(
                        "Manager {} has no branch assignment",
                        employee_id
                    ))
                })?;
                query.filter(sale::Column::BranchId.eq(branch_id))
            }
        };

        let sales = query.all(&*self.db_pool).await?;
        let total_profit: Decimal = sales.iter().map(|s| s.profit_or_loss).sum();

        let commission_rate = commission_rate_for(role);
        let commission = total_profit * commission_rate;
        let net_pay = (employee.base_salary + commission).max(Decimal::ZERO);

        Ok(PayStatement {
            employee_id,
            name: employee.name,
            role: employee.role,
            month: month.to_string(),
            base_salary: employee.base_salary,
            total_profit,
            commission_rate,
            commission,
            net_pay,
        })
    }
}

/// Commission rate: 2% of profit for salesmen, 1% for managers.
pub fn commission_rate_for(role: StaffRole) -> Decimal {
    match role {
        StaffRole::Salesman => dec!(0.02),
        StaffRole::Manager => dec!(0.01),
    }
}

/// Parses "YYYY-MM" into the [start, end) UTC window for that month.
pub fn month_window(month: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    let parse = |s: &str| -> Option<NaiveDate> {
        let (year, month) = s.split_once('-')?;
        let year = i32::from_str(year).ok()?;
        let month = u32::from_str(month).ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)
    };

    let start_date = parse(month).ok_or_else(|| {
        ServiceError::BadRequest(format!("Invalid month '{}', expected YYYY-MM", month))
    })?;
    let end_date = if start_date.month() == 12 {
        NaiveDate::from_ymd_opt(start_date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start_date.year(), start_date.month() + 1, 1)
    }
    .ok_or(ServiceError::InternalServerError)?;

    let start = Utc.from_utc_datetime(&start_date.and_hms_opt(0, 0, 0).unwrap_or_default());
    let end = Utc.from_utc_datetime(&end_date.and_hms_opt(0, 0, 0).unwrap_or_default());
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_window_covers_whole_month() {
        let (start, end) = month_window("2024-03").unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-04-01T00:00:00+00:00");
    }

    #[test]
    fn month_window_wraps_december() {
        let (start, end) = month_window("2024-12").unwrap();
        assert_eq!(start.year(), 2024);
        assert_eq!(end.year(), 2025);
        assert_eq!(end.month(), 1);
    }

    #[test]
    fn month_window_rejects_garbage() {
        assert!(month_window("2024").is_err());
        assert!(month_window("2024-13").is_err());
        assert!(month_window("not-a-month").is_err());
        assert!(month_window("2024-00").is_err());
    }

    #[test]
    fn commission_rates() {
        assert_eq!(commission_rate_for(StaffRole::Salesman), dec!(0.02));
        assert_eq!(commission_rate_for(StaffRole::Manager), dec!(0.01));
    }
}
