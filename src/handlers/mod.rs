pub mod accounts;
pub mod analytics;
pub mod branches;
pub mod employees;
pub mod messages;
pub mod orders;
pub mod payroll;
pub mod products;
pub mod sales;
pub mod stock;

use crate::db::DbPool;
use crate::events::{EventSender, MessageHub};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<crate::services::accounts::AccountService>,
    pub analytics: Arc<crate::services::analytics::AnalyticsService>,
    pub branches: Arc<crate::services::branches::BranchService>,
    pub employees: Arc<crate::services::employees::EmployeeService>,
    pub messages: Arc<crate::services::messages::MessageService>,
    pub orders: Arc<crate::services::orders::OrderService>,
    pub payroll: Arc<crate::services::payroll::PayrollService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub sales: Arc<crate::services::sales::SaleService>,
    pub stock: Arc<crate::services::stock::StockService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, hub: MessageHub) -> Self {
        Self {
            accounts: Arc::new(crate::services::accounts::AccountService::new(
                db_pool.clone(),
            )),
            analytics: Arc::new(crate::services::analytics::AnalyticsService::new(
                db_pool.clone(),
            )),
            branches: Arc::new(crate::services::branches::BranchService::new(
                db_pool.clone(),
            )),
            employees: Arc::new(crate::services::employees::EmployeeService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            messages: Arc::new(crate::services::messages::MessageService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
                hub,
            )),
            orders: Arc::new(crate::services::orders::OrderService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            payroll: Arc::new(crate::services::payroll::PayrollService::new(
                db_pool.clone(),
            )),
            products: Arc::new(crate::services::products::ProductService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            sales: Arc::new(crate::services::sales::SaleService::new(
                db_pool.clone(),
                Some(event_sender),
            )),
            stock: Arc::new(crate::services::stock::StockService::new(db_pool)),
        }
    }
}
