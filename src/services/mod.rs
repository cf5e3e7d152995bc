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
