pub mod branch;
pub mod company;
pub mod customer;
pub mod employee;
pub mod message;
pub mod product;
pub mod purchase_order;
pub mod sale;
pub mod stock_level;
