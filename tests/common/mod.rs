#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use std::sync::Arc;
use storechain_api::auth::{AuthUser, Role};
use storechain_api::db::{establish_connection, run_migrations, DbPool};
use storechain_api::entities::{branch, company, customer, employee, product, stock_level};
use storechain_api::events::EventSender;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Each test gets its own named shared-cache in-memory database so the
/// pool's connections all see the same data.
pub async fn setup_db(name: &str) -> Arc<DbPool> {
    let url = format!("sqlite:file:{}?mode=memory&cache=shared", name);
    let db = establish_connection(&url)
        .await
        .expect("Failed to connect to test database");
    run_migrations(&db).await.expect("Failed to run migrations");
    Arc::new(db)
}

/// Event sender with a drained receiver so sends never block.
pub fn event_sender() -> Arc<EventSender> {
    let (tx, mut rx) = mpsc::channel(64);
    tokio::spawn(async move { while rx.recv().await.is_some() {} });
    Arc::new(EventSender::new(tx))
}

pub async fn create_branch(db: &DbPool, code: &str) -> branch::Model {
    branch::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        name: Set(format!("Branch {}", code)),
        address: Set("1 Test Street".to_string()),
        manager_id: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to insert branch")
}

pub async fn create_employee(
    db: &DbPool,
    email: &str,
    role: &str,
    branch_id: Option<Uuid>,
    base_salary: Decimal,
) -> employee::Model {
    employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Employee {}", email)),
        email: Set(email.to_string()),
        phone: Set("0100000000".to_string()),
        password_hash: Set("unused-in-tests".to_string()),
        role: Set(role.to_string()),
        branch_id: Set(branch_id),
        base_salary: Set(base_salary),
        status: Set("active".to_string()),
        joined_at: Set(Utc::now().into()),
        separated_at: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to insert employee")
}

pub async fn create_company(db: &DbPool, email: &str) -> company::Model {
    company::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Company {}", email)),
        email: Set(email.to_string()),
        contact_person: Set("Contact".to_string()),
        phone: Set("0200000000".to_string()),
        password_hash: Set("unused-in-tests".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to insert company")
}

pub async fn create_customer(db: &DbPool, email: &str, phone: &str) -> customer::Model {
    customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Customer {}", email)),
        email: Set(email.to_string()),
        phone: Set(phone.to_string()),
        address: Set("2 Test Avenue".to_string()),
        password_hash: Set("unused-in-tests".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to insert customer")
}

pub async fn create_product(
    db: &DbPool,
    company_id: Uuid,
    name: &str,
    cost_price: Decimal,
    sale_price: Decimal,
    approval_status: &str,
) -> product::Model {
    product::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        name: Set(name.to_string()),
        model: Set(format!("{}-MK1", name)),
        cost_price: Set(cost_price),
        sale_price: Set(sale_price),
        approval_status: Set(approval_status.to_string()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to insert product")
}

pub async fn set_stock(
    db: &DbPool,
    branch_id: Uuid,
    product_id: Uuid,
    company_id: Uuid,
    quantity: i32,
) -> stock_level::Model {
    stock_level::ActiveModel {
        id: Set(Uuid::new_v4()),
        branch_id: Set(branch_id),
        product_id: Set(product_id),
        company_id: Set(company_id),
        quantity: Set(quantity),
        updated_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to insert stock row")
}

pub fn auth_user(id: Uuid, name: &str, role: Role, branch_id: Option<Uuid>) -> AuthUser {
    AuthUser {
        user_id: id,
        name: name.to_string(),
        role,
        branch_id,
        token_id: Uuid::new_v4().to_string(),
    }
}
