mod common;

use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use storechain_api::entities::branch;
use storechain_api::entities::employee::StaffRole;
use storechain_api::errors::ServiceError;
use storechain_api::services::employees::{
    CreateEmployeeRequest, EmployeeService, UpdateEmployeeRequest,
};

fn hire_request(email: &str, role: StaffRole) -> CreateEmployeeRequest {
    CreateEmployeeRequest {
        name: "New Hire".to_string(),
        email: email.to_string(),
        phone: "0500000000".to_string(),
        password: "a-strong-password".to_string(),
        role,
        branch_id: None,
        base_salary: dec!(2000),
    }
}

#[tokio::test]
async fn test_create_rejects_duplicate_email() {
    let db = common::setup_db("employee_duplicate").await;
    let service = EmployeeService::new(db.clone(), None);

    service
        .create_employee(hire_request("dup@test.local", StaffRole::Salesman))
        .await
        .expect("Failed to create employee");

    let err = service
        .create_employee(hire_request("dup@test.local", StaffRole::Manager))
        .await
        .expect_err("Duplicate email must conflict");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_separation_is_terminal() {
    let db = common::setup_db("employee_terminal").await;
    let service = EmployeeService::new(db.clone(), None);

    let employee = service
        .create_employee(hire_request("leaver@test.local", StaffRole::Salesman))
        .await
        .expect("Failed to create employee");
    assert_eq!(employee.status, "active");
    assert!(employee.separated_at.is_none());

    let resigned = service
        .resign_employee(employee.id)
        .await
        .expect("Failed to resign employee");
    assert_eq!(resigned.status, "resigned");
    assert!(resigned.separated_at.is_some());

    // No further transitions or edits once separated
    let err = service
        .fire_employee(employee.id)
        .await
        .expect_err("Resigned employees cannot be fired");
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    let err = service
        .update_employee(
            employee.id,
            UpdateEmployeeRequest {
                name: Some("Renamed".to_string()),
                phone: None,
                base_salary: None,
            },
        )
        .await
        .expect_err("Separated employees are immutable");
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn test_fire_sets_status_and_blocks_assignment() {
    let db = common::setup_db("employee_fired").await;
    let service = EmployeeService::new(db.clone(), None);
    let branch = common::create_branch(&db, "EM-01").await;

    let employee = service
        .create_employee(hire_request("fired@test.local", StaffRole::Salesman))
        .await
        .expect("Failed to create employee");

    let fired = service
        .fire_employee(employee.id)
        .await
        .expect("Failed to fire employee");
    assert_eq!(fired.status, "fired");

    let err = service
        .assign_branch(employee.id, branch.id)
        .await
        .expect_err("Fired employees cannot be assigned");
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn test_assigning_a_manager_claims_the_branch() {
    let db = common::setup_db("employee_branch_manager").await;
    let service = EmployeeService::new(db.clone(), None);
    let branch = common::create_branch(&db, "EM-02").await;

    let manager = service
        .create_employee(hire_request("claim-mgr@test.local", StaffRole::Manager))
        .await
        .expect("Failed to create manager");

    let assigned = service
        .assign_branch(manager.id, branch.id)
        .await
        .expect("Failed to assign manager");
    assert_eq!(assigned.branch_id, Some(branch.id));

    let branch_row = branch::Entity::find_by_id(branch.id)
        .one(db.as_ref())
        .await
        .expect("Failed to query branch")
        .expect("Branch should exist");
    assert_eq!(branch_row.manager_id, Some(manager.id));

    // A second active manager is refused
    let rival = service
        .create_employee(hire_request("rival-mgr@test.local", StaffRole::Manager))
        .await
        .expect("Failed to create manager");
    let err = service
        .assign_branch(rival.id, branch.id)
        .await
        .expect_err("Branch already has an active manager");
    assert!(matches!(err, ServiceError::Conflict(_)));

    // Once the incumbent leaves, the branch can be claimed again
    service
        .resign_employee(manager.id)
        .await
        .expect("Failed to resign incumbent");
    let assigned = service
        .assign_branch(rival.id, branch.id)
        .await
        .expect("Failed to assign replacement manager");
    assert_eq!(assigned.branch_id, Some(branch.id));

    let branch_row = branch::Entity::find_by_id(branch.id)
        .one(db.as_ref())
        .await
        .expect("Failed to query branch")
        .expect("Branch should exist");
    assert_eq!(branch_row.manager_id, Some(rival.id));
}

#[tokio::test]
async fn test_assigning_a_salesman_leaves_branch_manager_alone() {
    let db = common::setup_db("employee_branch_salesman").await;
    let service = EmployeeService::new(db.clone(), None);
    let branch = common::create_branch(&db, "EM-03").await;

    let manager = service
        .create_employee(hire_request("em3-mgr@test.local", StaffRole::Manager))
        .await
        .expect("Failed to create manager");
    service
        .assign_branch(manager.id, branch.id)
        .await
        .expect("Failed to assign manager");

    let salesman = service
        .create_employee(hire_request("em3-sales@test.local", StaffRole::Salesman))
        .await
        .expect("Failed to create salesman");
    let assigned = service
        .assign_branch(salesman.id, branch.id)
        .await
        .expect("Failed to assign salesman");
    assert_eq!(assigned.branch_id, Some(branch.id));

    let branch_row = branch::Entity::find_by_id(branch.id)
        .one(db.as_ref())
        .await
        .expect("Failed to query branch")
        .expect("Branch should exist");
    assert_eq!(branch_row.manager_id, Some(manager.id));
}
