mod common;

use rust_decimal_macros::dec;
use storechain_api::auth::Role;
use storechain_api::entities::message::Audience;
use storechain_api::errors::ServiceError;
use storechain_api::events::MessageHub;
use storechain_api::services::messages::{MessageService, SendMessageRequest};
use uuid::Uuid;

fn send(audience: Audience, recipient_id: Option<Uuid>, body: &str) -> SendMessageRequest {
    SendMessageRequest {
        audience,
        recipient_id,
        body: body.to_string(),
    }
}

#[tokio::test]
async fn test_broadcasts_reach_only_their_audience() {
    let db = common::setup_db("messaging_broadcast").await;
    let service = MessageService::new(db.clone(), None, MessageHub::default());

    let branch = common::create_branch(&db, "MS-01").await;
    let manager = common::create_employee(
        &db,
        "ms-mgr@test.local",
        "manager",
        Some(branch.id),
        dec!(3000),
    )
    .await;
    let salesman = common::create_employee(
        &db,
        "ms-sales@test.local",
        "salesman",
        Some(branch.id),
        dec!(1500),
    )
    .await;

    let owner = common::auth_user(Uuid::nil(), "Owner", Role::Owner, None);
    service
        .send_message(&owner, send(Audience::AllSalesmen, None, "Sales push this week"))
        .await
        .expect("Failed to broadcast to salesmen");
    service
        .send_message(&owner, send(Audience::AllStaff, None, "Holiday schedule"))
        .await
        .expect("Failed to broadcast to staff");

    let salesman_user =
        common::auth_user(salesman.id, &salesman.name, Role::Salesman, Some(branch.id));
    let inbox = service
        .inbox(&salesman_user)
        .await
        .expect("Failed to read salesman inbox");
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().all(|m| m.sender_name == "Owner"));

    // Managers see all_staff but not all_salesmen
    let manager_user =
        common::auth_user(manager.id, &manager.name, Role::Manager, Some(branch.id));
    let inbox = service
        .inbox(&manager_user)
        .await
        .expect("Failed to read manager inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].message.body, "Holiday schedule");
}

#[tokio::test]
async fn test_broadcast_audiences_are_role_gated() {
    let db = common::setup_db("messaging_owner_only").await;
    let service = MessageService::new(db.clone(), None, MessageHub::default());

    let branch = common::create_branch(&db, "MS-02").await;
    let manager = common::create_employee(
        &db,
        "ms2-mgr@test.local",
        "manager",
        Some(branch.id),
        dec!(3000),
    )
    .await;
    let salesman = common::create_employee(
        &db,
        "ms2-sales@test.local",
        "salesman",
        Some(branch.id),
        dec!(1500),
    )
    .await;
    let manager_user =
        common::auth_user(manager.id, &manager.name, Role::Manager, Some(branch.id));
    let salesman_user =
        common::auth_user(salesman.id, &salesman.name, Role::Salesman, Some(branch.id));

    // Managers may address their salesmen
    service
        .send_message(&manager_user, send(Audience::AllSalesmen, None, "Meeting at 9"))
        .await
        .expect("Managers can broadcast to salesmen");

    let inbox = service
        .inbox(&salesman_user)
        .await
        .expect("Failed to read salesman inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].message.body, "Meeting at 9");
    assert_eq!(inbox[0].sender_name, manager.name);

    // The wider audiences stay owner-only
    let err = service
        .send_message(&manager_user, send(Audience::AllStaff, None, "All hands"))
        .await
        .expect_err("Managers cannot address all staff");
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = service
        .send_message(&manager_user, send(Audience::AllManagers, None, "Peers"))
        .await
        .expect_err("Managers cannot address other managers");
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = service
        .send_message(&salesman_user, send(Audience::AllSalesmen, None, "Hi all"))
        .await
        .expect_err("Salesmen cannot broadcast at all");
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn test_direct_messages_require_a_recipient_and_stay_private() {
    let db = common::setup_db("messaging_direct").await;
    let service = MessageService::new(db.clone(), None, MessageHub::default());

    let branch = common::create_branch(&db, "MS-03").await;
    let manager = common::create_employee(
        &db,
        "ms3-mgr@test.local",
        "manager",
        Some(branch.id),
        dec!(3000),
    )
    .await;
    let salesman = common::create_employee(
        &db,
        "ms3-sales@test.local",
        "salesman",
        Some(branch.id),
        dec!(1500),
    )
    .await;
    let bystander = common::create_employee(
        &db,
        "ms3-other@test.local",
        "salesman",
        Some(branch.id),
        dec!(1500),
    )
    .await;

    let manager_user =
        common::auth_user(manager.id, &manager.name, Role::Manager, Some(branch.id));

    let err = service
        .send_message(&manager_user, send(Audience::Direct, None, "Where's the invoice?"))
        .await
        .expect_err("Direct messages need a recipient");
    assert!(matches!(err, ServiceError::BadRequest(_)));

    service
        .send_message(
            &manager_user,
            send(Audience::Direct, Some(salesman.id), "Where's the invoice?"),
        )
        .await
        .expect("Failed to send direct message");

    // Recipient and sender see it; nobody else does
    let recipient =
        common::auth_user(salesman.id, &salesman.name, Role::Salesman, Some(branch.id));
    let inbox = service
        .inbox(&recipient)
        .await
        .expect("Failed to read recipient inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].sender_name, manager.name);

    let inbox = service
        .inbox(&manager_user)
        .await
        .expect("Failed to read sender inbox");
    assert_eq!(inbox.len(), 1);

    let outsider = common::auth_user(
        bystander.id,
        &bystander.name,
        Role::Salesman,
        Some(branch.id),
    );
    let inbox = service
        .inbox(&outsider)
        .await
        .expect("Failed to read bystander inbox");
    assert!(inbox.is_empty());
}

#[tokio::test]
async fn test_owner_cannot_attach_recipient_to_broadcast() {
    let db = common::setup_db("messaging_broadcast_recipient").await;
    let service = MessageService::new(db.clone(), None, MessageHub::default());

    let owner = common::auth_user(Uuid::nil(), "Owner", Role::Owner, None);
    let err = service
        .send_message(
            &owner,
            send(Audience::AllManagers, Some(Uuid::new_v4()), "Mixed addressing"),
        )
        .await
        .expect_err("Broadcasts cannot name a recipient");
    assert!(matches!(err, ServiceError::BadRequest(_)));
}

#[tokio::test]
async fn test_messages_fan_out_to_hub_subscribers() {
    let db = common::setup_db("messaging_hub").await;
    let hub = MessageHub::default();
    let service = MessageService::new(db.clone(), None, hub.clone());

    let mut rx = hub.subscribe();
    let owner = common::auth_user(Uuid::nil(), "Owner", Role::Owner, None);
    let stored = service
        .send_message(&owner, send(Audience::AllStaff, None, "Live update"))
        .await
        .expect("Failed to send message");

    let notice = rx.recv().await.expect("Hub should deliver the notice");
    assert_eq!(notice.id, stored.id);
    assert_eq!(notice.body, "Live update");
    assert_eq!(notice.sender_name, "Owner");

    // No subscribers is fine; the message is still stored
    drop(rx);
    service
        .send_message(&owner, send(Audience::AllStaff, None, "Into the void"))
        .await
        .expect("Sending without subscribers must succeed");
}
