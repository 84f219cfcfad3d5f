mod common;

use chrono::Utc;
use backend_domain::ports::BackendGateway;
use backend_domain::{
    AttendeeFilter,
    GatewayError,
    NewAttendee,
    NewScan,
    OperatorId,
    ScanInsert,
    TicketToken,
};

use common::sqlite_gateway;

const MEMORY_URL: &str = "sqlite::memory:";

fn unit(contact_key: &str, number: u32, batch: u32) -> NewAttendee {
    NewAttendee {
        display_name: "Jane Smith".to_string(),
        entry_gate: Some("Gate B".to_string()),
        seating_position: None,
        pass_type: Some("VIP".to_string()),
        contact_email: Some(contact_key.to_string()),
        contact_key: contact_key.to_string(),
        quantity_requested: 2,
        ticket_number: number,
        contact_batch: batch,
        ticket_token: TicketToken::new(format!("{}-{}", contact_key, number)),
        created_by: OperatorId::new("organizer"),
    }
}

#[tokio::test]
async fn schema_creation_is_idempotent() {
    let gateway = sqlite_gateway(MEMORY_URL, 1).await;
    gateway.ensure_schema().await.expect("second ensure");
    gateway.ping().await.expect("ping");
}

#[tokio::test]
async fn attendees_round_trip_through_storage() {
    let gateway = sqlite_gateway(MEMORY_URL, 1).await;
    let inserted = gateway
        .insert_attendees(&[unit("jane@x.io", 1, 1), unit("jane@x.io", 2, 1)])
        .await
        .expect("insert");

    let found = gateway
        .find_attendee_by_token(&TicketToken::new("jane@x.io-2"))
        .await
        .expect("find")
        .expect("present");
    assert_eq!(found.id, inserted[1].id);
    assert_eq!(found.pass_type.as_deref(), Some("VIP"));
    assert_eq!(found.seating_position, None);
    assert_eq!(found.created_at, inserted[1].created_at);

    let missing = gateway
        .find_attendee_by_token(&TicketToken::new("jane@x.io-2 "))
        .await
        .expect("find");
    assert!(missing.is_none());

    let listed = gateway
        .list_attendees(&AttendeeFilter {
            contact_key: Some("jane@x.io".to_string()),
        })
        .await
        .expect("list");
    assert_eq!(listed, inserted);
}

#[tokio::test]
async fn failed_batch_leaves_no_rows() {
    let gateway = sqlite_gateway(MEMORY_URL, 1).await;
    gateway
        .insert_attendees(&[unit("a@x.io", 1, 1)])
        .await
        .expect("insert");

    let err = gateway
        .insert_attendees(&[unit("b@x.io", 1, 1), unit("a@x.io", 1, 1)])
        .await
        .expect_err("duplicate token");
    assert!(matches!(err, GatewayError::Conflict(_)));

    let all = gateway
        .list_attendees(&AttendeeFilter::default())
        .await
        .expect("list");
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn contact_cursors_report_highest_numbers() {
    let gateway = sqlite_gateway(MEMORY_URL, 1).await;
    gateway
        .insert_attendees(&[unit("a@x.io", 1, 1), unit("a@x.io", 2, 1), unit("a@x.io", 3, 2)])
        .await
        .expect("insert");

    let cursors = gateway
        .contact_cursors(&["a@x.io".to_string(), "nobody".to_string()])
        .await
        .expect("cursors");
    assert_eq!(cursors.len(), 1);
    assert_eq!(cursors["a@x.io"].last_ticket_number, 3);
    assert_eq!(cursors["a@x.io"].last_batch, 2);
    assert!(gateway.contact_cursors(&[]).await.expect("empty").is_empty());
}

#[tokio::test]
async fn conditional_scan_insert_keeps_the_first_scan() {
    let gateway = sqlite_gateway(MEMORY_URL, 1).await;
    let attendee = gateway
        .insert_attendees(&[unit("a@x.io", 1, 1)])
        .await
        .expect("insert")
        .remove(0);
    let scan = |by: &str| NewScan {
        attendee_id: attendee.id,
        scanned_at: Utc::now(),
        scanned_by: OperatorId::new(by),
    };

    let ScanInsert::Created(first) = gateway.insert_scan_if_absent(scan("gate-1")).await.expect("first") else {
        panic!("first scan must be created");
    };
    let second = gateway.insert_scan_if_absent(scan("gate-2")).await.expect("second");
    assert_eq!(second, ScanInsert::Conflict(first.clone()));

    let stored = gateway
        .find_scan_for_attendee(&attendee.id)
        .await
        .expect("find")
        .expect("present");
    assert_eq!(stored.scanned_by.as_str(), "gate-1");
    assert_eq!(gateway.list_scans().await.expect("list"), vec![first]);
}
