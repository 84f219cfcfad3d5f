mod common;

use std::io::{Cursor, Read};
use std::sync::Arc;

use backend_application::commands::scan_commands::{process_scan, scan_frame};
use backend_application::commands::upload_commands::upload_roster;
use backend_application::queries::attendee_queries::list_attendees;
use backend_application::queries::ticket_queries::{export_archive, render_ticket};
use backend_domain::ports::{BackendGateway, CodeDecoder};
use backend_domain::{AttendeeQuery, ExportQuery, OperatorId, ScanOutcome, TicketQuery};

use common::{memory_state, sqlite_gateway, state_with};

fn organizer() -> OperatorId {
    OperatorId::new("organizer")
}

#[tokio::test]
async fn roster_to_admission_in_memory() {
    let state = memory_state();
    let report = upload_roster(&state, &organizer(), "name,gate,quantity\nAda,GateA,2\nLin,GateB,1")
        .await
        .expect("upload");
    let tokens: Vec<&str> = report
        .attendees
        .iter()
        .map(|attendee| attendee.ticket_token.as_str())
        .collect();
    assert_eq!(tokens, vec!["Ada-1", "Ada-2", "Lin-1"]);

    // The rendered image is what a gate camera would see.
    let ticket = render_ticket(
        &state,
        TicketQuery {
            token: "Ada-2".to_string(),
        },
    )
    .await
    .expect("render");
    assert_eq!(ticket.file_name, "Ada-2.png");

    let gate = OperatorId::new("gate-1");
    let first = scan_frame(&state, &ticket.png, &gate).await.expect("frame");
    match first {
        ScanOutcome::Success { attendee } => {
            assert_eq!(attendee.name, "Ada");
            assert_eq!(attendee.gate.as_deref(), Some("GateA"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    let second = scan_frame(&state, &ticket.png, &gate).await.expect("frame");
    assert_eq!(second.status(), "already_scanned");
    assert_eq!(process_scan(&state, "Ada-3", &gate).await, ScanOutcome::NotFound);

    let overview = list_attendees(&state, AttendeeQuery::default())
        .await
        .expect("overview");
    assert_eq!(overview.total, 3);
    assert_eq!(overview.scanned, 1);
    assert_eq!(state.gateway.list_scans().await.expect("scans").len(), 1);
}

#[tokio::test]
async fn grouped_export_opens_as_zip_with_decodable_tickets() {
    let state = memory_state();
    upload_roster(
        &state,
        &organizer(),
        "name,gate,email,qty\nJohn Doe,Gate A,john@gmail.com,2\nJane Smith,Gate B,jane@gmail.com,1",
    )
    .await
    .expect("upload");

    let bytes = export_archive(
        &state,
        ExportQuery {
            contact: None,
            grouped: Some(true),
        },
    )
    .await
    .expect("export");

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("zip");
    let mut names: Vec<String> = archive.file_names().map(ToString::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "jane@gmail.com-1/jane@gmail.com-1.png",
            "john@gmail.com-1/john@gmail.com-1.png",
            "john@gmail.com-1/john@gmail.com-2.png",
        ]
    );

    let mut png = Vec::new();
    archive
        .by_name("john@gmail.com-1/john@gmail.com-2.png")
        .expect("entry")
        .read_to_end(&mut png)
        .expect("read");
    let decoded = state.decoder.decode_image(&png).expect("decode");
    assert_eq!(decoded, vec!["john@gmail.com-2".to_string()]);
}

#[tokio::test]
async fn numbering_survives_a_restart_on_sqlite() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("gate.db").display());

    {
        let state = state_with(Arc::new(sqlite_gateway(&url, 2).await));
        upload_roster(&state, &organizer(), "name,gate,email\nJohn,G,john@x.io")
            .await
            .expect("first upload");
        assert!(process_scan(&state, "john@x.io-1", &organizer()).await.is_admitted());
    }

    let state = state_with(Arc::new(sqlite_gateway(&url, 2).await));
    let report = upload_roster(&state, &organizer(), "name,gate,email,qty\nJohn,G,john@x.io,2")
        .await
        .expect("second upload");
    let tokens: Vec<&str> = report
        .attendees
        .iter()
        .map(|attendee| attendee.ticket_token.as_str())
        .collect();
    assert_eq!(tokens, vec!["john@x.io-2", "john@x.io-3"]);
    assert_eq!(
        process_scan(&state, "john@x.io-1", &organizer()).await.status(),
        "already_scanned"
    );
}
