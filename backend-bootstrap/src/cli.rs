use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::info;

use backend_application::commands::upload_commands::upload_roster;
use backend_application::ops::scan_session::ScanSession;
use backend_application::queries::ticket_queries::export_archive;
use backend_application::AppState;
use backend_domain::ports::ScannerDevice;
use backend_domain::{ExportQuery, OperatorId, ScanOutcome, UploadReport};
use backend_infrastructure::LineScanner;

pub fn resolve_operator(state: &AppState, operator: Option<String>) -> OperatorId {
    let id = operator
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| state.config.default_operator.clone());
    OperatorId::new(id)
}

pub async fn run_import(state: &AppState, csv_path: &Path, operator: &OperatorId) -> Result<UploadReport> {
    let text = fs::read_to_string(csv_path)
        .await
        .with_context(|| format!("cannot read {}", csv_path.display()))?;
    let report = upload_roster(state, operator, &text).await?;

    println!(
        "imported {} tickets ({} rows dropped), roster sha256 {}",
        report.tickets, report.dropped_rows, report.roster_sha256
    );
    for attendee in &report.attendees {
        println!("{}\t{}", attendee.ticket_token, attendee.display_name);
    }
    Ok(report)
}

pub async fn run_export(
    state: &AppState,
    out_path: &Path,
    contact: Option<String>,
    grouped: bool,
) -> Result<usize> {
    let archive = export_archive(
        state,
        ExportQuery {
            contact,
            grouped: Some(grouped),
        },
    )
    .await?;
    fs::write(out_path, &archive)
        .await
        .with_context(|| format!("cannot write {}", out_path.display()))?;
    println!("wrote {} ({} bytes)", out_path.display(), archive.len());
    Ok(archive.len())
}

/// Gate loop over a scanner device until its input ends or Ctrl-C.
pub async fn run_scan(state: AppState, device: Arc<dyn ScannerDevice>, operator: OperatorId) -> Result<()> {
    let mut session = ScanSession::start(state, device, operator).await?;
    println!("ready to scan as {} (Ctrl-C to stop)", session.operator());

    loop {
        let next = tokio::select! {
            next = session.next_outcome() => next?,
            _ = tokio::signal::ctrl_c() => {
                info!("scan session cancelled");
                break;
            }
        };
        let Some(outcome) = next else {
            break;
        };
        println!("{}", describe(&outcome));
        session.scan_next().await?;
    }

    session.stop().await;
    Ok(())
}

pub async fn run_stdin_scan(state: AppState, operator: OperatorId) -> Result<()> {
    run_scan(state, Arc::new(LineScanner::stdin()), operator).await
}

pub fn describe(outcome: &ScanOutcome) -> String {
    match outcome {
        ScanOutcome::Success { attendee } | ScanOutcome::AlreadyScanned { attendee, .. } => {
            let mut line = format!("{}: {} | pass {}", outcome.message(), attendee.name, attendee.pass);
            if let Some(gate) = &attendee.gate {
                line.push_str(&format!(" | gate {}", gate));
            }
            if let Some(seat) = &attendee.seat {
                line.push_str(&format!(" | seat {}", seat));
            }
            if let ScanOutcome::AlreadyScanned { previous_scanned_at, .. } = outcome {
                line.push_str(&format!(" | first scanned {}", previous_scanned_at.to_rfc3339()));
            }
            line
        }
        ScanOutcome::NotFound | ScanOutcome::Error { .. } => outcome.message(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;
    use crate::context::AppContext;
    use backend_infrastructure::AppConfig;

    async fn memory_state() -> AppState {
        let config = AppConfig {
            backend: "memory".to_string(),
            ..AppConfig::default()
        };
        AppContext::new(&config).await.expect("context").state
    }

    #[tokio::test]
    async fn import_then_export_round_trip() {
        let state = memory_state().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let csv = dir.path().join("roster.csv");
        std::fs::write(&csv, "name,gate,email,qty\nJohn,G,john@x.io,2\n").expect("write csv");

        let operator = resolve_operator(&state, Some("  ".to_string()));
        assert_eq!(operator.as_str(), "organizer");
        let report = run_import(&state, &csv, &operator).await.expect("import");
        assert_eq!(report.tickets, 2);

        let out = dir.path().join("tickets.zip");
        run_export(&state, &out, None, true).await.expect("export");
        let mut archive = zip::ZipArchive::new(Cursor::new(std::fs::read(&out).expect("read zip")))
            .expect("zip");
        assert_eq!(archive.len(), 2);
        let mut png = Vec::new();
        archive
            .by_name("john@x.io-1/john@x.io-2.png")
            .expect("entry")
            .read_to_end(&mut png)
            .expect("read");
        assert_eq!(
            state.decoder.decode_image(&png).expect("decode"),
            vec!["john@x.io-2".to_string()]
        );
    }

    #[tokio::test]
    async fn scan_loop_processes_each_line_once() {
        let state = memory_state().await;
        upload_roster(&state, &OperatorId::new("organizer"), "name,gate\nAda,GateA")
            .await
            .expect("upload");

        let device = Arc::new(LineScanner::from_reader(Cursor::new(b"Ada-1\nAda-1\nBob-1\n".to_vec())));
        run_scan(state.clone(), device, OperatorId::new("gate-1"))
            .await
            .expect("scan loop");

        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.scans_admitted, 1);
        assert_eq!(snapshot.scans_already_scanned, 1);
        assert_eq!(snapshot.scans_not_found, 1);
    }

    #[test]
    fn outcome_lines_name_the_attendee() {
        let outcome = ScanOutcome::Success {
            attendee: backend_domain::AttendeeSummary {
                name: "Ada".to_string(),
                gate: Some("GateA".to_string()),
                seat: None,
                pass: "VIP".to_string(),
            },
        };
        assert_eq!(describe(&outcome), "Entry allowed: Ada | pass VIP | gate GateA");
        assert_eq!(describe(&ScanOutcome::NotFound), "Ticket not found");
    }
}
