use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::ScanOutcome;

#[derive(Debug, Default)]
pub struct Metrics {
    uploads: AtomicU64,
    upload_errors: AtomicU64,
    tickets_issued: AtomicU64,
    scans_admitted: AtomicU64,
    scans_already_scanned: AtomicU64,
    scans_not_found: AtomicU64,
    scan_errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uploads: u64,
    pub upload_errors: u64,
    pub tickets_issued: u64,
    pub scans_admitted: u64,
    pub scans_already_scanned: u64,
    pub scans_not_found: u64,
    pub scan_errors: u64,
}

impl Metrics {
    pub fn record_upload(&self, ticket_count: usize) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
        self.tickets_issued
            .fetch_add(ticket_count as u64, Ordering::Relaxed);
    }

    pub fn record_upload_error(&self) {
        self.upload_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan(&self, outcome: &ScanOutcome) {
        let counter = match outcome {
            ScanOutcome::Success { .. } => &self.scans_admitted,
            ScanOutcome::AlreadyScanned { .. } => &self.scans_already_scanned,
            ScanOutcome::NotFound => &self.scans_not_found,
            ScanOutcome::Error { .. } => &self.scan_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uploads: self.uploads.load(Ordering::Relaxed),
            upload_errors: self.upload_errors.load(Ordering::Relaxed),
            tickets_issued: self.tickets_issued.load(Ordering::Relaxed),
            scans_admitted: self.scans_admitted.load(Ordering::Relaxed),
            scans_already_scanned: self.scans_already_scanned.load(Ordering::Relaxed),
            scans_not_found: self.scans_not_found.load(Ordering::Relaxed),
            scan_errors: self.scan_errors.load(Ordering::Relaxed),
        }
    }

    pub fn render_prometheus(&self) -> String {
        let snap = self.snapshot();

        format!(
            "# TYPE gatecheck_uploads_total counter\n\
gatecheck_uploads_total {}\n\
# TYPE gatecheck_upload_errors_total counter\n\
gatecheck_upload_errors_total {}\n\
# TYPE gatecheck_tickets_issued_total counter\n\
gatecheck_tickets_issued_total {}\n\
# TYPE gatecheck_scans_total counter\n\
gatecheck_scans_total{{outcome=\"success\"}} {}\n\
gatecheck_scans_total{{outcome=\"already_scanned\"}} {}\n\
gatecheck_scans_total{{outcome=\"not_found\"}} {}\n\
gatecheck_scans_total{{outcome=\"error\"}} {}\n",
            snap.uploads,
            snap.upload_errors,
            snap.tickets_issued,
            snap.scans_admitted,
            snap.scans_already_scanned,
            snap.scans_not_found,
            snap.scan_errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_outcomes_land_in_separate_series() {
        let metrics = Metrics::default();
        metrics.record_scan(&ScanOutcome::NotFound);
        metrics.record_scan(&ScanOutcome::NotFound);
        metrics.record_scan(&ScanOutcome::Error {
            reason: "db".to_string(),
        });
        metrics.record_upload(3);

        let text = metrics.render_prometheus();
        assert!(text.contains("gatecheck_scans_total{outcome=\"not_found\"} 2"));
        assert!(text.contains("gatecheck_scans_total{outcome=\"error\"} 1"));
        assert!(text.contains("gatecheck_tickets_issued_total 3"));
        assert_eq!(metrics.snapshot().uploads, 1);
    }
}
