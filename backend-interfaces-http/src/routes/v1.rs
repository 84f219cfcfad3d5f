use axum::Router;

use backend_application::AppState;

use crate::handlers::{attendee_handlers, ops_handlers, roster_handlers, scan_handlers, ticket_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/roster/upload",
            axum::routing::post(roster_handlers::upload_roster),
        )
        .route(
            "/v1/roster/sample",
            axum::routing::get(roster_handlers::sample_roster),
        )
        .route("/v1/scans", axum::routing::post(scan_handlers::submit_scan))
        .route(
            "/v1/scans/frame",
            axum::routing::post(scan_handlers::submit_frame),
        )
        .route(
            "/v1/attendees",
            axum::routing::get(attendee_handlers::list_attendees),
        )
        .route(
            "/v1/tickets/qr",
            axum::routing::get(ticket_handlers::ticket_qr),
        )
        .route(
            "/v1/tickets/export",
            axum::routing::get(ticket_handlers::export_tickets),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
