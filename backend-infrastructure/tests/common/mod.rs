#![allow(dead_code)]

use std::sync::Arc;

use backend_application::{AppState, Metrics};
use backend_domain::ports::BackendGateway;
use backend_domain::{DbConfig, GatewayBackend, RuntimeConfig};
use backend_infrastructure::{
    DefaultHealthService,
    InMemoryGateway,
    QrCodec,
    SqliteGateway,
    StaticOperatorDirectory,
    ZipPackager,
};

pub fn runtime_config() -> RuntimeConfig {
    RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        default_operator: "organizer".to_string(),
        operators: Vec::new(),
        qr_module_pixels: 4,
        qr_quiet_zone: true,
        max_tickets_per_upload: 1000,
        max_body_bytes: 1024 * 1024,
        request_timeout_seconds: 5,
    }
}

pub fn state_with(gateway: Arc<dyn BackendGateway>) -> AppState {
    let config = runtime_config();
    let codec = Arc::new(QrCodec::from_config(&config));
    AppState {
        operators: Arc::new(StaticOperatorDirectory::from_config(&config)),
        renderer: codec.clone(),
        decoder: codec,
        packager: Arc::new(ZipPackager),
        health: Arc::new(DefaultHealthService::new(gateway.clone())),
        metrics: Arc::new(Metrics::default()),
        gateway,
        config,
    }
}

pub fn memory_state() -> AppState {
    state_with(Arc::new(InMemoryGateway::new()))
}

pub async fn sqlite_gateway(url: &str, max_connections: u32) -> SqliteGateway {
    let gateway = SqliteGateway::connect(&DbConfig {
        backend: GatewayBackend::Sqlite,
        database_url: url.to_string(),
        max_connections,
    })
    .await
    .expect("connect sqlite");
    gateway.ensure_schema().await.expect("schema");
    gateway
}
