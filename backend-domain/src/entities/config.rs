// Runtime configuration handed to the application layer

use serde::{Deserialize, Serialize};

use crate::value_objects::GatewayBackend;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorCredential {
    pub id: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub default_operator: String,
    pub operators: Vec<OperatorCredential>,
    pub qr_module_pixels: u32,
    pub qr_quiet_zone: bool,
    pub max_tickets_per_upload: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub backend: GatewayBackend,
    pub database_url: String,
    pub max_connections: u32,
}
