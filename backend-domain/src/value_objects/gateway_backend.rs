// Gateway backend selector

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayBackend {
    Sqlite,
    Memory,
}

impl GatewayBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayBackend::Sqlite => "sqlite",
            GatewayBackend::Memory => "memory",
        }
    }
}

impl From<&str> for GatewayBackend {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => GatewayBackend::Memory,
            _ => GatewayBackend::Sqlite,
        }
    }
}
