use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DbConfig, GatewayBackend, OperatorCredential, RuntimeConfig};

use crate::config::validation::validate_operators;

const SQLITE_SCHEME: &str = "sqlite://";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub backend: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub operators: Vec<OperatorCredential>,
    pub default_operator: String,
    pub qr_module_pixels: u32,
    pub qr_quiet_zone: bool,
    pub max_tickets_per_upload: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            backend: "sqlite".to_string(),
            database_url: "sqlite://./gatecheck.db".to_string(),
            database_max_connections: 5,
            operators: Vec::new(),
            default_operator: "organizer".to_string(),
            qr_module_pixels: 8,
            qr_quiet_zone: true,
            max_tickets_per_upload: 5000,
            max_body_bytes: 4 * 1024 * 1024,
            request_timeout_seconds: 15,
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("GATECHECK_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(Path::new(&path)).await
    }

    pub async fn load_from(file_path: &Path) -> Result<Self> {
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", file_path.display(), err))?
        } else {
            warn!("{} not found, using defaults", file_path.display());
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.backend = self.backend.trim().to_lowercase();
        self.default_operator = self.default_operator.trim().to_string();
        if let Some(log_dir) = &self.log_dir {
            if log_dir.trim().is_empty() {
                self.log_dir = None;
            }
        }
        for operator in &mut self.operators {
            operator.id = operator.id.trim().to_string();
            operator.token = operator.token.trim().to_string();
        }
        if self.database_max_connections == 0 {
            self.database_max_connections = 1;
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.database_url = resolve_sqlite_url(base, &self.database_url);
        if let Some(log_dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, log_dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if !matches!(self.backend.as_str(), "sqlite" | "memory" | "in-memory" | "inmemory") {
            return Err(anyhow!("backend must be 'sqlite' or 'memory', got '{}'", self.backend));
        }
        if self.gateway_backend() == GatewayBackend::Sqlite && self.database_url.trim().is_empty() {
            return Err(anyhow!("database_url must not be empty for the sqlite backend"));
        }
        if self.default_operator.is_empty() {
            return Err(anyhow!("default_operator must not be empty"));
        }
        validate_operators(&self.operators)?;
        if !(1..=64).contains(&self.qr_module_pixels) {
            return Err(anyhow!("qr_module_pixels must be between 1 and 64"));
        }
        if self.max_tickets_per_upload == 0 {
            return Err(anyhow!("max_tickets_per_upload must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        Ok(())
    }

    pub fn gateway_backend(&self) -> GatewayBackend {
        GatewayBackend::from(self.backend.as_str())
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(PathBuf::from)
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            default_operator: self.default_operator.clone(),
            operators: self.operators.clone(),
            qr_module_pixels: self.qr_module_pixels,
            qr_quiet_zone: self.qr_quiet_zone,
            max_tickets_per_upload: self.max_tickets_per_upload,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.gateway_backend(),
            database_url: self.database_url.clone(),
            max_connections: self.database_max_connections,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("GATECHECK_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("GATECHECK_BACKEND") {
            self.backend = value;
        }
        if let Ok(value) = env::var("GATECHECK_DATABASE_URL") {
            self.database_url = value;
        }
        if let Ok(value) = env::var("GATECHECK_DATABASE_MAX_CONNECTIONS") {
            self.database_max_connections = value.parse().unwrap_or(self.database_max_connections);
        }
        if let Ok(value) = env::var("GATECHECK_OPERATORS") {
            self.operators = parse_env_operators(&value);
        }
        if let Ok(value) = env::var("GATECHECK_DEFAULT_OPERATOR") {
            self.default_operator = value;
        }
        if let Ok(value) = env::var("GATECHECK_QR_MODULE_PIXELS") {
            self.qr_module_pixels = value.parse().unwrap_or(self.qr_module_pixels);
        }
        if let Ok(value) = env::var("GATECHECK_QR_QUIET_ZONE") {
            self.qr_quiet_zone = value.parse().unwrap_or(self.qr_quiet_zone);
        }
        if let Ok(value) = env::var("GATECHECK_MAX_TICKETS_PER_UPLOAD") {
            self.max_tickets_per_upload = value.parse().unwrap_or(self.max_tickets_per_upload);
        }
        if let Ok(value) = env::var("GATECHECK_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("GATECHECK_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("GATECHECK_LOG_DIR") {
            self.log_dir = Some(value);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

// Only file-backed sqlite URLs are rebased; in-memory URLs pass through.
fn resolve_sqlite_url(base: &Path, url: &str) -> String {
    let trimmed = url.trim();
    let Some(rest) = trimmed.strip_prefix(SQLITE_SCHEME) else {
        return trimmed.to_string();
    };
    let (file, params) = match rest.split_once('?') {
        Some((file, params)) => (file, Some(params)),
        None => (rest, None),
    };
    if file.is_empty() || file == ":memory:" {
        return trimmed.to_string();
    }
    let resolved = resolve_path(base, file);
    match params {
        Some(params) => format!("{}{}?{}", SQLITE_SCHEME, resolved, params),
        None => format!("{}{}", SQLITE_SCHEME, resolved),
    }
}

/// `id:token` pairs separated by commas.
fn parse_env_operators(value: &str) -> Vec<OperatorCredential> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .filter_map(|item| {
            let (id, token) = item.split_once(':')?;
            Some(OperatorCredential {
                id: id.trim().to_string(),
                token: token.trim().to_string(),
            })
        })
        .collect()
}
