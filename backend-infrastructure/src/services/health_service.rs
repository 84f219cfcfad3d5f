use std::sync::Arc;

use async_trait::async_trait;
use backend_domain::ports::{BackendGateway, HealthCheckService};

pub struct DefaultHealthService {
    gateway: Arc<dyn BackendGateway>,
}

impl DefaultHealthService {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_database(&self) -> anyhow::Result<bool> {
        self.gateway.ping().await.map(|_| true).map_err(anyhow::Error::from)
    }
}
