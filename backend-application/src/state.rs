use std::sync::Arc;

use backend_domain::ports::{
    ArchivePackager,
    BackendGateway,
    CodeDecoder,
    CodeRenderer,
    HealthCheckService,
    OperatorDirectory,
};
use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub gateway: Arc<dyn BackendGateway>,
    pub operators: Arc<dyn OperatorDirectory>,
    pub renderer: Arc<dyn CodeRenderer>,
    pub decoder: Arc<dyn CodeDecoder>,
    pub packager: Arc<dyn ArchivePackager>,
    pub health: Arc<dyn HealthCheckService>,
    pub metrics: Arc<Metrics>,
}
