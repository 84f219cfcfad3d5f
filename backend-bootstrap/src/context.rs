use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use backend_application::{AppState, Metrics};
use backend_domain::ports::BackendGateway;
use backend_domain::GatewayBackend;
use backend_infrastructure::{
    AppConfig,
    DefaultHealthService,
    InMemoryGateway,
    QrCodec,
    SqliteGateway,
    StaticOperatorDirectory,
    ZipPackager,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let gateway: Arc<dyn BackendGateway> = match db_config.backend {
            GatewayBackend::Sqlite => Arc::new(SqliteGateway::connect(&db_config).await?),
            GatewayBackend::Memory => Arc::new(InMemoryGateway::new()),
        };
        gateway.ensure_schema().await?;
        info!("using {} gateway", db_config.backend.as_str());

        let operators = StaticOperatorDirectory::from_config(&runtime_config);
        if operators.is_open() {
            info!(
                "no operators configured, requests act as '{}'",
                runtime_config.default_operator
            );
        }
        let codec = Arc::new(QrCodec::from_config(&runtime_config));

        let state = AppState {
            operators: Arc::new(operators),
            renderer: codec.clone(),
            decoder: codec,
            packager: Arc::new(ZipPackager),
            health: Arc::new(DefaultHealthService::new(gateway.clone())),
            metrics: Arc::new(Metrics::default()),
            gateway,
            config: runtime_config,
        };

        Ok(Self { state })
    }
}
