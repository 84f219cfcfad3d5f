use async_trait::async_trait;

use crate::entities::ArchiveEntry;
use crate::errors::DeviceError;
use crate::value_objects::{OperatorId, TicketToken};

#[async_trait]
pub trait OperatorDirectory: Send + Sync {
    /// Identity of the operator presenting `bearer`, if any.
    async fn current_operator(&self, bearer: Option<&str>) -> Option<OperatorId>;
}

pub trait CodeRenderer: Send + Sync {
    fn render_png(&self, token: &TicketToken) -> anyhow::Result<Vec<u8>>;
}

pub trait CodeDecoder: Send + Sync {
    fn decode_image(&self, image: &[u8]) -> anyhow::Result<Vec<String>>;
}

pub trait ArchivePackager: Send + Sync {
    fn package_files(&self, entries: &[ArchiveEntry]) -> anyhow::Result<Vec<u8>>;
}

/// A code scanner. At most one feed may be open at a time.
#[async_trait]
pub trait ScannerDevice: Send + Sync {
    async fn open(&self) -> Result<Box<dyn DecodeFeed>, DeviceError>;
}

#[async_trait]
pub trait DecodeFeed: Send {
    /// Next decoded text, or `None` once the device is gone.
    async fn next_decode(&mut self) -> Option<String>;
    async fn release(&mut self);
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_database(&self) -> anyhow::Result<bool>;
}
