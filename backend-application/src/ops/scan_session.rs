use std::sync::Arc;

use tracing::{debug, info};

use crate::commands::scan_commands::process_scan;
use crate::{AppError, AppState};
use backend_domain::ports::{DecodeFeed, ScannerDevice};
use backend_domain::{OperatorId, ScanOutcome};

/// A gate session over one scanner device. Each armed period yields exactly
/// one decode; the feed is released right after it so a code held in front
/// of the camera is not processed twice. `scan_next` re-arms.
pub struct ScanSession {
    state: AppState,
    device: Arc<dyn ScannerDevice>,
    operator: OperatorId,
    feed: Option<Box<dyn DecodeFeed>>,
}

impl ScanSession {
    pub async fn start(
        state: AppState,
        device: Arc<dyn ScannerDevice>,
        operator: OperatorId,
    ) -> Result<Self, AppError> {
        let feed = device.open().await?;
        info!("scan session started for {}", operator);
        Ok(Self {
            state,
            device,
            operator,
            feed: Some(feed),
        })
    }

    pub fn is_armed(&self) -> bool {
        self.feed.is_some()
    }

    pub fn operator(&self) -> &OperatorId {
        &self.operator
    }

    /// Waits for the next decode and processes it. Returns `Ok(None)` when
    /// the device stops producing input. Dropping the future before a
    /// decode arrives leaves the session armed.
    pub async fn next_outcome(&mut self) -> Result<Option<ScanOutcome>, AppError> {
        let feed = self
            .feed
            .as_mut()
            .ok_or_else(|| AppError::Device("scanner is not armed".to_string()))?;
        let decoded = feed.next_decode().await;

        if let Some(mut feed) = self.feed.take() {
            feed.release().await;
        }

        let Some(text) = decoded else {
            debug!("scanner feed closed");
            return Ok(None);
        };
        let outcome = process_scan(&self.state, &text, &self.operator).await;
        Ok(Some(outcome))
    }

    pub async fn scan_next(&mut self) -> Result<(), AppError> {
        if self.feed.is_none() {
            self.feed = Some(self.device.open().await?);
        }
        Ok(())
    }

    pub async fn stop(mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.release().await;
        }
        info!("scan session stopped for {}", self.operator);
    }
}
