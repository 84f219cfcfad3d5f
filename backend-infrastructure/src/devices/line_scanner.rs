use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::Mutex;
use tracing::warn;

use backend_domain::ports::{DecodeFeed, ScannerDevice};
use backend_domain::DeviceError;

type LineSource = Lines<BufReader<Box<dyn AsyncRead + Send + Unpin>>>;

/// Keyboard-wedge scanner: the device types each decoded code followed by
/// Enter, so every non-blank input line is one decode.
pub struct LineScanner {
    lines: Arc<Mutex<LineSource>>,
    in_use: Arc<AtomicBool>,
}

impl LineScanner {
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let boxed: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: Arc::new(Mutex::new(BufReader::new(boxed).lines())),
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stdin() -> Self {
        Self::from_reader(tokio::io::stdin())
    }
}

#[async_trait]
impl ScannerDevice for LineScanner {
    async fn open(&self) -> Result<Box<dyn DecodeFeed>, DeviceError> {
        if self.in_use.swap(true, Ordering::SeqCst) {
            return Err(DeviceError::Busy);
        }
        Ok(Box::new(LineFeed {
            lines: self.lines.clone(),
            in_use: self.in_use.clone(),
            released: false,
        }))
    }
}

struct LineFeed {
    lines: Arc<Mutex<LineSource>>,
    in_use: Arc<AtomicBool>,
    released: bool,
}

impl LineFeed {
    fn release_device(&mut self) {
        if !self.released {
            self.released = true;
            self.in_use.store(false, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl DecodeFeed for LineFeed {
    async fn next_decode(&mut self) -> Option<String> {
        if self.released {
            return None;
        }
        let mut lines = self.lines.lock().await;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => return Some(line),
                Ok(None) => return None,
                Err(err) => {
                    warn!("scanner input failed: {}", err);
                    return None;
                }
            }
        }
    }

    async fn release(&mut self) {
        self.release_device();
    }
}

impl Drop for LineFeed {
    fn drop(&mut self) {
        self.release_device();
    }
}
