use async_trait::async_trait;
use serialport::SerialPort;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

pub use builder::*;

use crate::util::*;

mod builder;
pub mod consts;

/// A one-way byte channel to the servo controller
#[async_trait]
pub trait Transport: Send {
    /// Sends one complete frame. On success the whole frame has left the host.
    async fn write_frame(&mut self, frame: &[u8]) -> TrackerResult<()>;
}

pub struct SerialTransport {
    port: Arc<Mutex<Box<dyn SerialPort>>>,
    path: String,
}

impl SerialTransport {
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn write_frame(&mut self, frame: &[u8]) -> TrackerResult<()> {
        let port = self.port.clone();
        let frame = frame.to_vec();

        // Serial writes block until the driver accepts the bytes
        tokio::task::spawn_blocking(move || -> TrackerResult<()> {
            let mut port = port.lock().unwrap_or_else(PoisonError::into_inner);
            port.write_all(&frame)?;
            port.flush()?;
            Ok(())
        })
        .await
        .map_err(|e| TrackerError::Transport(e.to_string()))?
        .map_err(|e| {
            tracing::error!("Write to {} failed: {}", self.path, e);
            e
        })
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        tracing::debug!("Closing serial port {}", self.path);
    }
}
