//! Mock braille display for development and automated tests
//!
//! No transport: connect and disconnect succeed immediately and
//! deterministically, writes record the last payload for introspection.

use crate::cell::Cell;
use crate::device::BrailleDisplay;
use crate::error::DeviceError;
use crate::translate::LocalTranslator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub struct MockDisplay {
    connected: AtomicBool,
    last_cells: Mutex<Vec<Cell>>,
    last_error: Mutex<Option<String>>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            last_cells: Mutex::new(Vec::new()),
            last_error: Mutex::new(None),
        }
    }

    /// The most recently written payload (introspection for tests)
    pub fn last_cells(&self) -> Vec<Cell> {
        self.last_cells.lock().unwrap().clone()
    }
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BrailleDisplay for MockDisplay {
    async fn connect(&self) -> Result<(), DeviceError> {
        self.connected.store(true, Ordering::SeqCst);
        *self.last_error.lock().unwrap() = None;
        tracing::debug!("Mock display connected");
        Ok(())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        *self.last_error.lock().unwrap() = None;
        tracing::debug!("Mock display disconnected");
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn write_cells(&self, cells: &[Cell]) -> Result<(), DeviceError> {
        if !self.is_connected() {
            return Err(DeviceError::NotConnected);
        }
        *self.last_cells.lock().unwrap() = cells.to_vec();
        tracing::debug!("Mock display received {} cells", cells.len());
        Ok(())
    }

    async fn write_text(&self, text: &str) -> Result<(), DeviceError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let cells = LocalTranslator::cells_for(text);
        self.write_cells(&cells).await
    }

    fn device_name(&self) -> Option<String> {
        Some("Mock Braille Display".to_string())
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_write_disconnect_cycle() {
        let display = MockDisplay::new();
        assert!(!display.is_connected());

        display.connect().await.unwrap();
        assert!(display.is_connected());

        let cell = Cell::from_bitmask(0b000001);
        display.write_cells(&[cell]).await.unwrap();
        assert_eq!(display.last_cells(), vec![cell]);

        display.disconnect().await;
        assert!(!display.is_connected());
        assert!(matches!(
            display.write_cells(&[cell]).await,
            Err(DeviceError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let display = MockDisplay::new();
        display.connect().await.unwrap();
        display.connect().await.unwrap();
        assert!(display.is_connected());
    }

    #[tokio::test]
    async fn test_write_text_records_cells() {
        let display = MockDisplay::new();
        display.connect().await.unwrap();

        display.write_text("ab").await.unwrap();
        assert_eq!(display.last_cells(), LocalTranslator::cells_for("ab"));
    }

    #[tokio::test]
    async fn test_write_text_blank_is_noop() {
        let display = MockDisplay::new();
        display.connect().await.unwrap();
        display.write_text("   ").await.unwrap();
        assert!(display.last_cells().is_empty());

        // Blank input does not require a connection either
        display.disconnect().await;
        display.write_text("").await.unwrap();
    }

    #[tokio::test]
    async fn test_write_text_rejects_when_disconnected() {
        let display = MockDisplay::new();
        assert!(matches!(
            display.write_text("hello").await,
            Err(DeviceError::NotConnected)
        ));
    }
}
