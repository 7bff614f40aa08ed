//! Generic BLE braille display adapter
//!
//! Discovery identifiers come from configuration, defaulting to the standard
//! GATT Device Information profile used by unbranded and compatible
//! hardware. Accepts both a configurable Latin name prefix and the Korean
//! "점자" prefix many displays advertise.

use crate::cell::Cell;
use crate::config::DeviceConfig;
use crate::device::ble::{BleProfile, BleSession};
use crate::device::BrailleDisplay;
use crate::error::{DeviceError, RelayError};
use crate::events::EventBus;
use crate::translate::BrailleTranslator;
use bluest::btuuid::bluetooth_uuid_from_u16;
use std::sync::Arc;
use uuid::Uuid;

/// Default service: Device Information (0x180A)
pub const DEFAULT_SERVICE: Uuid = bluetooth_uuid_from_u16(0x180A);

/// Default writable characteristic (0x2A29)
pub const DEFAULT_CHARACTERISTIC: Uuid = bluetooth_uuid_from_u16(0x2A29);

const DEFAULT_NAME_PREFIX: &str = "Braille";
const KOREAN_NAME_PREFIX: &str = "점자";

/// Generic BLE braille display with construction-time identifiers
pub struct GenericDisplay {
    session: BleSession,
    translator: Arc<dyn BrailleTranslator>,
}

impl GenericDisplay {
    /// Build from configuration; invalid UUID strings are a config error
    pub fn from_config(
        config: &DeviceConfig,
        translator: Arc<dyn BrailleTranslator>,
        events: EventBus,
    ) -> Result<Self, RelayError> {
        let service = parse_uuid(config.service_uuid.as_deref(), DEFAULT_SERVICE)?;
        let characteristic =
            parse_uuid(config.characteristic_uuid.as_deref(), DEFAULT_CHARACTERISTIC)?;
        let prefix = config
            .name_prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_NAME_PREFIX.to_string());

        let profile = BleProfile {
            service,
            characteristic,
            name_prefixes: vec![prefix, KOREAN_NAME_PREFIX.to_string()],
            fallback_name: "Braille Display".to_string(),
        };

        Ok(Self {
            session: BleSession::new(profile, events),
            translator,
        })
    }
}

fn parse_uuid(value: Option<&str>, default: Uuid) -> Result<Uuid, RelayError> {
    match value {
        None => Ok(default),
        Some(s) => Uuid::parse_str(s)
            .map_err(|e| RelayError::Config(format!("Invalid UUID {s:?}: {e}"))),
    }
}

#[async_trait::async_trait]
impl BrailleDisplay for GenericDisplay {
    async fn connect(&self) -> Result<(), DeviceError> {
        self.session.connect().await
    }

    async fn disconnect(&self) {
        self.session.disconnect().await
    }

    fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    async fn write_cells(&self, cells: &[Cell]) -> Result<(), DeviceError> {
        self.session.write_cells(cells).await
    }

    async fn write_text(&self, text: &str) -> Result<(), DeviceError> {
        self.session.write_text(self.translator.as_ref(), text).await
    }

    fn device_name(&self) -> Option<String> {
        self.session.device_name()
    }

    fn last_error(&self) -> Option<String> {
        self.session.last_error()
    }
}
