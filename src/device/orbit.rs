//! Orbit Reader 20 adapter
//!
//! Named-profile adapter with fixed discovery identifiers for the Orbit
//! Reader hardware family. Protocol-wise identical to the generic adapter.

use crate::cell::Cell;
use crate::device::ble::{BleProfile, BleSession};
use crate::device::BrailleDisplay;
use crate::error::DeviceError;
use crate::events::EventBus;
use crate::translate::BrailleTranslator;
use bluest::btuuid::bluetooth_uuid_from_u16;
use std::sync::Arc;
use uuid::Uuid;

/// Primary service advertised by the Orbit Reader 20 (0x180F)
pub const ORBIT_SERVICE: Uuid = bluetooth_uuid_from_u16(0x180F);

/// Writable cell characteristic (0x2A19)
pub const ORBIT_CHARACTERISTIC: Uuid = bluetooth_uuid_from_u16(0x2A19);

/// Orbit Reader 20 braille display
pub struct OrbitDisplay {
    session: BleSession,
    translator: Arc<dyn BrailleTranslator>,
}

impl OrbitDisplay {
    pub fn new(translator: Arc<dyn BrailleTranslator>, events: EventBus) -> Self {
        let profile = BleProfile {
            service: ORBIT_SERVICE,
            characteristic: ORBIT_CHARACTERISTIC,
            name_prefixes: vec!["Orbit".to_string()],
            fallback_name: "Orbit Reader 20".to_string(),
        };
        Self {
            session: BleSession::new(profile, events),
            translator,
        }
    }
}

#[async_trait::async_trait]
impl BrailleDisplay for OrbitDisplay {
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
