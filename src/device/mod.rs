//! Braille display hardware abstraction
//!
//! One trait hides the differences between hardware families. Concrete
//! adapters differ only in discovery parameters (name prefix, GATT service
//! and characteristic identifiers); the protocol is identical everywhere:
//! one byte per cell, bit n-1 = dot n, written to a single characteristic.
//!
//! Adapter selection:
//! - `orbit`: Orbit Reader 20 family, fixed identifiers
//! - `generic`: identifiers from config, standard GATT profile defaults
//! - `mock`: no transport, records payloads (development and tests)
//! - `auto`: DOTRELAY_DEVICE override, then generic

pub mod ble;
pub mod generic;
pub mod mock;
pub mod orbit;

use crate::cell::Cell;
use crate::config::DeviceConfig;
use crate::error::{DeviceError, RelayError};
use crate::events::EventBus;
use crate::translate::BrailleTranslator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use generic::GenericDisplay;
pub use mock::MockDisplay;
pub use orbit::OrbitDisplay;

/// Trait for braille display implementations
///
/// All I/O operations are async; a fresh call supersedes a prior in-flight
/// one. Status queries never perform I/O.
#[async_trait::async_trait]
pub trait BrailleDisplay: Send + Sync {
    /// Establish a hardware session. Idempotent: connecting while connected
    /// is a no-op success. On failure, records the error and leaves the
    /// adapter cleanly disconnected.
    async fn connect(&self) -> Result<(), DeviceError>;

    /// Tear down the session unconditionally (best-effort, always succeeds)
    /// and clear the device name and connection handle.
    async fn disconnect(&self);

    /// Pure connection status query
    fn is_connected(&self) -> bool;

    /// Pack cells through the codec and transmit them as one atomic payload.
    /// Rejects with `NotConnected` when there is no session.
    async fn write_cells(&self, cells: &[Cell]) -> Result<(), DeviceError>;

    /// Translate text to cells and transmit. No-op on blank input.
    async fn write_text(&self, text: &str) -> Result<(), DeviceError>;

    /// Name of the connected device, if any
    fn device_name(&self) -> Option<String>;

    /// Most recent connection or transmission error
    fn last_error(&self) -> Option<String>;
}

/// Hardware family selecting a concrete adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Orbit,
    Generic,
    Mock,
    #[default]
    Auto,
}

impl std::str::FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orbit" => Ok(DeviceKind::Orbit),
            "generic" => Ok(DeviceKind::Generic),
            "mock" => Ok(DeviceKind::Mock),
            "auto" => Ok(DeviceKind::Auto),
            other => Err(format!(
                "unknown device type '{other}' (orbit, generic, mock, auto)"
            )),
        }
    }
}

/// Resolve the effective adapter kind.
///
/// Precedence: explicit configuration > environment override > generic.
/// The environment value is injected by the caller so resolution stays
/// testable without process-environment mutation.
pub fn resolve_kind(configured: DeviceKind, env_override: Option<&str>) -> DeviceKind {
    match configured {
        DeviceKind::Auto => env_override
            .and_then(|v| v.parse::<DeviceKind>().ok())
            .filter(|k| *k != DeviceKind::Auto)
            .unwrap_or(DeviceKind::Generic),
        explicit => explicit,
    }
}

/// Create the display adapter for `config`.
///
/// Returns a single shared instance; hold exactly one per logical display so
/// only one BLE session exists at a time.
pub fn create_display(
    config: &DeviceConfig,
    translator: Arc<dyn BrailleTranslator>,
    events: EventBus,
) -> Result<Arc<dyn BrailleDisplay>, RelayError> {
    let kind = resolve_kind(config.kind, std::env::var("DOTRELAY_DEVICE").ok().as_deref());
    tracing::info!("Creating display adapter: {:?}", kind);

    Ok(match kind {
        DeviceKind::Orbit => Arc::new(OrbitDisplay::new(translator, events)),
        DeviceKind::Mock => Arc::new(MockDisplay::new()),
        DeviceKind::Generic | DeviceKind::Auto => {
            Arc::new(GenericDisplay::from_config(config, translator, events)?)
        }
    })
}
