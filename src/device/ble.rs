//! Shared BLE GATT session plumbing
//!
//! Both hardware adapters are the same session with different discovery
//! parameters: scan filtered by device-name prefix or advertised service,
//! primary service lookup, and a single writable characteristic carrying all
//! cell payloads.
//!
//! Reconnection keeps the previously bound device handle and tries to rebind
//! it first; only when that fails does a fresh scan run. A watcher task
//! subscribes to connection events so a hardware-initiated disconnect clears
//! the session state without anyone polling.

use crate::cell::{pack_cells, Cell};
use crate::error::{DeviceError, TranslateError};
use crate::events::{EventBus, RelayEvent};
use crate::translate::BrailleTranslator;
use bluest::{Adapter, Characteristic, ConnectionEvent, Device};
use futures_lite::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Discovery parameters distinguishing one hardware family from another
#[derive(Debug, Clone)]
pub struct BleProfile {
    /// Primary GATT service advertised by the display
    pub service: Uuid,
    /// Writable characteristic carrying cell payloads
    pub characteristic: Uuid,
    /// Device-name prefixes accepted during discovery
    pub name_prefixes: Vec<String>,
    /// Name shown when the device does not report one
    pub fallback_name: String,
}

/// State observable without holding the session lock
struct Shared {
    connected: AtomicBool,
    device_name: Mutex<Option<String>>,
    last_error: Mutex<Option<String>>,
    events: EventBus,
}

/// Live handles for one hardware session
#[derive(Default)]
struct Handles {
    adapter: Option<Adapter>,
    device: Option<Device>,
    characteristic: Option<Characteristic>,
    watcher: Option<tokio::task::JoinHandle<()>>,
}

/// One GATT session with at most one active hardware connection.
/// Reconnecting replaces the underlying handle rather than duplicating it.
pub struct BleSession {
    profile: BleProfile,
    handles: tokio::sync::Mutex<Handles>,
    shared: Arc<Shared>,
    scan_timeout: Duration,
}

impl BleSession {
    pub fn new(profile: BleProfile, events: EventBus) -> Self {
        Self {
            profile,
            handles: tokio::sync::Mutex::new(Handles::default()),
            shared: Arc::new(Shared {
                connected: AtomicBool::new(false),
                device_name: Mutex::new(None),
                last_error: Mutex::new(None),
                events,
            }),
            scan_timeout: Duration::from_secs(15),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    pub fn device_name(&self) -> Option<String> {
        self.shared.device_name.lock().unwrap().clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.shared.last_error.lock().unwrap().clone()
    }

    pub fn record_error(&self, message: impl Into<String>) {
        *self.shared.last_error.lock().unwrap() = Some(message.into());
    }

    pub async fn connect(&self) -> Result<(), DeviceError> {
        if self.is_connected() {
            return Ok(());
        }

        let mut handles = self.handles.lock().await;
        // A concurrent connect may have won while we waited for the lock
        if self.is_connected() {
            return Ok(());
        }

        *self.shared.last_error.lock().unwrap() = None;

        match self.establish(&mut handles).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.record_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn establish(&self, handles: &mut Handles) -> Result<(), DeviceError> {
        let adapter = match &handles.adapter {
            Some(adapter) => adapter.clone(),
            None => {
                let adapter = Adapter::default().await.ok_or(DeviceError::NoAdapter)?;
                adapter
                    .wait_available()
                    .await
                    .map_err(|e| DeviceError::ConnectFailed(e.to_string()))?;
                handles.adapter = Some(adapter.clone());
                adapter
            }
        };

        // Fast path: rebind the previously discovered device before scanning
        if let Some(device) = handles.device.clone() {
            match self.bind(&adapter, &device, handles).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!("Rebind of known device failed ({}), rescanning", e);
                    handles.device = None;
                    handles.characteristic = None;
                }
            }
        }

        let device = self.discover(&adapter).await?;
        handles.device = Some(device.clone());
        self.bind(&adapter, &device, handles).await
    }

    /// Scan for a device matching the profile's name prefixes or advertising
    /// the profile's service
    async fn discover(&self, adapter: &Adapter) -> Result<Device, DeviceError> {
        tracing::info!(
            "Scanning for braille display (prefixes {:?}, service {})",
            self.profile.name_prefixes,
            self.profile.service
        );

        let mut scan = adapter
            .scan(&[])
            .await
            .map_err(|e| DeviceError::ConnectFailed(e.to_string()))?;

        let found = tokio::time::timeout(self.scan_timeout, async {
            while let Some(discovered) = scan.next().await {
                let name = discovered
                    .adv_data
                    .local_name
                    .clone()
                    .or_else(|| discovered.device.name().ok());

                let name_match = name.as_deref().is_some_and(|n| {
                    self.profile
                        .name_prefixes
                        .iter()
                        .any(|prefix| n.starts_with(prefix.as_str()))
                });
                let service_match = discovered.adv_data.services.contains(&self.profile.service);

                if name_match || service_match {
                    tracing::info!("Found display: {:?}", name);
                    return Some(discovered.device);
                }
            }
            None
        })
        .await;

        match found {
            Ok(Some(device)) => Ok(device),
            _ => Err(DeviceError::NotFound(self.profile.name_prefixes.join(", "))),
        }
    }

    /// Connect the device and resolve the service and write characteristic
    async fn bind(
        &self,
        adapter: &Adapter,
        device: &Device,
        handles: &mut Handles,
    ) -> Result<(), DeviceError> {
        adapter
            .connect_device(device)
            .await
            .map_err(|e| DeviceError::ConnectFailed(e.to_string()))?;

        let services = device
            .discover_services_with_uuid(self.profile.service)
            .await
            .map_err(|e| DeviceError::ConnectFailed(e.to_string()))?;
        let service = services
            .into_iter()
            .find(|s| s.uuid() == self.profile.service)
            .ok_or(DeviceError::ServiceNotFound(self.profile.service))?;

        let characteristics = service
            .discover_characteristics_with_uuid(self.profile.characteristic)
            .await
            .map_err(|e| DeviceError::ConnectFailed(e.to_string()))?;
        let characteristic = characteristics
            .into_iter()
            .find(|c| c.uuid() == self.profile.characteristic)
            .ok_or(DeviceError::CharacteristicNotFound(self.profile.characteristic))?;

        let name = device
            .name()
            .ok()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.profile.fallback_name.clone());

        handles.characteristic = Some(characteristic);
        if let Some(old) = handles.watcher.take() {
            old.abort();
        }
        handles.watcher = Some(spawn_disconnect_watcher(
            Arc::clone(&self.shared),
            adapter.clone(),
            device.clone(),
        ));

        *self.shared.device_name.lock().unwrap() = Some(name.clone());
        self.shared.connected.store(true, Ordering::SeqCst);
        self.shared
            .events
            .publish(RelayEvent::DeviceConnected { name: name.clone() });
        tracing::info!("Connected to {}", name);

        Ok(())
    }

    pub async fn disconnect(&self) {
        let mut handles = self.handles.lock().await;

        if let Some(watcher) = handles.watcher.take() {
            watcher.abort();
        }
        if let (Some(adapter), Some(device)) = (&handles.adapter, &handles.device) {
            if let Err(e) = adapter.disconnect_device(device).await {
                tracing::debug!("Disconnect: {}", e);
            }
        }
        handles.device = None;
        handles.characteristic = None;

        self.shared.connected.store(false, Ordering::SeqCst);
        *self.shared.device_name.lock().unwrap() = None;
        *self.shared.last_error.lock().unwrap() = None;
        tracing::info!("Display session closed");
    }

    /// Pack cells and transmit them as a single characteristic write
    pub async fn write_cells(&self, cells: &[Cell]) -> Result<(), DeviceError> {
        if !self.is_connected() {
            return Err(DeviceError::NotConnected);
        }

        let characteristic = {
            let handles = self.handles.lock().await;
            handles
                .characteristic
                .clone()
                .ok_or(DeviceError::NotConnected)?
        };

        let payload = pack_cells(cells);
        match characteristic.write(&payload).await {
            Ok(()) => {
                tracing::debug!("Wrote {} cells", cells.len());
                Ok(())
            }
            Err(e) => {
                let err = DeviceError::WriteFailed(e.to_string());
                self.record_error(err.to_string());
                Err(err)
            }
        }
    }

    /// Translate text and transmit the resulting cells. Blank input is a
    /// no-op; translation failures are recorded and surfaced, not swallowed.
    pub async fn write_text(
        &self,
        translator: &dyn BrailleTranslator,
        text: &str,
    ) -> Result<(), DeviceError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        if !self.is_connected() {
            return Err(DeviceError::NotConnected);
        }

        let cells = translator.translate(text).await.map_err(|e: TranslateError| {
            self.record_error(e.to_string());
            DeviceError::from(e)
        })?;

        self.write_cells(&cells).await
    }
}

/// Watch for hardware-initiated disconnects and clear session state
fn spawn_disconnect_watcher(
    shared: Arc<Shared>,
    adapter: Adapter,
    device: Device,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = match adapter.device_connection_events(&device).await {
            Ok(events) => events,
            Err(e) => {
                tracing::debug!("Connection events unavailable: {}", e);
                return;
            }
        };

        while let Some(event) = events.next().await {
            if matches!(event, ConnectionEvent::Disconnected) {
                shared.connected.store(false, Ordering::SeqCst);
                *shared.last_error.lock().unwrap() =
                    Some(DeviceError::ConnectionLost.to_string());
                shared.events.publish(RelayEvent::DeviceDisconnected);
                tracing::warn!("Braille display disconnected");
            }
        }
    })
}
