//! Typed event channel
//!
//! Components publish state changes on an explicit broadcast channel instead
//! of ambient globals: the playback controller announces chunk changes, the
//! BLE session announces connects and hardware-initiated disconnects.
//! Consumers (a UI, the CLI) subscribe explicitly; publishing with no
//! subscribers is a no-op.

use tokio::sync::broadcast;

/// Events emitted by the braille pipeline
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// The active chunk index changed (navigation or auto-advance)
    ChunkChanged { index: usize, total: usize },
    /// Auto-play started or stopped
    Playback { playing: bool },
    /// A display connected
    DeviceConnected { name: String },
    /// The display session ended, usually hardware-initiated
    DeviceDisconnected,
    /// A transmission failed; navigation continues regardless
    WriteFailed { message: String },
}

/// Cloneable handle to the broadcast channel
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RelayEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: RelayEvent) {
        // Send only fails when nobody is listening, which is fine
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_subscribe() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(RelayEvent::ChunkChanged { index: 2, total: 5 });

        match rx.recv().await.unwrap() {
            RelayEvent::ChunkChanged { index, total } => {
                assert_eq!(index, 2);
                assert_eq!(total, 5);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.publish(RelayEvent::DeviceDisconnected);
    }
}
