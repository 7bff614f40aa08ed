//! Chunk playback controller
//!
//! Owns the current-chunk position over a [`ChunkSet`] and drives the
//! display: whenever the index changes, the chunk at the new index is
//! transmitted. Navigation never waits on the hardware; transmission is
//! best-effort and a disconnected display never blocks it.
//!
//! Writes are sequenced: one write is in flight at a time, and a write whose
//! chunk was superseded before it got its turn is skipped, so the display
//! never shows a stale chunk after rapid navigation (last-write-wins at the
//! index level).

use crate::device::BrailleDisplay;
use crate::events::{EventBus, RelayEvent};
use crate::segment::ChunkSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Snapshot of playback state for a UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackView {
    pub current_index: usize,
    pub current_chunk: Option<String>,
    pub total_chunks: usize,
    pub is_playing: bool,
}

#[derive(Debug)]
struct PlayerState {
    index: usize,
    playing: bool,
}

/// Serializes transmissions and drops superseded ones
struct Transmitter {
    display: Option<Arc<dyn BrailleDisplay>>,
    gate: tokio::sync::Mutex<()>,
    generation: AtomicU64,
    events: EventBus,
}

impl Transmitter {
    /// Queue `chunk` for transmission. Returns immediately; the write runs
    /// on its own task behind the gate.
    fn send(self: &Arc<Self>, chunk: String) {
        let Some(display) = self.display.clone() else {
            return;
        };
        if !display.is_connected() {
            tracing::debug!("Display not connected, skipping transmission");
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let transmitter = Arc::clone(self);

        tokio::spawn(async move {
            // One write at a time; earlier writes settle before ours starts
            let _permit = transmitter.gate.lock().await;
            if transmitter.generation.load(Ordering::SeqCst) != generation {
                // A newer chunk was selected while we waited
                return;
            }
            if let Err(e) = display.write_text(&chunk).await {
                tracing::warn!("Braille transmission failed: {}", e);
                transmitter.events.publish(RelayEvent::WriteFailed {
                    message: e.to_string(),
                });
            }
        });
    }
}

/// State machine over `{chunks, current_index, is_playing}` with timer-driven
/// auto-advance. Exclusive owner of its playback state; mutate only through
/// the navigation operations.
pub struct ChunkPlayer {
    chunks: Arc<Vec<String>>,
    state: Arc<Mutex<PlayerState>>,
    transmitter: Arc<Transmitter>,
    events: EventBus,
    interval: Duration,
    advance_task: Option<tokio::task::JoinHandle<()>>,
}

impl ChunkPlayer {
    pub fn new(
        display: Option<Arc<dyn BrailleDisplay>>,
        interval: Duration,
        events: EventBus,
    ) -> Self {
        Self {
            chunks: Arc::new(Vec::new()),
            state: Arc::new(Mutex::new(PlayerState {
                index: 0,
                playing: false,
            })),
            transmitter: Arc::new(Transmitter {
                display,
                gate: tokio::sync::Mutex::new(()),
                generation: AtomicU64::new(0),
                events: events.clone(),
            }),
            events,
            interval,
            advance_task: None,
        }
    }

    /// Replace the chunk set and return to the start. The first chunk is
    /// transmitted immediately when a display is connected.
    pub fn load(&mut self, set: ChunkSet) {
        self.cancel_advance();
        self.chunks = Arc::new(set.into_chunks());
        {
            let mut state = self.state.lock().unwrap();
            state.index = 0;
            state.playing = false;
        }
        if !self.chunks.is_empty() {
            self.announce_and_transmit(0);
        }
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn snapshot(&self) -> PlaybackView {
        let state = self.state.lock().unwrap();
        PlaybackView {
            current_index: state.index,
            current_chunk: self.chunks.get(state.index).cloned(),
            total_chunks: self.chunks.len(),
            is_playing: state.playing,
        }
    }

    pub fn current_index(&self) -> usize {
        self.state.lock().unwrap().index
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    /// Advance one chunk; no-op at the last chunk (never wraps)
    pub fn next(&mut self) {
        let target = self.current_index().saturating_add(1);
        self.go_to(target);
    }

    /// Rewind one chunk; no-op at the first chunk
    pub fn prev(&mut self) {
        let target = self.current_index().saturating_sub(1);
        self.go_to(target);
    }

    /// Jump to `index`, clamped to the valid range. No-op on an empty set.
    pub fn go_to(&mut self, index: usize) {
        if self.chunks.is_empty() {
            return;
        }
        let clamped = index.min(self.chunks.len() - 1);
        let changed = {
            let mut state = self.state.lock().unwrap();
            if state.index == clamped {
                false
            } else {
                state.index = clamped;
                true
            }
        };
        if changed {
            self.announce_and_transmit(clamped);
        }
    }

    /// Start timer-driven auto-advance. No-op when already playing or when
    /// the chunk set is empty. Reaching the last chunk stops playback; it
    /// does not loop.
    pub fn play(&mut self) {
        if self.chunks.is_empty() {
            return;
        }
        {
            let mut state = self.state.lock().unwrap();
            if state.playing {
                return;
            }
            state.playing = true;
        }
        self.events.publish(RelayEvent::Playback { playing: true });

        let state = Arc::clone(&self.state);
        let chunks = Arc::clone(&self.chunks);
        let transmitter = Arc::clone(&self.transmitter);
        let events = self.events.clone();
        let interval = self.interval;

        self.advance_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick of a tokio interval fires immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                // Pause wins over a tick that raced it: the advance applies
                // under the same lock pause() takes.
                let advanced = {
                    let mut state = state.lock().unwrap();
                    if !state.playing {
                        break;
                    }
                    if state.index + 1 < chunks.len() {
                        state.index += 1;
                        Some(state.index)
                    } else {
                        state.playing = false;
                        None
                    }
                };

                match advanced {
                    Some(index) => {
                        events.publish(RelayEvent::ChunkChanged {
                            index,
                            total: chunks.len(),
                        });
                        transmitter.send(chunks[index].clone());
                    }
                    None => {
                        events.publish(RelayEvent::Playback { playing: false });
                        break;
                    }
                }
            }
        }));
    }

    /// Stop auto-advance, keeping the current position
    pub fn pause(&mut self) {
        let was_playing = {
            let mut state = self.state.lock().unwrap();
            std::mem::replace(&mut state.playing, false)
        };
        self.cancel_advance();
        if was_playing {
            self.events.publish(RelayEvent::Playback { playing: false });
        }
    }

    /// Return to the first chunk and stop, regardless of prior state
    pub fn reset(&mut self) {
        let was_playing = {
            let mut state = self.state.lock().unwrap();
            std::mem::replace(&mut state.playing, false)
        };
        self.cancel_advance();
        if was_playing {
            self.events.publish(RelayEvent::Playback { playing: false });
        }

        let changed = {
            let mut state = self.state.lock().unwrap();
            std::mem::replace(&mut state.index, 0) != 0
        };
        if changed && !self.chunks.is_empty() {
            self.announce_and_transmit(0);
        }
    }

    fn announce_and_transmit(&self, index: usize) {
        self.events.publish(RelayEvent::ChunkChanged {
            index,
            total: self.chunks.len(),
        });
        if let Some(chunk) = self.chunks.get(index) {
            self.transmitter.send(chunk.clone());
        }
    }

    fn cancel_advance(&mut self) {
        if let Some(task) = self.advance_task.take() {
            task.abort();
        }
    }
}

impl Drop for ChunkPlayer {
    fn drop(&mut self) {
        // A late-firing advance must not outlive the controller
        self.cancel_advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MockDisplay;
    use crate::segment::{ChunkSet, SegmentOptions, Strategy};
    use crate::translate::LocalTranslator;

    fn chunk_set(text: &str) -> ChunkSet {
        ChunkSet::new(
            text,
            SegmentOptions {
                max_cells: 3,
                strategy: Strategy::Word,
                ..SegmentOptions::default()
            },
        )
    }

    fn player_with_mock() -> (ChunkPlayer, Arc<MockDisplay>) {
        let display = Arc::new(MockDisplay::new());
        let player = ChunkPlayer::new(
            Some(display.clone()),
            Duration::from_millis(100),
            EventBus::new(),
        );
        (player, display)
    }

    /// Let queued transmission tasks settle
    async fn drain() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_navigation_clamps_to_bounds() {
        let (mut player, _display) = player_with_mock();
        player.load(chunk_set("one two three four five"));
        let total = player.chunks().len();
        assert!(total >= 2);

        // prev at index 0 is a no-op
        player.prev();
        assert_eq!(player.current_index(), 0);

        // n-1 next calls reach the last index; one more is a no-op
        for _ in 0..total - 1 {
            player.next();
        }
        assert_eq!(player.current_index(), total - 1);
        player.next();
        assert_eq!(player.current_index(), total - 1);

        player.go_to(9999);
        assert_eq!(player.current_index(), total - 1);
        player.go_to(0);
        assert_eq!(player.current_index(), 0);
    }

    #[tokio::test]
    async fn test_empty_set_navigation_is_noop() {
        let (mut player, _display) = player_with_mock();
        player.load(chunk_set("   "));

        player.next();
        player.prev();
        player.go_to(3);
        player.play();
        assert_eq!(player.current_index(), 0);
        assert!(!player.is_playing());
        assert_eq!(player.snapshot().current_chunk, None);
    }

    #[tokio::test]
    async fn test_index_change_transmits_chunk() {
        let (mut player, display) = player_with_mock();
        display.connect().await.unwrap();

        player.load(chunk_set("ab cd"));
        drain().await;
        assert_eq!(
            display.last_cells(),
            LocalTranslator::cells_for(&player.chunks()[0])
        );

        player.next();
        drain().await;
        assert_eq!(
            display.last_cells(),
            LocalTranslator::cells_for(&player.chunks()[1])
        );
    }

    #[tokio::test]
    async fn test_disconnected_display_never_blocks_navigation() {
        let (mut player, display) = player_with_mock();
        // Never connected: navigation still works, nothing is written
        player.load(chunk_set("ab cd ef"));
        player.next();
        player.next();
        drain().await;
        assert_eq!(player.current_index(), 2);
        assert!(display.last_cells().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_play_runs_out_to_idle() {
        let display = Arc::new(MockDisplay::new());
        display.connect().await.unwrap();
        let mut player = ChunkPlayer::new(
            Some(display.clone()),
            Duration::from_millis(100),
            EventBus::new(),
        );
        // Five two-letter words at 3 cells: exactly one word per chunk
        player.load(chunk_set("aa bb cc dd ee"));
        let total = player.chunks().len();
        assert_eq!(total, 5);

        player.play();
        assert!(player.is_playing());

        // Let enough intervals elapse to walk off the end
        tokio::time::sleep(Duration::from_millis(100 * (total as u64 + 2))).await;
        drain().await;

        assert!(!player.is_playing());
        assert_eq!(player.current_index(), total - 1);

        // It stopped; further time does not wrap around
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(player.current_index(), total - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_cancels_pending_advance() {
        let (mut player, _display) = player_with_mock();
        player.load(chunk_set("one two three four five"));

        player.play();
        tokio::time::sleep(Duration::from_millis(150)).await;
        drain().await;
        let index_at_pause = player.current_index();
        player.pause();
        assert!(!player.is_playing());

        tokio::time::sleep(Duration::from_millis(500)).await;
        drain().await;
        assert_eq!(player.current_index(), index_at_pause);
    }

    #[tokio::test]
    async fn test_reset_returns_to_start_and_idle() {
        let (mut player, _display) = player_with_mock();
        player.load(chunk_set("one two three four five"));
        player.go_to(3);
        player.play();

        player.reset();
        assert_eq!(player.current_index(), 0);
        assert!(!player.is_playing());
    }

    #[tokio::test]
    async fn test_play_requires_chunks() {
        let (mut player, _display) = player_with_mock();
        player.play();
        assert!(!player.is_playing());
    }

    #[tokio::test]
    async fn test_load_replaces_chunkset_wholesale() {
        let (mut player, _display) = player_with_mock();
        player.load(chunk_set("one two three four five"));
        player.go_to(2);

        player.load(chunk_set("ab"));
        assert_eq!(player.current_index(), 0);
        assert!(!player.is_playing());
        assert_eq!(player.snapshot().total_chunks, player.chunks().len());
    }

    #[tokio::test]
    async fn test_snapshot_view() {
        let (mut player, _display) = player_with_mock();
        player.load(chunk_set("ab cd"));
        player.next();

        let view = player.snapshot();
        assert_eq!(view.current_index, 1);
        assert_eq!(view.current_chunk.as_deref(), Some(player.chunks()[1].as_str()));
        assert_eq!(view.total_chunks, 2);
        assert!(!view.is_playing);
    }

    #[tokio::test]
    async fn test_chunk_changed_events_published() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let mut player = ChunkPlayer::new(None, Duration::from_millis(100), bus);
        player.load(chunk_set("ab cd"));
        player.next();

        let mut indices = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let RelayEvent::ChunkChanged { index, .. } = event {
                indices.push(index);
            }
        }
        assert_eq!(indices, vec![0, 1]);
    }
}
