//! Dotrelay: text-to-braille-display relay
//!
//! This library provides the core functionality for:
//! - Encoding 6-dot braille cells (one byte per cell, bit n-1 = dot n)
//! - Segmenting text into display-sized chunks (word/sentence/smart strategies)
//! - Translating text to cells via an external service with offline fallback
//! - Driving BLE braille displays (Orbit Reader 20, generic GATT hardware)
//! - Stepping through chunks manually or with timed auto-advance
//!
//! # Architecture
//!
//! ```text
//!        text
//!          │
//!          ▼
//! ┌──────────────┐   display-sized chunks   ┌──────────────┐
//! │   Segmenter  │ ───────────────────────▶ │  ChunkPlayer │
//! │ (word/smart) │                          │ (play/pause) │
//! └──────────────┘                          └──────────────┘
//!                                                  │ current chunk
//!                                                  ▼
//!                                           ┌──────────────┐
//!                                           │  Translator  │
//!                                           │ remote→local │
//!                                           └──────────────┘
//!                                                  │ cells
//!                                                  ▼
//!                                           ┌──────────────┐
//!                                           │   Display    │
//!                                           │ orbit/generic│
//!                                           │    /mock     │
//!                                           └──────────────┘
//! ```

pub mod cell;
pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod playback;
pub mod segment;
pub mod translate;

pub use cell::Cell;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use device::{BrailleDisplay, DeviceKind};
pub use error::{RelayError, Result};
pub use events::{EventBus, RelayEvent};
pub use playback::ChunkPlayer;
pub use segment::{ChunkSet, SegmentOptions, Strategy};
pub use translate::BrailleTranslator;
