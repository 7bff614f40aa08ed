// Command-line interface definitions for dotrelay
//
// This module is separate so it can be used by both the binary (main.rs)
// and integration tests that exercise argument parsing.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dotrelay")]
#[command(author, version, about = "Text-to-braille-display relay")]
#[command(long_about = "
Dotrelay turns text into display-sized braille chunks and drives a
refreshable braille display over Bluetooth LE.

USAGE:
  dotrelay segment \"some text\"        Show the chunk boundaries
  dotrelay write \"some text\"          Send one chunk set to the display
  dotrelay play \"some text\"           Auto-advance through the chunks
  dotrelay config --init              Write the default config file

Set DOTRELAY_DEVICE=mock to run without hardware.
")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Override device type (orbit, generic, mock, auto)
    #[arg(long, value_name = "TYPE")]
    pub device: Option<String>,

    /// Override display capacity in braille cells
    #[arg(long, value_name = "N")]
    pub max_cells: Option<usize>,

    /// Override chunk strategy (word, sentence, smart)
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Segment text and print the resulting chunks
    Segment {
        /// Text to segment
        text: String,
    },

    /// Write text to the display, one chunk set, first chunk shown
    Write {
        /// Text to send
        text: String,
    },

    /// Play text chunk by chunk with timed auto-advance
    Play {
        /// Text to play
        text: String,

        /// Override auto-advance interval in milliseconds
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
    },

    /// Show current configuration
    Config {
        /// Write the default config file if it doesn't exist
        #[arg(long)]
        init: bool,
    },
}
