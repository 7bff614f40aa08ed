//! Dotrelay - text-to-braille-display relay
//!
//! Run `dotrelay segment <text>` to preview chunk boundaries,
//! `dotrelay write <text>` to send text to a connected display, or
//! `dotrelay play <text>` to auto-advance through the chunks.
//! Use `dotrelay config --init` to create the default config file.

use clap::Parser;
use dotrelay::cli::{Cli, Commands};
use dotrelay::config::{self, Config};
use dotrelay::device::{self, BrailleDisplay};
use dotrelay::events::{EventBus, RelayEvent};
use dotrelay::playback::ChunkPlayer;
use dotrelay::segment::ChunkSet;
use dotrelay::translate;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("dotrelay={},warn", log_level))),
        )
        .with_target(false)
        .init();

    // Load configuration
    let mut config = config::load_config(cli.config.as_deref());

    // Apply CLI overrides
    if let Some(device) = cli.device {
        config.device.kind = device
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if let Some(max_cells) = cli.max_cells {
        anyhow::ensure!(max_cells > 0, "--max-cells must be at least 1");
        config.display.max_cells = max_cells;
    }
    if let Some(strategy) = cli.strategy {
        config.display.chunk_strategy = strategy
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
    }

    // Run the appropriate command
    match cli.command.unwrap_or(Commands::Config { init: false }) {
        Commands::Segment { text } => {
            run_segment(&config, &text);
        }

        Commands::Write { text } => {
            run_write(&config, &text).await?;
        }

        Commands::Play { text, interval_ms } => {
            if let Some(ms) = interval_ms {
                config.playback.interval_ms = ms;
            }
            run_play(&config, &text).await?;
        }

        Commands::Config { init } => {
            run_config(&config, init)?;
        }
    }

    Ok(())
}

/// Print the chunk boundaries the current settings produce
fn run_segment(config: &Config, text: &str) {
    let options = config.display.segment_options();
    let set = ChunkSet::new(text, options.clone());

    if set.is_empty() {
        println!("(no chunks)");
        return;
    }

    println!(
        "{} chunk(s), {} cells, {:?} strategy:\n",
        set.len(),
        options.max_cells,
        options.strategy
    );
    for (index, chunk) in set.chunks().iter().enumerate() {
        println!(
            "  [{:>3}] {:?} (~{} cells)",
            index,
            chunk,
            options.weights.estimate(chunk)
        );
    }
}

/// Connect to the display and resolve the adapter from config
async fn connect_display(config: &Config, events: EventBus) -> anyhow::Result<Arc<dyn BrailleDisplay>> {
    let translator = Arc::new(translate::create_translator(&config.translate));
    let display = device::create_display(&config.device, translator, events)?;

    display.connect().await?;
    if let Some(name) = display.device_name() {
        println!("Connected: {}", name);
    }
    Ok(display)
}

/// Send one chunk set to the display, showing the first chunk
async fn run_write(config: &Config, text: &str) -> anyhow::Result<()> {
    let set = ChunkSet::new(text, config.display.segment_options());
    if set.is_empty() {
        println!("Nothing to send");
        return Ok(());
    }

    let display = connect_display(config, EventBus::new()).await?;
    display.write_text(&set.chunks()[0]).await?;

    println!(
        "Sent chunk 1 of {}: {:?}",
        set.len(),
        set.chunks()[0]
    );
    if set.len() > 1 {
        println!("Use `dotrelay play` to step through all chunks");
    }

    display.disconnect().await;
    Ok(())
}

/// Auto-advance through the chunks, printing each as it is shown
async fn run_play(config: &Config, text: &str) -> anyhow::Result<()> {
    let set = ChunkSet::new(text, config.display.segment_options());
    if set.is_empty() {
        println!("Nothing to play");
        return Ok(());
    }
    let chunks = set.chunks().to_vec();
    let total = chunks.len();

    let events = EventBus::new();
    let mut rx = events.subscribe();
    let display = connect_display(config, events.clone()).await?;

    let mut player = ChunkPlayer::new(
        Some(display.clone()),
        Duration::from_millis(config.playback.interval_ms),
        events,
    );
    player.load(set);
    player.play();

    // Follow the pipeline's own events until playback runs out
    while let Ok(event) = rx.recv().await {
        match event {
            RelayEvent::ChunkChanged { index, .. } => {
                println!("[{}/{}] {}", index + 1, total, chunks[index]);
            }
            RelayEvent::Playback { playing: false } => break,
            RelayEvent::WriteFailed { message } => {
                tracing::warn!("Transmission failed: {}", message);
            }
            RelayEvent::DeviceDisconnected => {
                println!("Display disconnected");
            }
            _ => {}
        }
    }

    player.pause();
    display.disconnect().await;
    Ok(())
}

/// Show current configuration, optionally creating the default file
fn run_config(config: &Config, init: bool) -> anyhow::Result<()> {
    if init {
        match Config::default_path() {
            Some(path) if !path.exists() => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, config::DEFAULT_CONFIG)?;
                println!("Created: {:?}\n", path);
            }
            Some(path) => println!("Config file exists: {:?}\n", path),
            None => anyhow::bail!("Could not determine config directory"),
        }
    }

    println!("Current Configuration\n");
    println!("{}", toml::to_string_pretty(config)?);
    println!("---");
    println!(
        "Config file: {:?}",
        Config::default_path().unwrap_or_else(|| "(not found)".into())
    );

    Ok(())
}
