//! Error types for dotrelay
//!
//! Uses thiserror for ergonomic error definitions. Hardware and translation
//! failures are recovered at the device boundary and surfaced through
//! `last_error()` state rather than bubbling up as fatal errors.

use thiserror::Error;

/// Top-level error type for the dotrelay application
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Translation error: {0}")]
    Translate(#[from] TranslateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the braille display hardware
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Display is not connected. Call connect() first.")]
    NotConnected,

    #[error("No Bluetooth adapter available. Is the Bluetooth service running?")]
    NoAdapter,

    #[error("No braille display found (looked for name prefix '{0}')")]
    NotFound(String),

    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("Braille service {0} not found on device")]
    ServiceNotFound(uuid::Uuid),

    #[error("Writable characteristic {0} not found on device")]
    CharacteristicNotFound(uuid::Uuid),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Connection to the display was lost")]
    ConnectionLost,

    #[error("Translation failed: {0}")]
    Translate(#[from] TranslateError),
}

/// Errors related to text-to-cell translation
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Translation service unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed translation response: {0}")]
    Malformed(String),

    #[error("Translation service error: {0}")]
    Service(String),

    #[error("No translator produced cell data")]
    NoCellData,
}

/// Result type alias using RelayError
pub type Result<T> = std::result::Result<T, RelayError>;
