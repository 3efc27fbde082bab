//! Error types for the Trushna assistant core

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the assistant core
///
/// Nothing here is fatal to the process: capture errors return the voice
/// session to idle, and dispatch errors degrade to a spoken fallback.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Host provides no speech-capture capability at all
    #[error("speech capture unsupported: {0}")]
    CaptureUnsupported(String),

    /// Capture engine heard nothing during a listening window
    #[error("no speech detected")]
    NoSpeech,

    /// Audio capture failed (device error, stream dropped)
    #[error("audio capture failed: {0}")]
    AudioCapture(String),

    /// Microphone permission denied by the host
    #[error("microphone access denied")]
    PermissionDenied,

    /// Command listening window elapsed without a final transcript
    #[error("command listening timed out")]
    CommandTimeout,

    /// External launcher refused or was blocked
    #[error("launch blocked: {0}")]
    DispatchBlocked(String),

    /// Generative-response collaborator failed
    #[error("generative response failed: {0}")]
    Generative(String),

    /// Persistence store error
    #[error("store error: {0}")]
    Store(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
