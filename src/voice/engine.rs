//! Speech engine capability interfaces
//!
//! The core never talks to a recognizer or synthesizer directly; hosts
//! inject implementations of these traits. Capture engines are assumed
//! continuous and interim-result-capable.

use async_trait::async_trait;

use crate::Result;

/// Error taxonomy reported by a capture engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// Nothing was heard during a listening window
    NoSpeech,
    /// Device or stream failure
    AudioCapture,
    /// The host refused microphone access
    PermissionDenied,
}

/// Event emitted by a speech capture engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// An interim or final transcript fragment
    Transcript {
        text: String,
        /// True when the engine marked this result complete
        is_final: bool,
    },
    /// Engine-reported error
    Error(CaptureError),
    /// Capture ended without a final result
    Ended,
}

/// A continuous speech capture engine
///
/// Implementations deliver [`CaptureEvent`]s through the channel handed
/// out at construction. At most one session is captured at a time;
/// `start` after `stop` must begin a fresh one.
pub trait SpeechCapture: Send {
    /// Begin capturing
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CaptureUnsupported`] if the host has no
    /// capture capability, or [`crate::Error::AudioCapture`] if the
    /// engine fails to start.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing. Idempotent.
    fn stop(&mut self);
}

/// A speech output engine
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak the text, resolving when playback completes
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    async fn speak(&self, text: &str) -> Result<()>;
}
