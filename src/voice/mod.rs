//! Voice session handling
//!
//! The capture engine is a capability interface ([`SpeechCapture`]); the
//! session itself is an explicit finite-state machine ([`VoiceSession`])
//! that consumes transcript events and deadline ticks and emits typed
//! session events. It owns no timers and talks to no hardware, which is
//! what makes the listening lifecycle testable.

mod console;
mod engine;
mod session;

pub use console::{ConsoleSpeaker, StdinCapture};
pub use engine::{CaptureError, CaptureEvent, SpeechCapture, SpeechSynthesizer};
pub use session::{Phase, SessionError, SessionEvent, VoiceSession};
