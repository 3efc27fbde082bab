//! Trushna - a voice-and-text personal assistant core
//!
//! This library provides the core functionality of the assistant:
//! - Intent classification (ordered pattern rules over utterances)
//! - Voice session state machine (wake word, bounded command window)
//! - Intent dispatch (reminders, site launching, replies)
//! - Reminder scheduling (wall-clock polling, at-most-once delivery)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Speech Engines                      │
//! │    Capture (STT)  │  Synthesis (TTS)  │  Console    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Assistant Core                       │
//! │   Daemon  │  Voice Session  │  Intents  │ Reminders │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Collaborators                        │
//! │   Launcher  │  Generative Responder  │  Store       │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod clock;
pub mod config;
pub mod context;
pub mod daemon;
pub mod dispatch;
pub mod error;
pub mod generative;
pub mod intent;
pub mod launcher;
pub mod reminders;
pub mod store;
pub mod voice;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use context::{ConversationLog, Sender, Turn};
pub use daemon::Daemon;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use generative::{GenerativeResponder, HttpResponder};
pub use intent::{Intent, ParsedCommand};
pub use launcher::{Launcher, SystemLauncher};
pub use reminders::{Reminder, ReminderScheduler, ReminderSet};
pub use store::{JsonFileStore, Snapshot, Store};
pub use voice::{
    CaptureEvent, ConsoleSpeaker, Phase, SessionError, SessionEvent, SpeechCapture,
    SpeechSynthesizer, StdinCapture, VoiceSession,
};
