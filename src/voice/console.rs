//! Console speech engines
//!
//! A keyboard is the reference capture engine: each line from stdin is a
//! finalized transcript, and replies are printed rather than synthesized.
//! Useful for development and for hosts without a recognizer.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::engine::{CaptureEvent, SpeechCapture, SpeechSynthesizer};
use crate::Result;

/// Capture engine backed by stdin lines
///
/// Lines typed while the engine is stopped are discarded, mirroring a
/// recognizer that only emits while a session is active. Emits
/// [`CaptureEvent::Ended`] once on EOF.
pub struct StdinCapture {
    active: Arc<AtomicBool>,
}

impl StdinCapture {
    /// Create the engine and the channel its events arrive on
    #[must_use]
    pub fn with_receiver() -> (Self, mpsc::Receiver<CaptureEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let active = Arc::new(AtomicBool::new(false));

        let reader_active = Arc::clone(&active);
        tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let text = line.trim().to_string();
                if text.is_empty() || !reader_active.load(Ordering::Acquire) {
                    continue;
                }
                let event = CaptureEvent::Transcript {
                    text,
                    is_final: true,
                };
                if tx.blocking_send(event).is_err() {
                    return;
                }
            }
            let _ = tx.blocking_send(CaptureEvent::Ended);
        });

        (Self { active }, rx)
    }
}

impl SpeechCapture for StdinCapture {
    fn start(&mut self) -> Result<()> {
        self.active.store(true, Ordering::Release);
        tracing::debug!("stdin capture started");
        Ok(())
    }

    fn stop(&mut self) {
        self.active.store(false, Ordering::Release);
        tracing::debug!("stdin capture stopped");
    }
}

/// Speech output that prints to the console
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSpeaker;

#[async_trait]
impl SpeechSynthesizer for ConsoleSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }
}
