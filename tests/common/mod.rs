//! Shared test utilities

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use trushna::{Clock, Error, GenerativeResponder, Launcher, Result};

/// Clock advanced by hand
#[derive(Debug, Default)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    #[must_use]
    pub fn at(ms: i64) -> Self {
        Self(AtomicI64::new(ms))
    }

    pub fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Launcher that records every URL instead of opening it
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    pub opened: Mutex<Vec<String>>,
    /// When true, every launch is refused
    pub blocked: bool,
}

impl RecordingLauncher {
    #[must_use]
    pub fn blocked() -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            blocked: true,
        }
    }

    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("lock poisoned").clone()
    }
}

impl Launcher for RecordingLauncher {
    fn open(&self, url: &str) -> Result<()> {
        if self.blocked {
            return Err(Error::DispatchBlocked(url.to_string()));
        }
        self.opened
            .lock()
            .expect("lock poisoned")
            .push(url.to_string());
        Ok(())
    }

    fn compose_mail(&self, to: Option<&str>, body: &str) -> Result<()> {
        self.open(&trushna::launcher::compose_mailto(to, body))
    }
}

/// Responder that always replies with the same text
pub struct StaticResponder(pub &'static str);

#[async_trait]
impl GenerativeResponder for StaticResponder {
    async fn respond(&self, _command: &str, _recent_history: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Responder that always fails
pub struct FailingResponder;

#[async_trait]
impl GenerativeResponder for FailingResponder {
    async fn respond(&self, _command: &str, _recent_history: &str) -> Result<String> {
        Err(Error::Generative("unreachable endpoint".to_string()))
    }
}
