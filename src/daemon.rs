//! Daemon - the assistant service loop
//!
//! Orchestrates the voice session, intent dispatch, reminder polling, and
//! persistence. The session state machine owns listening semantics; the
//! daemon owns timers, the capture engine, and every side effect.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use tokio::sync::mpsc;

use crate::clock::{Clock, SystemClock};
use crate::context::Sender;
use crate::dispatch::{Dispatcher, startup_greeting};
use crate::generative::GenerativeResponder;
use crate::intent;
use crate::launcher::Launcher;
use crate::reminders::ReminderScheduler;
use crate::store::{Snapshot, Store};
use crate::voice::{
    CaptureEvent, SessionError, SessionEvent, SpeechCapture, SpeechSynthesizer, VoiceSession,
};
use crate::{Config, Result};

/// The assistant daemon
pub struct Daemon {
    config: Config,
    clock: SystemClock,
    session: VoiceSession,
    engine: Box<dyn SpeechCapture>,
    capture_rx: mpsc::Receiver<CaptureEvent>,
    speaker: Arc<dyn SpeechSynthesizer>,
    dispatcher: Dispatcher<SystemClock>,
    scheduler: ReminderScheduler<SystemClock>,
    store: Arc<dyn Store>,
    snapshot: Snapshot,
}

impl Daemon {
    /// Create a daemon over the given collaborators
    ///
    /// # Errors
    ///
    /// Returns error if the persisted snapshot cannot be loaded
    pub fn new(
        config: Config,
        engine: Box<dyn SpeechCapture>,
        capture_rx: mpsc::Receiver<CaptureEvent>,
        speaker: Arc<dyn SpeechSynthesizer>,
        launcher: Arc<dyn Launcher>,
        responder: Option<Arc<dyn GenerativeResponder>>,
        store: Arc<dyn Store>,
    ) -> Result<Self> {
        let snapshot = store.load()?;
        tracing::info!(
            reminders = snapshot.reminders.len(),
            turns = snapshot.conversation.turns().len(),
            "snapshot loaded"
        );

        let session = VoiceSession::new(
            config.wake_word.as_deref(),
            config.wake_timeout_ms,
            config.command_timeout_ms,
        );

        Ok(Self {
            config,
            clock: SystemClock,
            session,
            engine,
            capture_rx,
            speaker,
            dispatcher: Dispatcher::new(SystemClock, launcher, responder),
            scheduler: ReminderScheduler::new(SystemClock),
            store,
            snapshot,
        })
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the daemon encounters a fatal error
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(
            name = %self.config.name,
            wake_word = ?self.config.wake_word,
            "daemon running"
        );

        if !self.snapshot.greeting_spoken {
            let hour = chrono::Local::now().hour();
            let greeting = startup_greeting(&self.config.name.to_lowercase(), hour);
            self.speak(&greeting).await;
            self.snapshot.greeting_spoken = true;
            self.persist();
        }

        self.rearm()?;

        let mut poll = tokio::time::interval(Duration::from_secs(self.config.reminder_poll_secs));
        // The first tick fires immediately; skip it
        poll.tick().await;

        loop {
            let deadline = self.session.next_deadline();

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                _ = poll.tick() => {
                    self.poll_reminders().await;
                }
                event = self.capture_rx.recv() => {
                    let Some(event) = event else {
                        tracing::info!("capture stream closed");
                        break;
                    };
                    let now = self.clock.now_ms();
                    let events = self.session.handle_capture(event, now);
                    self.apply(events).await?;
                    self.rearm()?;
                }
                () = sleep_until(deadline, &self.clock), if deadline.is_some() => {
                    if let Some((_, generation)) = deadline {
                        let events = self.session.tick(self.clock.now_ms(), generation);
                        self.apply(events).await?;
                        self.rearm()?;
                    }
                }
            }
        }

        self.engine.stop();
        self.persist();
        Ok(())
    }

    /// Act on session directives in order
    async fn apply(&mut self, events: Vec<SessionEvent>) -> Result<()> {
        for event in events {
            match event {
                SessionEvent::StartCapture => self.engine.start()?,
                SessionEvent::StopCapture => self.engine.stop(),
                SessionEvent::WokeUp => tracing::info!("wake phrase detected"),
                SessionEvent::Interim(text) => tracing::debug!(text, "interim transcript"),
                SessionEvent::Command(text) => self.handle_command(&text).await,
                SessionEvent::Error(err) => {
                    tracing::warn!(error = %err, "listening session failed");
                    self.speak(error_reply(err)).await;
                }
            }
        }
        Ok(())
    }

    /// Keep listening whenever the session has gone idle
    fn rearm(&mut self) -> Result<()> {
        if self.session.is_listening() {
            return Ok(());
        }
        for event in self.session.start(self.clock.now_ms()) {
            match event {
                SessionEvent::StartCapture => self.engine.start()?,
                SessionEvent::StopCapture => self.engine.stop(),
                _ => {}
            }
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: &str) {
        let parsed = intent::parse(command);
        tracing::info!(kind = parsed.intent.kind(), command, "command received");

        let heard_at = self.clock.now_ms();
        // The history handed to dispatch is the window before this turn
        let reply = self
            .dispatcher
            .dispatch(&parsed, &mut self.snapshot.reminders, &self.snapshot.conversation)
            .await;

        self.snapshot
            .conversation
            .push(Sender::User, command, heard_at);
        self.snapshot
            .conversation
            .push(Sender::Assistant, reply.clone(), self.clock.now_ms());
        self.persist();

        self.speak(&reply).await;
    }

    async fn poll_reminders(&mut self) {
        let due = self.scheduler.poll(&mut self.snapshot.reminders);
        if due.is_empty() {
            return;
        }

        // Fired flags are persisted before delivery so a crash mid-speech
        // cannot replay a reminder on restart
        self.persist();

        for reminder in due {
            self.speak(&format!("Reminder: {}", reminder.task)).await;
        }
    }

    async fn speak(&self, text: &str) {
        if let Err(e) = self.speaker.speak(text).await {
            tracing::warn!(error = %e, "speech output failed");
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.snapshot) {
            tracing::warn!(error = %e, "failed to persist snapshot");
        }
    }
}

/// Sleep until the armed deadline, never completing when there is none
async fn sleep_until(deadline: Option<(i64, u64)>, clock: &SystemClock) {
    let Some((due_ms, _)) = deadline else {
        return std::future::pending().await;
    };
    let wait_ms = u64::try_from(due_ms - clock.now_ms()).unwrap_or(0);
    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
}

const fn error_reply(err: SessionError) -> &'static str {
    match err {
        SessionError::NoSpeechDetected => "No speech detected. Please try again.",
        SessionError::AudioCaptureFailed => "Microphone not found or not working.",
        SessionError::PermissionDenied => {
            "Microphone access denied. Please enable microphone permissions."
        }
        SessionError::CommandTimedOut => "I didn't hear a command. Please try again.",
    }
}
