//! Voice session state machine
//!
//! Tracks the listening lifecycle: idle, waiting for the wake phrase,
//! then a bounded command window. The machine holds no timers and drives
//! no engine; callers feed it capture events and deadline ticks (with the
//! current wall-clock time) and act on the returned [`SessionEvent`]s.
//!
//! Deadlines carry a generation counter. Every transition that changes
//! the listening state bumps the generation, so a timer armed before a
//! stop/start cycle cannot fire into the new session.

use thiserror::Error;

use super::engine::{CaptureError, CaptureEvent};

/// Listening phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not listening
    Idle,
    /// Continuous capture, watching transcripts for the wake phrase
    ListeningForWakeWord,
    /// Wake phrase heard; waiting for a finalized command
    ListeningForCommand,
}

/// Errors surfaced to the session's caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Nothing was heard during a listening window
    #[error("no speech detected")]
    NoSpeechDetected,
    /// Device or stream failure
    #[error("audio capture failed")]
    AudioCaptureFailed,
    /// The host refused microphone access
    #[error("microphone access denied")]
    PermissionDenied,
    /// The command window elapsed without a final transcript
    #[error("command listening timed out")]
    CommandTimedOut,
}

impl From<CaptureError> for SessionError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::NoSpeech => Self::NoSpeechDetected,
            CaptureError::AudioCapture => Self::AudioCaptureFailed,
            CaptureError::PermissionDenied => Self::PermissionDenied,
        }
    }
}

/// Output of the state machine, in the order the caller should act
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The capture engine should (re)start
    StartCapture,
    /// The capture engine should stop
    StopCapture,
    /// Wake phrase heard; the command window is armed
    WokeUp,
    /// Live transcript fragment for UI mirroring. Never contains the
    /// wake phrase itself.
    Interim(String),
    /// A finalized command; the session has returned to idle
    Command(String),
    /// A session error; the session has returned to idle
    Error(SessionError),
}

/// Transient speech-capture state machine
#[derive(Debug)]
pub struct VoiceSession {
    /// Wake phrase, lowercased. `None` means capture goes straight to
    /// command listening.
    wake_word: Option<String>,
    phase: Phase,
    live_transcript: String,
    wake_deadline_ms: Option<i64>,
    command_deadline_ms: Option<i64>,
    generation: u64,
    wake_timeout_ms: i64,
    command_timeout_ms: i64,
}

impl VoiceSession {
    /// Create an idle session
    #[must_use]
    pub fn new(wake_word: Option<&str>, wake_timeout_ms: i64, command_timeout_ms: i64) -> Self {
        let wake_word = wake_word
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty());

        Self {
            wake_word,
            phase: Phase::Idle,
            live_transcript: String::new(),
            wake_deadline_ms: None,
            command_deadline_ms: None,
            generation: 0,
            wake_timeout_ms,
            command_timeout_ms,
        }
    }

    /// Current listening phase
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Deadline generation; bumped on every state change
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Most recent interim or final transcript fragment
    #[must_use]
    pub fn live_transcript(&self) -> &str {
        &self.live_transcript
    }

    /// The configured wake phrase, if any
    #[must_use]
    pub fn wake_word(&self) -> Option<&str> {
        self.wake_word.as_deref()
    }

    /// Whether a capture session is active
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Command deadline, present iff listening for a command
    #[must_use]
    pub const fn command_deadline_ms(&self) -> Option<i64> {
        self.command_deadline_ms
    }

    /// The earliest armed deadline with its generation, for the caller's
    /// timer. A fired timer must hand the generation back to [`tick`].
    ///
    /// [`tick`]: VoiceSession::tick
    #[must_use]
    pub const fn next_deadline(&self) -> Option<(i64, u64)> {
        match (self.wake_deadline_ms, self.command_deadline_ms) {
            (Some(ms), None) | (None, Some(ms)) => Some((ms, self.generation)),
            // Deadlines are mutually exclusive by phase
            _ => None,
        }
    }

    /// Start listening
    ///
    /// From idle this arms wake-word listening, or command listening
    /// directly when no wake word is configured. Starting while already
    /// active stops the existing session first so two engines never race.
    pub fn start(&mut self, now_ms: i64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.is_listening() {
            events.extend(self.stop());
        }

        self.generation += 1;
        self.live_transcript.clear();

        if self.wake_word.is_some() {
            self.phase = Phase::ListeningForWakeWord;
            self.wake_deadline_ms = Some(now_ms + self.wake_timeout_ms);
        } else {
            // No wake word: capture is direct command listening
            self.phase = Phase::ListeningForCommand;
            self.command_deadline_ms = Some(now_ms + self.command_timeout_ms);
        }

        events.push(SessionEvent::StartCapture);
        events
    }

    /// Stop listening
    ///
    /// Idempotent. Discards the partial transcript and disarms every
    /// pending deadline.
    pub fn stop(&mut self) -> Vec<SessionEvent> {
        if !self.is_listening() {
            return Vec::new();
        }
        self.reset_to_idle();
        vec![SessionEvent::StopCapture]
    }

    /// Feed a capture engine event into the machine
    pub fn handle_capture(&mut self, event: CaptureEvent, now_ms: i64) -> Vec<SessionEvent> {
        match event {
            CaptureEvent::Transcript { text, is_final } => {
                self.handle_transcript(&text, is_final, now_ms)
            }
            CaptureEvent::Error(err) => {
                if !self.is_listening() {
                    return Vec::new();
                }
                self.reset_to_idle();
                vec![
                    SessionEvent::StopCapture,
                    SessionEvent::Error(SessionError::from(err)),
                ]
            }
            CaptureEvent::Ended => {
                // Underlying capture ended without a final result: a
                // passive stop, not an error. The caller may re-arm.
                if self.is_listening() {
                    self.reset_to_idle();
                }
                Vec::new()
            }
        }
    }

    /// Deadline tick
    ///
    /// No-op unless `generation` matches the value handed out when the
    /// deadline was armed; a stale timer from before a stop/start cycle
    /// is ignored.
    pub fn tick(&mut self, now_ms: i64, generation: u64) -> Vec<SessionEvent> {
        if generation != self.generation {
            return Vec::new();
        }

        match self.phase {
            Phase::ListeningForCommand
                if self.command_deadline_ms.is_some_and(|d| now_ms >= d) =>
            {
                self.reset_to_idle();
                vec![
                    SessionEvent::StopCapture,
                    SessionEvent::Error(SessionError::CommandTimedOut),
                ]
            }
            Phase::ListeningForWakeWord if self.wake_deadline_ms.is_some_and(|d| now_ms >= d) => {
                // Continuous wake listening: cycle the engine and re-arm
                // so a stalled capture stream cannot wedge the session.
                self.generation += 1;
                self.wake_deadline_ms = Some(now_ms + self.wake_timeout_ms);
                vec![SessionEvent::StopCapture, SessionEvent::StartCapture]
            }
            _ => Vec::new(),
        }
    }

    fn handle_transcript(&mut self, text: &str, is_final: bool, now_ms: i64) -> Vec<SessionEvent> {
        match self.phase {
            // Stale event after a stop
            Phase::Idle => Vec::new(),
            Phase::ListeningForWakeWord => {
                let lower = text.to_lowercase();
                let Some(wake) = self.wake_word.as_deref() else {
                    // Unreachable by construction; treat as idle
                    return Vec::new();
                };

                if let Some(pos) = lower.find(wake) {
                    let command = strip_wake(text, &lower, pos, wake.len());

                    if is_final && !command.is_empty() {
                        // Wake phrase and command arrived in one final
                        // utterance; no need for a second window.
                        self.reset_to_idle();
                        return vec![
                            SessionEvent::StopCapture,
                            SessionEvent::WokeUp,
                            SessionEvent::Command(command),
                        ];
                    }

                    // The wake phrase is inspected but never surfaced as
                    // user-visible text.
                    self.generation += 1;
                    self.live_transcript.clear();
                    self.phase = Phase::ListeningForCommand;
                    self.wake_deadline_ms = None;
                    self.command_deadline_ms = Some(now_ms + self.command_timeout_ms);
                    vec![
                        SessionEvent::StopCapture,
                        SessionEvent::WokeUp,
                        SessionEvent::StartCapture,
                    ]
                } else {
                    self.live_transcript = text.to_string();
                    vec![SessionEvent::Interim(text.to_string())]
                }
            }
            Phase::ListeningForCommand => {
                if is_final {
                    let command = text.trim().to_string();
                    self.reset_to_idle();
                    vec![SessionEvent::StopCapture, SessionEvent::Command(command)]
                } else {
                    self.live_transcript = text.to_string();
                    vec![SessionEvent::Interim(text.to_string())]
                }
            }
        }
    }

    /// Transitioning out of a phase always clears its deadline
    fn reset_to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.live_transcript.clear();
        self.wake_deadline_ms = None;
        self.command_deadline_ms = None;
        self.generation += 1;
    }
}

/// Text after the wake phrase, with leading separators trimmed
///
/// The byte offsets come from searching the lowered transcript; they are
/// reused on the original to keep the user's casing, but only when they
/// provably line up (lowercasing can shift lengths outside ASCII).
fn strip_wake(original: &str, lowered: &str, wake_pos: usize, wake_len: usize) -> String {
    let start = wake_pos + wake_len;
    let tail = if original.len() == lowered.len() {
        original.get(start..).unwrap_or(&lowered[start..])
    } else {
        &lowered[start..]
    };
    tail.trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == '.')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> VoiceSession {
        VoiceSession::new(Some("hey trushna"), 3000, 5000)
    }

    fn transcript(text: &str, is_final: bool) -> CaptureEvent {
        CaptureEvent::Transcript {
            text: text.to_string(),
            is_final,
        }
    }

    #[test]
    fn test_start_arms_wake_listening() {
        let mut s = session();
        let events = s.start(1_000);
        assert_eq!(events, vec![SessionEvent::StartCapture]);
        assert_eq!(s.phase(), Phase::ListeningForWakeWord);
        assert_eq!(s.next_deadline(), Some((4_000, s.generation())));
        assert_eq!(s.command_deadline_ms(), None);
    }

    #[test]
    fn test_start_without_wake_word_goes_straight_to_command() {
        let mut s = VoiceSession::new(None, 3000, 5000);
        s.start(1_000);
        assert_eq!(s.phase(), Phase::ListeningForCommand);
        assert_eq!(s.command_deadline_ms(), Some(6_000));
    }

    #[test]
    fn test_wake_phrase_arms_command_window() {
        let mut s = session();
        s.start(1_000);
        let events = s.handle_capture(transcript("Hey Trushna", false), 2_000);
        assert_eq!(
            events,
            vec![
                SessionEvent::StopCapture,
                SessionEvent::WokeUp,
                SessionEvent::StartCapture,
            ]
        );
        assert_eq!(s.phase(), Phase::ListeningForCommand);
        assert_eq!(s.command_deadline_ms(), Some(7_000));
        // Wake phrase must not leak into the live transcript
        assert_eq!(s.live_transcript(), "");
    }

    #[test]
    fn test_wake_and_command_in_one_final_utterance() {
        let mut s = session();
        s.start(1_000);
        let events = s.handle_capture(transcript("hey trushna, what time is it", true), 2_000);
        assert_eq!(
            events,
            vec![
                SessionEvent::StopCapture,
                SessionEvent::WokeUp,
                SessionEvent::Command("what time is it".to_string()),
            ]
        );
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_single_utterance_command_keeps_original_casing() {
        let mut s = session();
        s.start(1_000);
        let events = s.handle_capture(transcript("Hey Trushna, email Bob at NASA", true), 2_000);
        assert_eq!(
            events,
            vec![
                SessionEvent::StopCapture,
                SessionEvent::WokeUp,
                SessionEvent::Command("email Bob at NASA".to_string()),
            ]
        );
    }

    #[test]
    fn test_strip_wake_tolerates_multibyte_prefix() {
        // "İ" grows when lowercased, shifting byte offsets; the command
        // falls back to the lowered text rather than slicing wrong
        let mut s = session();
        s.start(1_000);
        let events = s.handle_capture(transcript("İstanbul! hey trushna, open gmail", true), 2_000);
        assert_eq!(
            events,
            vec![
                SessionEvent::StopCapture,
                SessionEvent::WokeUp,
                SessionEvent::Command("open gmail".to_string()),
            ]
        );
    }

    #[test]
    fn test_final_transcript_emits_command_and_idles() {
        let mut s = session();
        s.start(1_000);
        s.handle_capture(transcript("hey trushna", false), 2_000);
        let events = s.handle_capture(transcript("open gmail", true), 3_000);
        assert_eq!(
            events,
            vec![
                SessionEvent::StopCapture,
                SessionEvent::Command("open gmail".to_string()),
            ]
        );
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.command_deadline_ms(), None);
    }

    #[test]
    fn test_interim_results_surface_except_wake_phrase() {
        let mut s = session();
        s.start(1_000);
        let events = s.handle_capture(transcript("something else", false), 2_000);
        assert_eq!(
            events,
            vec![SessionEvent::Interim("something else".to_string())]
        );
        assert_eq!(s.live_transcript(), "something else");
    }

    #[test]
    fn test_command_timeout() {
        let mut s = session();
        s.start(1_000);
        s.handle_capture(transcript("hey trushna", false), 2_000);
        let (deadline, generation) = s.next_deadline().unwrap();
        let events = s.tick(deadline, generation);
        assert_eq!(
            events,
            vec![
                SessionEvent::StopCapture,
                SessionEvent::Error(SessionError::CommandTimedOut),
            ]
        );
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_stale_generation_tick_is_ignored() {
        let mut s = session();
        s.start(1_000);
        s.handle_capture(transcript("hey trushna", false), 2_000);
        let (deadline, generation) = s.next_deadline().unwrap();

        // Rapid stop/start cycle before the timer fires
        s.stop();
        s.start(2_500);

        let events = s.tick(deadline, generation);
        assert!(events.is_empty());
        assert_eq!(s.phase(), Phase::ListeningForWakeWord);
    }

    #[test]
    fn test_restart_invalidates_prior_deadline() {
        let mut s = VoiceSession::new(None, 3000, 5000);
        s.start(1_000);
        let (first_deadline, first_gen) = s.next_deadline().unwrap();

        // Starting again performs an implicit stop first
        let events = s.start(2_000);
        assert_eq!(
            events,
            vec![SessionEvent::StopCapture, SessionEvent::StartCapture]
        );

        // The orphaned timer from the first session must not fire
        assert!(s.tick(first_deadline, first_gen).is_empty());
        assert_eq!(s.phase(), Phase::ListeningForCommand);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut s = session();
        assert!(s.stop().is_empty());

        s.start(1_000);
        assert_eq!(s.stop(), vec![SessionEvent::StopCapture]);
        assert!(s.stop().is_empty());
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_capture_errors_return_to_idle() {
        for (err, expected) in [
            (CaptureError::NoSpeech, SessionError::NoSpeechDetected),
            (CaptureError::AudioCapture, SessionError::AudioCaptureFailed),
            (CaptureError::PermissionDenied, SessionError::PermissionDenied),
        ] {
            let mut s = session();
            s.start(1_000);
            let events = s.handle_capture(CaptureEvent::Error(err), 2_000);
            assert_eq!(
                events,
                vec![SessionEvent::StopCapture, SessionEvent::Error(expected)]
            );
            assert_eq!(s.phase(), Phase::Idle);
        }
    }

    #[test]
    fn test_unexpected_end_is_a_passive_stop() {
        let mut s = session();
        s.start(1_000);
        let events = s.handle_capture(CaptureEvent::Ended, 2_000);
        assert!(events.is_empty());
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_wake_deadline_cycles_capture() {
        let mut s = session();
        s.start(1_000);
        let (deadline, generation) = s.next_deadline().unwrap();
        let events = s.tick(deadline, generation);
        assert_eq!(
            events,
            vec![SessionEvent::StopCapture, SessionEvent::StartCapture]
        );
        // Still waiting for the wake word, with a fresh deadline
        assert_eq!(s.phase(), Phase::ListeningForWakeWord);
        assert_eq!(s.next_deadline(), Some((deadline + 3000, s.generation())));
    }

    #[test]
    fn test_transcript_after_stop_is_ignored() {
        let mut s = session();
        s.start(1_000);
        s.stop();
        let events = s.handle_capture(transcript("open gmail", true), 2_000);
        assert!(events.is_empty());
    }
}
