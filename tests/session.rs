//! Voice session integration tests
//!
//! Drives the session state machine the way the daemon does, checking
//! the listening lifecycle end to end without a capture engine.

use trushna::voice::{CaptureEvent, Phase, SessionError, SessionEvent, VoiceSession};

fn transcript(text: &str, is_final: bool) -> CaptureEvent {
    CaptureEvent::Transcript {
        text: text.to_string(),
        is_final,
    }
}

#[test]
fn test_full_wake_then_command_flow() {
    let mut session = VoiceSession::new(Some("hey trushna"), 3_000, 5_000);

    assert_eq!(session.start(10_000), vec![SessionEvent::StartCapture]);
    assert_eq!(session.phase(), Phase::ListeningForWakeWord);

    // Chatter before the wake phrase surfaces as interim text only
    let events = session.handle_capture(transcript("so anyway", false), 10_500);
    assert_eq!(events, vec![SessionEvent::Interim("so anyway".to_string())]);

    // Wake phrase arms the command window
    let events = session.handle_capture(transcript("hey trushna", false), 11_000);
    assert_eq!(
        events,
        vec![
            SessionEvent::StopCapture,
            SessionEvent::WokeUp,
            SessionEvent::StartCapture,
        ]
    );
    assert_eq!(session.phase(), Phase::ListeningForCommand);
    assert_eq!(session.command_deadline_ms(), Some(16_000));

    // A finalized command closes the session
    let events = session.handle_capture(transcript("what time is it", true), 12_000);
    assert_eq!(
        events,
        vec![
            SessionEvent::StopCapture,
            SessionEvent::Command("what time is it".to_string()),
        ]
    );
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.next_deadline(), None);
}

#[test]
fn test_wake_and_command_single_utterance() {
    let mut session = VoiceSession::new(Some("hey trushna"), 3_000, 5_000);
    session.start(0);

    // The command keeps the user's casing even though wake detection is
    // case-insensitive
    let events = session.handle_capture(transcript("Hey Trushna, open Gmail", true), 100);
    assert_eq!(
        events,
        vec![
            SessionEvent::StopCapture,
            SessionEvent::WokeUp,
            SessionEvent::Command("open Gmail".to_string()),
        ]
    );
    assert_eq!(session.phase(), Phase::Idle);
}

#[test]
fn test_command_window_times_out_to_idle() {
    let mut session = VoiceSession::new(Some("hey trushna"), 3_000, 5_000);
    session.start(0);
    session.handle_capture(transcript("hey trushna", false), 1_000);

    let (deadline, generation) = session.next_deadline().expect("command deadline armed");
    assert_eq!(deadline, 6_000);

    // Ticks before the deadline do nothing
    assert!(session.tick(5_999, generation).is_empty());
    assert_eq!(session.phase(), Phase::ListeningForCommand);

    let events = session.tick(6_000, generation);
    assert_eq!(
        events,
        vec![
            SessionEvent::StopCapture,
            SessionEvent::Error(SessionError::CommandTimedOut),
        ]
    );
    assert_eq!(session.phase(), Phase::Idle);
}

#[test]
fn test_rapid_stop_start_orphans_no_timer() {
    let mut session = VoiceSession::new(Some("hey trushna"), 3_000, 5_000);
    session.start(0);
    session.handle_capture(transcript("hey trushna", false), 100);
    let stale = session.next_deadline().expect("deadline armed");

    // User cycles the session before the command window elapses
    session.stop();
    session.start(200);
    session.handle_capture(transcript("hey trushna", false), 300);

    // The orphaned timer fires with its stale generation and is ignored
    assert!(session.tick(stale.0, stale.1).is_empty());
    assert_eq!(session.phase(), Phase::ListeningForCommand);

    // The live deadline still works
    let (deadline, generation) = session.next_deadline().expect("fresh deadline armed");
    let events = session.tick(deadline, generation);
    assert_eq!(
        events,
        vec![
            SessionEvent::StopCapture,
            SessionEvent::Error(SessionError::CommandTimedOut),
        ]
    );
}

#[test]
fn test_capture_error_surfaces_and_idles() {
    let mut session = VoiceSession::new(Some("hey trushna"), 3_000, 5_000);
    session.start(0);

    let events = session.handle_capture(
        CaptureEvent::Error(trushna::voice::CaptureError::PermissionDenied),
        100,
    );
    assert_eq!(
        events,
        vec![
            SessionEvent::StopCapture,
            SessionEvent::Error(SessionError::PermissionDenied),
        ]
    );
    assert_eq!(session.phase(), Phase::Idle);

    // Late transcripts from the dead engine are discarded
    assert!(session
        .handle_capture(transcript("open gmail", true), 200)
        .is_empty());
}

#[test]
fn test_no_wake_word_treats_finals_as_commands() {
    let mut session = VoiceSession::new(None, 3_000, 5_000);
    session.start(0);
    assert_eq!(session.phase(), Phase::ListeningForCommand);

    let events = session.handle_capture(transcript("set reminder to stretch", true), 500);
    assert_eq!(
        events,
        vec![
            SessionEvent::StopCapture,
            SessionEvent::Command("set reminder to stretch".to_string()),
        ]
    );
}
