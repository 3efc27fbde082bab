//! Intent dispatch
//!
//! Maps parsed commands to collaborator side effects and builds the
//! reply the assistant speaks. Dispatch failures never abort the
//! session: a refused launch or a dead responder degrades to an
//! apologetic reply plus a log entry.

use std::sync::Arc;
use std::sync::LazyLock;

use rand::seq::SliceRandom;
use regex::Regex;
use url::Url;

use crate::clock::Clock;
use crate::context::ConversationLog;
use crate::generative::{FALLBACK_REPLY, GenerativeResponder};
use crate::intent::{Intent, ParsedCommand};
use crate::launcher::Launcher;
use crate::reminders::{Reminder, ReminderSet};

/// Canned greeting replies, picked at random
const GREETINGS: [&str; 3] = [
    "Hello there!",
    "Hi! How can I help you today?",
    "Hey! What's up?",
];

/// Canned farewell replies, picked at random
const FAREWELLS: [&str; 3] = ["Goodbye!", "See you later!", "Catch you on the flip side!"];

/// Default reminder offset when the time phrase cannot be parsed
const DEFAULT_REMINDER_OFFSET_MS: i64 = 5 * 60 * 1000;

/// Duration clause inside a reminder time phrase: "N minute(s)" / "N hour(s)"
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(minute|hour)s?").expect("valid duration pattern"));

/// Routes parsed commands to their action handlers
pub struct Dispatcher<C: Clock> {
    clock: C,
    launcher: Arc<dyn Launcher>,
    responder: Option<Arc<dyn GenerativeResponder>>,
}

impl<C: Clock> Dispatcher<C> {
    /// Create a dispatcher over the given collaborators
    ///
    /// A `None` responder means unknown commands get the fixed fallback
    /// reply without a network round trip.
    pub fn new(
        clock: C,
        launcher: Arc<dyn Launcher>,
        responder: Option<Arc<dyn GenerativeResponder>>,
    ) -> Self {
        Self {
            clock,
            launcher,
            responder,
        }
    }

    /// Execute a parsed command and build the reply to speak
    ///
    /// `history` holds the turns prior to this command; the reminder
    /// intent appends to `reminders` and is the only writer besides the
    /// scheduler.
    pub async fn dispatch(
        &self,
        parsed: &ParsedCommand,
        reminders: &mut ReminderSet,
        history: &ConversationLog,
    ) -> String {
        match &parsed.intent {
            Intent::Reminder { task, time_raw } => {
                self.schedule_reminder(task, time_raw, &parsed.original, reminders)
            }
            Intent::Weather { .. } => {
                "I can't check the actual weather right now, but I hope it's nice where you are!"
                    .to_string()
            }
            Intent::SendMessage { to, body } => self.send_message(to.as_deref(), body.as_deref()),
            Intent::OpenUrl { url } => self.open_url(url),
            Intent::OpenYoutube => self.open_site("https://youtube.com", "YouTube"),
            Intent::PlaySongOnYoutube { song } => {
                let url = youtube_search_url(&format!("{song} song"));
                self.open_search(&url, &format!("Searching for \"{song}\" on YouTube..."))
            }
            Intent::SearchOnYoutube { query } => {
                let url = youtube_search_url(query);
                self.open_search(&url, &format!("Searching for \"{query}\" on YouTube..."))
            }
            Intent::BrowserSearch { query } => {
                let url = google_search_url(query);
                self.open_search(&url, &format!("Searching for \"{query}\"..."))
            }
            Intent::OpenGmail => self.open_site("https://mail.google.com", "Gmail"),
            Intent::OpenGoogle => self.open_site("https://google.com", "Google"),
            Intent::OpenChatGpt => self.open_site("https://chat.openai.com", "ChatGPT"),
            Intent::OpenBrave => self.open_site("https://search.brave.com", "Brave Search"),
            Intent::Greeting => pick(&GREETINGS),
            Intent::Farewell => pick(&FAREWELLS),
            Intent::GetTime => self.tell_time(),
            Intent::GetDate => self.tell_date(),
            Intent::Unknown => self.respond_unknown(&parsed.original, history).await,
        }
    }

    fn schedule_reminder(
        &self,
        task: &str,
        time_raw: &str,
        source: &str,
        reminders: &mut ReminderSet,
    ) -> String {
        let now = self.clock.now_ms();
        let (due_at_ms, phrase) = resolve_due_time(now, time_raw);

        let reminder = Reminder::new(task, due_at_ms, source);
        tracing::info!(id = %reminder.id, task, due_at_ms, "reminder set");
        reminders.insert(reminder);

        format!("Okay, I've set a reminder for: {task} {phrase}.")
    }

    fn send_message(&self, to: Option<&str>, body: Option<&str>) -> String {
        match (to, body) {
            (Some(to), Some(body)) => match self.launcher.compose_mail(Some(to), body) {
                Ok(()) => format!("I've opened your email client to send a message to {to}."),
                Err(e) => blocked_reply(&format!("compose a message to {to}"), &e),
            },
            (None, Some(body)) => match self.launcher.compose_mail(None, body) {
                Ok(()) => {
                    "I've opened your email client with the message. Please specify recipient."
                        .to_string()
                }
                Err(e) => blocked_reply("compose your message", &e),
            },
            (Some(to), None) => format!("What should the message to {to} say?"),
            (None, None) => {
                "I can help draft a message. Who is it for and what should it say?".to_string()
            }
        }
    }

    fn open_url(&self, url: &str) -> String {
        // The parser leaves bare domains alone; normalization is ours
        let target = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{url}")
        };

        if Url::parse(&target).is_err() {
            return "Sorry, I couldn't open that URL. Is it valid?".to_string();
        }

        match self.launcher.open(&target) {
            Ok(()) => format!("Opening {target}..."),
            Err(e) => blocked_reply(&format!("open {target}"), &e),
        }
    }

    fn open_site(&self, url: &str, name: &str) -> String {
        match self.launcher.open(url) {
            Ok(()) => format!("Opening {name}..."),
            Err(e) => blocked_reply(&format!("open {name}"), &e),
        }
    }

    fn open_search(&self, url: &str, reply: &str) -> String {
        match self.launcher.open(url) {
            Ok(()) => reply.to_string(),
            Err(e) => blocked_reply("run that search", &e),
        }
    }

    fn tell_time(&self) -> String {
        format_now(self.clock.now_ms(), |local| {
            format!("The current time is {}.", local.format("%H:%M"))
        })
    }

    fn tell_date(&self) -> String {
        format_now(self.clock.now_ms(), |local| {
            format!("Today is {}.", local.format("%A, %B %-d, %Y"))
        })
    }

    async fn respond_unknown(&self, original: &str, history: &ConversationLog) -> String {
        let Some(responder) = &self.responder else {
            return FALLBACK_REPLY.to_string();
        };

        let recent = history.recent_history();
        match responder.respond(original, &recent).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "generative response failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

/// Absolute due time and confirmation phrase for a reminder time phrase
///
/// "N minute(s)" / "N hour(s)" clauses become exact offsets; anything
/// else falls back to five minutes out. The phrase mirrors what was
/// understood: the parsed duration, the literal phrase, or "soon".
fn resolve_due_time(now_ms: i64, time_raw: &str) -> (i64, String) {
    if let Some(caps) = DURATION_RE.captures(time_raw) {
        if let Ok(amount) = caps[1].parse::<i64>() {
            let (scale_ms, unit) = match &caps[2] {
                "minute" => (60_000, "minute"),
                _ => (3_600_000, "hour"),
            };
            // An absurd amount overflows the epoch-millis clock; treat
            // it like any other unparseable phrase instead of wrapping
            // into the past
            let due = amount
                .checked_mul(scale_ms)
                .and_then(|offset| now_ms.checked_add(offset));
            if let Some(due) = due {
                let plural = if amount > 1 { "s" } else { "" };
                return (due, format!("in {amount} {unit}{plural}"));
            }
        }
    }

    let due = now_ms.saturating_add(DEFAULT_REMINDER_OFFSET_MS);
    if time_raw == "later" || time_raw == "soon" {
        (due, "soon".to_string())
    } else {
        // Unparseable phrase: keep the user's words in the confirmation
        // but fall back to the default offset (product behavior)
        (due, format!("for {time_raw}"))
    }
}

fn youtube_search_url(query: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(query)
    )
}

fn google_search_url(query: &str) -> String {
    format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(query)
    )
}

fn pick(replies: &[&str]) -> String {
    replies
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_REPLY)
        .to_string()
}

fn blocked_reply(action: &str, err: &crate::Error) -> String {
    tracing::warn!(error = %err, action, "launch blocked");
    format!("I tried to {action}, but it seems your system blocked it. Please check your settings.")
}

fn format_now(now_ms: i64, f: impl Fn(chrono::DateTime<chrono::Local>) -> String) -> String {
    chrono::DateTime::from_timestamp_millis(now_ms).map_or_else(
        || "Sorry, I couldn't read the clock just now.".to_string(),
        |utc| f(utc.with_timezone(&chrono::Local)),
    )
}

/// Time-of-day startup greeting
#[must_use]
pub fn startup_greeting(name: &str, hour: u32) -> String {
    let time_greeting = if hour < 12 {
        "Good morning"
    } else if hour < 18 {
        "Good afternoon"
    } else {
        "Good evening"
    };
    format!("{time_greeting}, hi {name} here.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_due_time_minutes_exact() {
        let (due, phrase) = resolve_due_time(1_000_000, "10 minutes");
        assert_eq!(due, 1_000_000 + 10 * 60_000);
        assert_eq!(phrase, "in 10 minutes");

        let (due, phrase) = resolve_due_time(0, "1 minute");
        assert_eq!(due, 60_000);
        assert_eq!(phrase, "in 1 minute");
    }

    #[test]
    fn test_resolve_due_time_hours_exact() {
        let (due, phrase) = resolve_due_time(500, "2 hours");
        assert_eq!(due, 500 + 2 * 3_600_000);
        assert_eq!(phrase, "in 2 hours");
    }

    #[test]
    fn test_resolve_due_time_defaults() {
        let (due, phrase) = resolve_due_time(0, "later");
        assert_eq!(due, DEFAULT_REMINDER_OFFSET_MS);
        assert_eq!(phrase, "soon");

        let (due, phrase) = resolve_due_time(0, "tomorrow evening");
        assert_eq!(due, DEFAULT_REMINDER_OFFSET_MS);
        assert_eq!(phrase, "for tomorrow evening");
    }

    #[test]
    fn test_resolve_due_time_overflowing_duration_falls_back() {
        // The product of amount and unit scale must not wrap; an amount
        // beyond the clock's range gets the default offset instead
        let (due, phrase) = resolve_due_time(0, "9999999999999 hours");
        assert_eq!(due, DEFAULT_REMINDER_OFFSET_MS);
        assert_eq!(phrase, "for 9999999999999 hours");

        // An amount that does not even fit in the integer type behaves
        // the same way
        let (due, _) = resolve_due_time(0, "99999999999999999999 minutes");
        assert_eq!(due, DEFAULT_REMINDER_OFFSET_MS);

        // A due time near the clock's ceiling also refuses to wrap; the
        // default-offset fallback saturates instead
        let (due, phrase) = resolve_due_time(i64::MAX - 1, "2 minutes");
        assert_eq!(due, i64::MAX);
        assert_eq!(phrase, "for 2 minutes");
    }

    #[test]
    fn test_search_urls_percent_encode() {
        assert_eq!(
            youtube_search_url("take five song"),
            "https://www.youtube.com/results?search_query=take%20five%20song"
        );
        assert_eq!(
            google_search_url("rust & wasm"),
            "https://www.google.com/search?q=rust%20%26%20wasm"
        );
    }

    #[test]
    fn test_startup_greeting_by_hour() {
        assert_eq!(startup_greeting("trushna", 8), "Good morning, hi trushna here.");
        assert_eq!(startup_greeting("trushna", 13), "Good afternoon, hi trushna here.");
        assert_eq!(startup_greeting("trushna", 21), "Good evening, hi trushna here.");
    }
}
