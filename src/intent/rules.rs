//! Ordered intent rule table
//!
//! Each rule pairs a pattern with a constructor. Rules are evaluated in
//! order and the first match wins, so priority is data, not branching:
//! several patterns overlap (a "search X on youtube" utterance also
//! matches the generic browser-search rule) and reordering this table
//! changes classification.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Intent;

/// Builds an intent from a pattern's capture groups
type Constructor = fn(&Captures<'_>) -> Intent;

/// A single classification rule
pub struct Rule {
    /// Intent tag, for logging and auditing the table
    pub kind: &'static str,
    pub pattern: Regex,
    pub build: Constructor,
}

fn rule(kind: &'static str, pattern: &str, build: Constructor) -> Rule {
    Rule {
        kind,
        pattern: Regex::new(pattern).expect("valid intent pattern"),
        build,
    }
}

fn capture(caps: &Captures<'_>, group: usize) -> Option<String> {
    caps.get(group).map(|m| m.as_str().trim().to_string())
}

/// The rule table, in priority order
///
/// Specific rules come before the generic ones they overlap with:
/// youtube search before browser search, explicit-scheme URLs before the
/// bare-domain heuristic, everything before greeting/farewell prefixes.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(
            "reminder",
            r"set(?: an?| the)? reminder(?: to)?\s+(.+?)(?:\s+(?:at|in|for)\s+(.+))?$",
            |caps| Intent::Reminder {
                task: capture(caps, 1).unwrap_or_default(),
                time_raw: capture(caps, 2).unwrap_or_else(|| "later".to_string()),
            },
        ),
        rule(
            "weather",
            r"what(?:'s| is) the weather(?: like)?(?: in (.+))?",
            |caps| Intent::Weather {
                location: capture(caps, 1).unwrap_or_else(|| "current location".to_string()),
            },
        ),
        rule(
            "send_message",
            r"send (?:a )?message(?: to (.+?))?(?: (?:saying|that says|content|body|text)\s+(.+))?$",
            |caps| Intent::SendMessage {
                to: capture(caps, 1),
                body: capture(caps, 2),
            },
        ),
        rule("open_youtube", r"^open youtube$", |_| Intent::OpenYoutube),
        rule(
            "play_song_on_youtube",
            r"^(?:play|stream)\s+(?:song\s+)?(.+?)(?:\s+on\s+youtube)?$",
            |caps| Intent::PlaySongOnYoutube {
                song: capture(caps, 1).unwrap_or_default(),
            },
        ),
        rule(
            "search_on_youtube",
            r"^search\s+(.+?)\s+on\s+youtube$",
            |caps| Intent::SearchOnYoutube {
                query: capture(caps, 1).unwrap_or_default(),
            },
        ),
        rule(
            "browser_search",
            r"^(?:search|find)(?:\s+(?:for|about))?\s+(.+?)(?:\s+on\s+(?:browser|google|web))?$",
            |caps| Intent::BrowserSearch {
                query: capture(caps, 1).unwrap_or_default(),
            },
        ),
        rule("open_gmail", r"^open gmail$", |_| Intent::OpenGmail),
        rule("open_google", r"^open google$", |_| Intent::OpenGoogle),
        rule("open_chatgpt", r"^open chatgpt$", |_| Intent::OpenChatGpt),
        rule("open_brave", r"^open brave$", |_| Intent::OpenBrave),
        rule(
            "open_url",
            r"open (?:url |website )?(https?://[^\s]+)",
            |caps| Intent::OpenUrl {
                url: capture(caps, 1).unwrap_or_default(),
            },
        ),
        // Bare-domain heuristic: at least one dot-separated label with a
        // 2+ letter suffix, optional second suffix and path. No scheme is
        // added here; that normalization belongs to dispatch.
        rule(
            "open_url",
            r"open ([a-zA-Z0-9-]+\.[a-zA-Z]{2,}(?:\.[a-zA-Z]{2,})?(?:/[^\s]*)?)",
            |caps| Intent::OpenUrl {
                url: capture(caps, 1).unwrap_or_default(),
            },
        ),
        rule(
            "greeting",
            r"^(?:hi|hello|hey|greetings|good morning|good afternoon|good evening)(?: trushna)?",
            |_| Intent::Greeting,
        ),
        rule(
            "farewell",
            r"^(?:bye|goodbye|see you|later|farewell)(?: trushna)?",
            |_| Intent::Farewell,
        ),
        rule(
            "get_time",
            r"(?:what(?:'s|s| is)?(?: the)?|tell me the|current|wats the)\s*time(?: now)?",
            |_| Intent::GetTime,
        ),
        rule(
            "get_date",
            r"(?:what(?:'s|s| is)? (?:the )?(?:current )?(?:date|day)|today(?:'s|s)?\s*date)",
            |_| Intent::GetDate,
        ),
    ]
});

/// The classification rules in evaluation order
#[must_use]
pub fn ordered() -> &'static [Rule] {
    &RULES
}
