//! Intent classification
//!
//! Maps free-form utterances to typed commands by evaluating an ordered
//! table of pattern rules. Classification is pure, total, and
//! case-insensitive: input that matches no rule falls through to
//! [`Intent::Unknown`] rather than failing.

mod rules;

pub use rules::ordered as rule_table;

/// A classified intent with its extracted parameters
///
/// Exactly one variant is assigned per input, and the payload shape is
/// fully determined by the variant. `Unknown` carries no payload; the
/// raw text lives on [`ParsedCommand::original`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Schedule a reminder. `time_raw` is the verbatim trailing time
    /// phrase, or the literal `"later"` when none was given.
    Reminder { task: String, time_raw: String },
    /// Weather request for an optional location
    Weather { location: String },
    /// Compose a message; recipient and body are independently optional
    SendMessage {
        to: Option<String>,
        body: Option<String>,
    },
    /// Open a URL. May be scheme-less; dispatch normalizes it.
    OpenUrl { url: String },
    /// Open the YouTube home page
    OpenYoutube,
    /// Play a song via YouTube search
    PlaySongOnYoutube { song: String },
    /// Search YouTube for a query
    SearchOnYoutube { query: String },
    /// Generic web search
    BrowserSearch { query: String },
    /// Open Gmail
    OpenGmail,
    /// Open Google
    OpenGoogle,
    /// Open ChatGPT
    OpenChatGpt,
    /// Open Brave Search
    OpenBrave,
    /// Greeting phrase
    Greeting,
    /// Farewell phrase
    Farewell,
    /// Ask for the current time
    GetTime,
    /// Ask for the current date
    GetDate,
    /// No rule matched; routed to the generative responder
    Unknown,
}

impl Intent {
    /// Stable tag for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Reminder { .. } => "reminder",
            Self::Weather { .. } => "weather",
            Self::SendMessage { .. } => "send_message",
            Self::OpenUrl { .. } => "open_url",
            Self::OpenYoutube => "open_youtube",
            Self::PlaySongOnYoutube { .. } => "play_song_on_youtube",
            Self::SearchOnYoutube { .. } => "search_on_youtube",
            Self::BrowserSearch { .. } => "browser_search",
            Self::OpenGmail => "open_gmail",
            Self::OpenGoogle => "open_google",
            Self::OpenChatGpt => "open_chatgpt",
            Self::OpenBrave => "open_brave",
            Self::Greeting => "greeting",
            Self::Farewell => "farewell",
            Self::GetTime => "get_time",
            Self::GetDate => "get_date",
            Self::Unknown => "unknown",
        }
    }
}

/// A parsed utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The classified intent with extracted parameters
    pub intent: Intent,
    /// The verbatim input, retained for diagnostics and the generative
    /// fallback
    pub original: String,
}

/// Classify an utterance
///
/// Lowercases and trims the input, then evaluates the rule table in
/// priority order. Never fails: empty or unmatched input yields
/// [`Intent::Unknown`].
#[must_use]
pub fn parse(utterance: &str) -> ParsedCommand {
    let normalized = utterance.trim().to_lowercase();

    for rule in rule_table() {
        if let Some(caps) = rule.pattern.captures(&normalized) {
            let intent = (rule.build)(&caps);
            tracing::debug!(intent = intent.kind(), "utterance classified");
            return ParsedCommand {
                intent,
                original: utterance.to_string(),
            };
        }
    }

    ParsedCommand {
        intent: Intent::Unknown,
        original: utterance.to_string(),
    }
}
