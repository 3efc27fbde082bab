//! Conversation log
//!
//! Keeps the full transcript of the session and formats the bounded
//! trailing window handed to the generative responder on parser
//! fallback.

use serde::{Deserialize, Serialize};

/// Maximum turns supplied as fallback context (about three exchanges)
pub const MAX_HISTORY_TURNS: usize = 6;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    const fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// A single conversational turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
    /// Epoch milliseconds
    pub at_ms: i64,
}

/// The session transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn
    pub fn push(&mut self, sender: Sender, text: impl Into<String>, at_ms: i64) {
        self.turns.push(Turn {
            sender,
            text: text.into(),
            at_ms,
        });
    }

    /// All turns, oldest first
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The last [`MAX_HISTORY_TURNS`] turns formatted for the responder,
    /// one `Sender: text` line per turn, oldest first
    #[must_use]
    pub fn recent_history(&self) -> String {
        let start = self.turns.len().saturating_sub(MAX_HISTORY_TURNS);
        self.turns[start..]
            .iter()
            .map(|t| format!("{}: {}", t.sender.label(), t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_history_formatting() {
        let mut log = ConversationLog::new();
        log.push(Sender::User, "hello", 1);
        log.push(Sender::Assistant, "Hi! How can I help you today?", 2);

        assert_eq!(
            log.recent_history(),
            "User: hello\nAssistant: Hi! How can I help you today?"
        );
    }

    #[test]
    fn test_recent_history_is_bounded() {
        let mut log = ConversationLog::new();
        for i in 0..10 {
            log.push(Sender::User, format!("turn {i}"), i);
        }

        let history = log.recent_history();
        assert_eq!(history.lines().count(), MAX_HISTORY_TURNS);
        // The window is trailing: oldest retained turn is number 4
        assert!(history.starts_with("User: turn 4"));
        assert!(history.ends_with("User: turn 9"));
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(ConversationLog::new().recent_history(), "");
    }
}
