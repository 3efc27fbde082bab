//! Generative-response collaborator
//!
//! Invoked only for commands no intent rule matched. The core supplies a
//! bounded window of prior turns as context and substitutes a fixed
//! apology when the collaborator fails; a dead endpoint never aborts the
//! session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reply substituted when the responder is unavailable or fails
pub const FALLBACK_REPLY: &str =
    "Sorry, I had a little trouble thinking about that. Can you try again?";

/// Generative-response collaborator interface
#[async_trait]
pub trait GenerativeResponder: Send + Sync {
    /// Produce a free-form reply to `command`, given recent conversation
    /// turns
    ///
    /// # Errors
    ///
    /// Returns error if the collaborator cannot produce a reply
    async fn respond(&self, command: &str, recent_history: &str) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    command: &'a str,
    chat_history: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Responder posting to a JSON HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpResponder {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpResponder {
    /// Create a responder for the given endpoint URL
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl GenerativeResponder for HttpResponder {
    async fn respond(&self, command: &str, recent_history: &str) -> Result<String> {
        let request = GenerateRequest {
            command,
            chat_history: recent_history,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: GenerateResponse = response.json().await?;

        if body.response.trim().is_empty() {
            return Err(Error::Generative("empty response".to_string()));
        }

        tracing::debug!(response_len = body.response.len(), "responder replied");
        Ok(body.response)
    }
}
