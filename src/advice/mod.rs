//! AI financial advice.
//!
//! The generator turns one record and its metrics into a short narrative.
//! It never fails from the caller's point of view: every problem becomes a
//! human-readable fallback message.

pub mod gemini;
pub mod panel;
pub mod prompt;

pub use gemini::{GeminiAdvisor, GeminiConfig};
pub use panel::AdvicePanel;

use crate::models::{GlobalMetrics, WealthRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Shown when no API key is configured.
pub const MISSING_KEY_MESSAGE: &str = "💡 No API key configured. To get AI financial advice, set \
the API_KEY environment variable (or the variable named by advice.api_key_env in .wealthtrack.toml).";

/// Shown when the request failed.
pub const UNAVAILABLE_MESSAGE: &str =
    "AI analysis is temporarily unavailable. Please check your API configuration and network connection.";

/// Shown when the model answered with no text.
pub const EMPTY_RESPONSE_MESSAGE: &str = "Unable to generate advice at this time.";

/// Something that can produce advice text for a quarter.
#[async_trait]
pub trait AdviceGenerator: Send + Sync {
    /// Advice for `record`. Always returns text, falling back to a fixed
    /// message on any failure.
    async fn get_advice(&self, record: &WealthRecord, metrics: &GlobalMetrics) -> String;
}

/// Why an advice request did not produce text.
#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("model returned no text")]
    EmptyResponse,
}

impl AdviceError {
    /// The user-facing text for this failure.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            AdviceError::MissingApiKey => MISSING_KEY_MESSAGE,
            AdviceError::EmptyResponse => EMPTY_RESPONSE_MESSAGE,
            _ => UNAVAILABLE_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_messages() {
        assert_eq!(
            AdviceError::MissingApiKey.fallback_message(),
            MISSING_KEY_MESSAGE
        );
        assert_eq!(
            AdviceError::EmptyResponse.fallback_message(),
            EMPTY_RESPONSE_MESSAGE
        );
        assert_eq!(
            AdviceError::Timeout(30).fallback_message(),
            UNAVAILABLE_MESSAGE
        );
        assert_eq!(
            AdviceError::Api {
                status: 500,
                body: "boom".to_string()
            }
            .fallback_message(),
            UNAVAILABLE_MESSAGE
        );
    }
}
