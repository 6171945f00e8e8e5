//! Provider gateway port
//!
//! Defines the interface the engine uses to talk to AI backends. The
//! adapters (HTTP clients per provider family, simulated mode) live in the
//! infrastructure layer.

use async_trait::async_trait;
use consilium_domain::{ConsultPrompt, Doctor, Message, ProviderKind};
use thiserror::Error;

/// Errors that can occur while talking to a provider
///
/// The engine catches these per participant; they never abort a round.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unsupported provider: {0}")]
    Unsupported(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Gateway for provider communication
///
/// One call per doctor turn: the constructed prompt pair plus the
/// provider-shaped conversation history, returning plain text.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    async fn send(
        &self,
        doctor: &Doctor,
        prompt: &ConsultPrompt,
        history: &[Message],
    ) -> Result<String, ProviderError>;
}

/// A selectable model, as returned by provider listing endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    pub id: String,
    pub display_name: Option<String>,
}

impl ModelOption {
    /// Label shown in setup tooling, e.g. `"gpt-4o-mini (openai)"`
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) => format!("{} ({})", self.id, name),
            None => self.id.clone(),
        }
    }
}

/// Model enumeration port, used by setup tooling (not by the engine)
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(
        &self,
        provider: ProviderKind,
        api_key: &str,
        base_url: &str,
    ) -> Result<Vec<ModelOption>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_option_label() {
        let bare = ModelOption {
            id: "gpt-4o-mini".to_string(),
            display_name: None,
        };
        assert_eq!(bare.label(), "gpt-4o-mini");

        let named = ModelOption {
            id: "gemini-1.5-flash".to_string(),
            display_name: Some("Gemini 1.5 Flash".to_string()),
        };
        assert_eq!(named.label(), "gemini-1.5-flash (Gemini 1.5 Flash)");
    }

    #[test]
    fn test_status_error_display() {
        let error = ProviderError::Status {
            status: 401,
            body: "invalid key".to_string(),
        };
        assert_eq!(error.to_string(), "Provider returned status 401: invalid key");
    }
}
