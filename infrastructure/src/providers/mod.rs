//! Provider gateway adapter
//!
//! HTTP implementations of the provider port for the supported provider
//! families, plus the simulated mode used for doctors without a
//! credential. Dispatch is a closed match over [`ProviderKind`]; there is
//! no string-keyed handler table to fall through.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use consilium_application::ports::provider_gateway::{
    ModelCatalog, ModelOption, ProviderError, ProviderGateway,
};
use consilium_domain::{ConsultPrompt, Doctor, Message, ProviderKind};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Latency of the canned reply in simulated mode (models "thinking")
const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(600);

/// Reqwest-backed gateway covering every supported provider family
pub struct HttpProviderGateway {
    client: reqwest::Client,
    simulated_delay: Duration,
}

impl HttpProviderGateway {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            simulated_delay: DEFAULT_SIMULATED_DELAY,
        }
    }

    /// Override the simulated-mode delay (tests use zero)
    pub fn with_simulated_delay(mut self, delay: Duration) -> Self {
        self.simulated_delay = delay;
        self
    }
}

impl Default for HttpProviderGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderGateway for HttpProviderGateway {
    async fn send(
        &self,
        doctor: &Doctor,
        prompt: &ConsultPrompt,
        history: &[Message],
    ) -> Result<String, ProviderError> {
        if !doctor.has_credential() {
            // Simulated mode never fails and never touches the network
            tokio::time::sleep(self.simulated_delay).await;
            return Ok(simulated_reply(&doctor.name));
        }

        debug!(provider = %doctor.provider, model = %doctor.model, "Dispatching provider call");
        match doctor.provider {
            ProviderKind::OpenAi => openai::send(&self.client, doctor, prompt, history).await,
            ProviderKind::Anthropic => anthropic::send(&self.client, doctor, prompt, history).await,
            ProviderKind::Gemini => gemini::send(&self.client, doctor, prompt, history).await,
        }
    }
}

#[async_trait]
impl ModelCatalog for HttpProviderGateway {
    async fn list_models(
        &self,
        provider: ProviderKind,
        api_key: &str,
        base_url: &str,
    ) -> Result<Vec<ModelOption>, ProviderError> {
        match provider {
            ProviderKind::OpenAi => openai::list_models(&self.client, api_key, base_url).await,
            ProviderKind::Anthropic => {
                anthropic::list_models(&self.client, api_key, base_url).await
            }
            ProviderKind::Gemini => gemini::list_models(&self.client, api_key, base_url).await,
        }
    }
}

/// Canned reply returned for doctors without a credential
pub fn simulated_reply(doctor_name: &str) -> String {
    format!(
        "[Simulated reply - {}]\nBased on the record and the discussion so far, I believe \
         further physical examination and diagnostic testing are needed before the diagnosis \
         can be confirmed.",
        doctor_name
    )
}

// ==================== Shared HTTP helpers ====================

/// Base URL with the trailing slash stripped; empty override means default
pub(crate) fn normalize_base_url(base_url: &str, fallback: &str) -> String {
    let url = base_url.trim();
    let url = if url.is_empty() { fallback } else { url };
    url.trim_end_matches('/').to_string()
}

pub(crate) fn into_network(error: reqwest::Error) -> ProviderError {
    ProviderError::Network(error.to_string())
}

/// Reject non-2xx responses, then parse the body as JSON
pub(crate) async fn read_json_checked(response: reqwest::Response) -> Result<Value, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("", "https://api.openai.com"),
            "https://api.openai.com"
        );
        assert_eq!(
            normalize_base_url("https://proxy.local/", "https://api.openai.com"),
            "https://proxy.local"
        );
        assert_eq!(
            normalize_base_url("  https://proxy.local  ", "x"),
            "https://proxy.local"
        );
    }

    #[test]
    fn test_simulated_reply_names_the_doctor() {
        let reply = simulated_reply("Dr. Gemini");
        assert!(reply.starts_with("[Simulated reply - Dr. Gemini]"));
    }

    #[tokio::test]
    async fn test_gateway_without_credential_is_simulated_and_never_fails() {
        let gateway = HttpProviderGateway::new().with_simulated_delay(Duration::ZERO);
        let doctor = Doctor::new("doc-1", "Dr. One", ProviderKind::OpenAi, "gpt-4o-mini");
        let prompt = ConsultPrompt {
            system: "sys".to_string(),
            user: "user".to_string(),
        };

        let reply = gateway.send(&doctor, &prompt, &[]).await.unwrap();
        assert!(reply.contains("Dr. One"));
    }
}
