//! Anthropic messages adapter
//!
//! System prompt travels as a top-level field, not a message, and the
//! request carries a token cap.

use super::{into_network, normalize_base_url, read_json_checked};
use consilium_application::ports::provider_gateway::{ModelOption, ProviderError};
use consilium_domain::{ConsultPrompt, Doctor, Message, Role};
use serde_json::{Value, json};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub(crate) fn build_request_body(
    model: &str,
    prompt: &ConsultPrompt,
    history: &[Message],
) -> Value {
    let mut messages = Vec::new();
    for message in history {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => continue,
        };
        messages.push(json!({ "role": role, "content": message.content }));
    }
    messages.push(json!({ "role": "user", "content": prompt.user }));

    json!({
        "model": model,
        "max_tokens": MAX_TOKENS,
        "system": prompt.system,
        "messages": messages,
    })
}

pub(crate) fn extract_text(body: &Value) -> String {
    body["content"][0]["text"]
        .as_str()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

pub(crate) async fn send(
    client: &reqwest::Client,
    doctor: &Doctor,
    prompt: &ConsultPrompt,
    history: &[Message],
) -> Result<String, ProviderError> {
    let root = normalize_base_url(&doctor.base_url, DEFAULT_BASE_URL);
    let url = format!("{}/v1/messages", root);

    let response = client
        .post(&url)
        .header("x-api-key", &doctor.api_key)
        .header("anthropic-version", API_VERSION)
        .json(&build_request_body(&doctor.model, prompt, history))
        .send()
        .await
        .map_err(into_network)?;

    let body = read_json_checked(response).await?;
    Ok(extract_text(&body))
}

pub(crate) async fn list_models(
    client: &reqwest::Client,
    api_key: &str,
    base_url: &str,
) -> Result<Vec<ModelOption>, ProviderError> {
    let root = normalize_base_url(base_url, DEFAULT_BASE_URL);
    let url = format!("{}/v1/models", root);

    let response = client
        .get(&url)
        .header("x-api-key", api_key)
        .header("anthropic-version", API_VERSION)
        .send()
        .await
        .map_err(into_network)?;
    let body = read_json_checked(response).await?;

    let items = body["data"]
        .as_array()
        .or_else(|| body["models"].as_array())
        .cloned()
        .unwrap_or_default();
    let mut models: Vec<ModelOption> = items
        .iter()
        .filter_map(|item| {
            let id = item["id"]
                .as_str()
                .or_else(|| item["slug"].as_str())
                .or_else(|| item["name"].as_str())?
                .to_string();
            let display_name = item["display_name"].as_str().map(|s| s.to_string());
            Some(ModelOption { id, display_name })
        })
        .collect();
    models.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> ConsultPrompt {
        ConsultPrompt {
            system: "be a doctor".to_string(),
            user: "diagnose".to_string(),
        }
    }

    #[test]
    fn test_body_shape() {
        let history = vec![Message::assistant("Dr. A: hi")];
        let body = build_request_body("claude-3-haiku-20240307", &prompt(), &history);

        assert_eq!(body["model"], "claude-3-haiku-20240307");
        assert_eq!(body["max_tokens"], 1024);
        // System prompt is a top-level field, never a message
        assert_eq!(body["system"], "be a doctor");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m["role"] != "system"));
        assert_eq!(messages[1]["content"], "diagnose");
    }

    #[test]
    fn test_extract_text() {
        let body = json!({ "content": [{ "type": "text", "text": " result " }] });
        assert_eq!(extract_text(&body), "result");
        assert_eq!(extract_text(&json!({ "content": [] })), "");
    }
}
