//! OpenAI chat-completions adapter

use super::{into_network, normalize_base_url, read_json_checked};
use consilium_application::ports::provider_gateway::{ModelOption, ProviderError};
use consilium_domain::{ConsultPrompt, Doctor, Message, Role};
use serde_json::{Value, json};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Message-array request body: system first, history, then the user turn
pub(crate) fn build_request_body(
    model: &str,
    prompt: &ConsultPrompt,
    history: &[Message],
) -> Value {
    let mut messages = vec![json!({ "role": "system", "content": prompt.system })];
    for message in history {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => continue,
        };
        messages.push(json!({ "role": role, "content": message.content }));
    }
    messages.push(json!({ "role": "user", "content": prompt.user }));

    json!({ "model": model, "messages": messages, "temperature": 0.7 })
}

/// First textual payload, trimmed; missing content is an empty string
pub(crate) fn extract_text(body: &Value) -> String {
    body["choices"][0]["message"]["content"]
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
    let url = format!("{}/v1/chat/completions", root);

    let response = client
        .post(&url)
        .bearer_auth(&doctor.api_key)
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
        .bearer_auth(api_key)
        .send()
        .await
        .map_err(into_network)?;
    let body = read_json_checked(response).await?;

    let mut models: Vec<ModelOption> = body["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let id = item["id"].as_str()?.to_string();
                    let display_name = item["owned_by"].as_str().map(|s| s.to_string());
                    Some(ModelOption { id, display_name })
                })
                .collect()
        })
        .unwrap_or_default();
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
        let history = vec![Message::assistant("Dr. A: hi"), Message::user("Patient: hello")];
        let body = build_request_body("gpt-4o-mini", &prompt(), &history);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.7);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "be a doctor");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[3]["role"], "user");
        assert_eq!(messages[3]["content"], "diagnose");
    }

    #[test]
    fn test_system_history_entries_are_dropped() {
        let history = vec![Message::system("never send me")];
        let body = build_request_body("m", &prompt(), &history);
        let messages = body["messages"].as_array().unwrap();
        // Only the leading system prompt and the trailing user turn remain
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_extract_text() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  a diagnosis  " } }]
        });
        assert_eq!(extract_text(&body), "a diagnosis");
    }

    #[test]
    fn test_extract_missing_content_is_empty() {
        assert_eq!(extract_text(&json!({ "choices": [] })), "");
        assert_eq!(extract_text(&json!({})), "");
    }
}
