//! Gemini generateContent adapter
//!
//! Content-parts request shape with role remapping: the assistant role is
//! called `model` on this provider, and the system prompt rides in
//! `systemInstruction`.

use super::{into_network, normalize_base_url, read_json_checked};
use consilium_application::ports::provider_gateway::{ModelOption, ProviderError};
use consilium_domain::{ConsultPrompt, Doctor, Message, Role};
use serde_json::{Value, json};

pub(crate) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub(crate) fn build_request_body(prompt: &ConsultPrompt, history: &[Message]) -> Value {
    let mut contents = Vec::new();
    for message in history {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "model",
            Role::System => continue,
        };
        contents.push(json!({ "role": role, "parts": [{ "text": message.content }] }));
    }
    contents.push(json!({ "role": "user", "parts": [{ "text": prompt.user }] }));

    json!({
        "systemInstruction": { "role": "system", "parts": [{ "text": prompt.system }] },
        "contents": contents,
    })
}

/// First candidate's first part, falling back to joining every part
pub(crate) fn extract_text(body: &Value) -> String {
    let first = body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if !first.is_empty() {
        return first;
    }

    body["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

pub(crate) async fn send(
    client: &reqwest::Client,
    doctor: &Doctor,
    prompt: &ConsultPrompt,
    history: &[Message],
) -> Result<String, ProviderError> {
    let root = normalize_base_url(&doctor.base_url, DEFAULT_BASE_URL);
    let url = format!("{}/v1beta/models/{}:generateContent", root, doctor.model);

    let response = client
        .post(&url)
        .query(&[("key", doctor.api_key.as_str())])
        .json(&build_request_body(prompt, history))
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
    let is_google_host = root.ends_with("generativelanguage.googleapis.com");

    // Both v1 and v1beta exist in the wild; probe v1 first
    let mut last_error = ProviderError::MalformedResponse("no model listing endpoint".to_string());
    for path in [format!("{}/v1/models", root), format!("{}/v1beta/models", root)] {
        let request = if is_google_host {
            client.get(&path).query(&[("key", api_key)])
        } else {
            client.get(&path).header("x-goog-api-key", api_key)
        };

        match request.send().await.map_err(into_network) {
            Ok(response) => match read_json_checked(response).await {
                Ok(body) => {
                    let mut models: Vec<ModelOption> = body["models"]
                        .as_array()
                        .map(|items| {
                            items
                                .iter()
                                .filter_map(|item| {
                                    let name = item["name"].as_str()?;
                                    let id =
                                        name.strip_prefix("models/").unwrap_or(name).to_string();
                                    let display_name =
                                        item["displayName"].as_str().map(|s| s.to_string());
                                    Some(ModelOption { id, display_name })
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    models.sort_by(|a, b| a.id.cmp(&b.id));
                    return Ok(models);
                }
                Err(error) => last_error = error,
            },
            Err(error) => last_error = error,
        }
    }
    Err(last_error)
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
    fn test_assistant_role_is_remapped_to_model() {
        let history = vec![Message::assistant("Dr. A: hi"), Message::user("Patient: hello")];
        let body = build_request_body(&prompt(), &history);

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be a doctor");
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "model");
        assert_eq!(contents[1]["role"], "user");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "diagnose");
    }

    #[test]
    fn test_extract_first_part() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": " finding " }] } }]
        });
        assert_eq!(extract_text(&body), "finding");
    }

    #[test]
    fn test_extract_joins_parts_when_first_is_empty() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "" },
                { "text": "second" },
                { "text": "third" }
            ] } }]
        });
        assert_eq!(extract_text(&body), "second\nthird");
    }

    #[test]
    fn test_extract_no_candidates_is_empty() {
        assert_eq!(extract_text(&json!({})), "");
    }
}
