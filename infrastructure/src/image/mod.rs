//! Image recognition
//!
//! A vision-model client plus a bounded-concurrency queue. Recognition
//! results feed the case record's image finding, which the prompt builder
//! then surfaces to every doctor.

use crate::config::FileImageRecognitionConfig;
use crate::providers::{into_network, normalize_base_url, read_json_checked};
use async_trait::async_trait;
use consilium_application::ports::provider_gateway::ProviderError;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.siliconflow.cn";

/// Errors raised before or during a recognition call
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Image recognition API key is not configured")]
    MissingApiKey,

    #[error("Image recognition model is not configured")]
    MissingModel,

    #[error("No image provided")]
    MissingImage,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// A vision backend that turns a base64 image into a text finding
#[async_trait]
pub trait ImageRecognizer: Send + Sync {
    async fn recognize(&self, image_base64: &str) -> Result<String, RecognitionError>;
}

/// SiliconFlow-style vision chat-completions client
pub struct SiliconFlowRecognizer {
    client: reqwest::Client,
    config: FileImageRecognitionConfig,
}

impl SiliconFlowRecognizer {
    pub fn new(config: FileImageRecognitionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageRecognizer for SiliconFlowRecognizer {
    async fn recognize(&self, image_base64: &str) -> Result<String, RecognitionError> {
        if self.config.provider != "siliconflow" {
            return Err(ProviderError::Unsupported(self.config.provider.clone()).into());
        }
        if self.config.api_key.trim().is_empty() {
            return Err(RecognitionError::MissingApiKey);
        }
        if self.config.model.trim().is_empty() {
            return Err(RecognitionError::MissingModel);
        }
        if image_base64.trim().is_empty() {
            return Err(RecognitionError::MissingImage);
        }

        let root = normalize_base_url(&self.config.base_url, DEFAULT_BASE_URL);
        let url = format!("{}/v1/chat/completions", root);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&build_request_body(&self.config, image_base64))
            .send()
            .await
            .map_err(into_network)
            .map_err(RecognitionError::Provider)?;

        let body = read_json_checked(response)
            .await
            .map_err(RecognitionError::Provider)?;
        Ok(extract_text(&body))
    }
}

pub(crate) fn build_request_body(
    config: &FileImageRecognitionConfig,
    image_base64: &str,
) -> Value {
    json!({
        "model": config.model,
        "messages": [
            {
                "role": "system",
                "content": [{ "type": "text", "text": config.prompt }]
            },
            {
                "role": "user",
                "content": [
                    {
                        "type": "text",
                        "text": "Analyze the following image per the instructions above and \
                                 return a detailed medical description."
                    },
                    {
                        "type": "image_url",
                        "image_url": format!("data:image/jpeg;base64,{}", image_base64)
                    }
                ]
            }
        ],
        "temperature": 0.1
    })
}

/// Tolerant text extraction across the response shapes seen in the wild:
/// a plain `text` field, a string `message.content`, a part array, or the
/// top-level `output_text`.
pub(crate) fn extract_text(body: &Value) -> String {
    let choice = &body["choices"][0];

    if let Some(text) = choice["text"].as_str() {
        let text = text.trim();
        if !text.is_empty() {
            return text.to_string();
        }
    }
    if let Some(text) = choice["message"]["content"].as_str() {
        return text.trim().to_string();
    }
    if let Some(parts) = choice["message"]["content"].as_array() {
        return parts
            .iter()
            .filter_map(|part| {
                part.as_str()
                    .or_else(|| part["text"].as_str())
                    .or_else(|| part["content"].as_str())
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
    }
    body["output_text"]
        .as_str()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// One image waiting for recognition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedImage {
    pub id: String,
    pub name: String,
    pub image_base64: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Success,
    Error,
}

/// Outcome of one queued recognition job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedImage {
    pub id: String,
    pub name: String,
    pub status: JobStatus,
    pub result: String,
    pub error: String,
}

/// Bounded-concurrency recognition queue
///
/// At most `max_concurrent` jobs run at once; the rest wait for a permit.
/// A failed job never fails the batch.
pub struct RecognitionQueue<R: ImageRecognizer + 'static> {
    recognizer: Arc<R>,
    semaphore: Arc<Semaphore>,
}

impl<R: ImageRecognizer + 'static> RecognitionQueue<R> {
    pub fn new(recognizer: Arc<R>, max_concurrent: usize) -> Self {
        Self {
            recognizer,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Run every job, returning outcomes in submission order
    pub async fn process(&self, images: Vec<QueuedImage>) -> Vec<RecognizedImage> {
        let total = images.len();
        let mut join_set = JoinSet::new();

        for (slot, image) in images.into_iter().enumerate() {
            let recognizer = Arc::clone(&self.recognizer);
            let semaphore = Arc::clone(&self.semaphore);
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = recognizer.recognize(&image.image_base64).await;
                (slot, image, outcome)
            });
        }

        let mut results: Vec<Option<RecognizedImage>> = (0..total).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((slot, image, Ok(result))) => {
                    results[slot] = Some(RecognizedImage {
                        id: image.id,
                        name: image.name,
                        status: JobStatus::Success,
                        result,
                        error: String::new(),
                    });
                }
                Ok((slot, image, Err(error))) => {
                    warn!(image = %image.name, %error, "Image recognition failed");
                    results[slot] = Some(RecognizedImage {
                        id: image.id,
                        name: image.name,
                        status: JobStatus::Error,
                        result: String::new(),
                        error: error.to_string(),
                    });
                }
                Err(error) => {
                    warn!(%error, "Recognition task join error");
                }
            }
        }
        results.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_request_body_shape() {
        let config = FileImageRecognitionConfig::default();
        let body = build_request_body(&config, "QUJD");

        assert_eq!(body["model"], config.model);
        assert_eq!(body["temperature"], 0.1);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"][0]["text"], config.prompt);
        assert_eq!(
            messages[1]["content"][1]["image_url"],
            "data:image/jpeg;base64,QUJD"
        );
    }

    #[test]
    fn test_extract_text_shapes() {
        assert_eq!(
            extract_text(&json!({ "choices": [{ "text": " plain " }] })),
            "plain"
        );
        assert_eq!(
            extract_text(&json!({ "choices": [{ "message": { "content": " string " } }] })),
            "string"
        );
        assert_eq!(
            extract_text(&json!({ "choices": [{ "message": { "content": [
                { "type": "text", "text": "part one" },
                { "type": "text", "text": "part two" }
            ] } }] })),
            "part one\npart two"
        );
        assert_eq!(
            extract_text(&json!({ "output_text": "fallback" })),
            "fallback"
        );
        assert_eq!(extract_text(&json!({})), "");
    }

    #[tokio::test]
    async fn test_recognizer_rejects_missing_configuration() {
        let recognizer = SiliconFlowRecognizer::new(FileImageRecognitionConfig::default());
        let err = recognizer.recognize("QUJD").await.unwrap_err();
        assert!(matches!(err, RecognitionError::MissingApiKey));

        let mut config = FileImageRecognitionConfig::default();
        config.api_key = "key".to_string();
        config.model = String::new();
        let recognizer = SiliconFlowRecognizer::new(config);
        let err = recognizer.recognize("QUJD").await.unwrap_err();
        assert!(matches!(err, RecognitionError::MissingModel));
    }

    #[tokio::test]
    async fn test_recognizer_rejects_unknown_provider() {
        let mut config = FileImageRecognitionConfig::default();
        config.provider = "acme-vision".to_string();
        config.api_key = "key".to_string();
        let recognizer = SiliconFlowRecognizer::new(config);
        let err = recognizer.recognize("QUJD").await.unwrap_err();
        assert!(err.to_string().contains("Unsupported provider: acme-vision"));
    }

    struct CountingRecognizer {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ImageRecognizer for CountingRecognizer {
        async fn recognize(&self, image_base64: &str) -> Result<String, RecognitionError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            if image_base64 == "bad" {
                Err(RecognitionError::MissingImage)
            } else {
                Ok(format!("finding for {}", image_base64))
            }
        }
    }

    fn image(id: &str, payload: &str) -> QueuedImage {
        QueuedImage {
            id: id.to_string(),
            name: format!("{}.jpg", id),
            image_base64: payload.to_string(),
        }
    }

    #[tokio::test]
    async fn test_queue_bounds_concurrency_and_keeps_order() {
        let recognizer = Arc::new(CountingRecognizer {
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let queue = RecognitionQueue::new(recognizer.clone(), 2);

        let images: Vec<QueuedImage> =
            (1..=6).map(|i| image(&format!("img-{}", i), &format!("p{}", i))).collect();
        let results = queue.process(images).await;

        assert!(recognizer.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(results.len(), 6);
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["img-1", "img-2", "img-3", "img-4", "img-5", "img-6"]);
        assert!(results.iter().all(|r| r.status == JobStatus::Success));
        assert_eq!(results[0].result, "finding for p1");
    }

    #[tokio::test]
    async fn test_one_failed_job_does_not_fail_the_batch() {
        let recognizer = Arc::new(CountingRecognizer {
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let queue = RecognitionQueue::new(recognizer, 1);

        let results = queue
            .process(vec![image("img-1", "ok"), image("img-2", "bad"), image("img-3", "ok")])
            .await;

        assert_eq!(results[0].status, JobStatus::Success);
        assert_eq!(results[1].status, JobStatus::Error);
        assert!(results[1].error.contains("No image provided"));
        assert_eq!(results[2].status, JobStatus::Success);
    }
}
