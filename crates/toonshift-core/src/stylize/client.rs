//! Generation client for the stylization pipeline
//!
//! Talks to an OpenRouter-compatible chat completions endpoint with
//! `modalities: ["text", "image"]`. One invocation makes exactly one
//! outbound request; retry policy belongs to the user, not this client.

use std::time::{Duration, Instant};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::optimizer;
use super::prompt::{StylePrompt, StyleStrength};
use super::types::{detect_image_mime_type, GeneratedImage, ProcessedImage};

/// OpenRouter API base URL
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default image-output model
const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-image-preview";

/// Token ceiling for the completion side of the request
const MAX_TOKENS: usize = 4096;

/// Client for image stylization requests
#[derive(Clone)]
pub struct GenerationClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Builder for GenerationClient
pub struct GenerationClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for GenerationClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: None,
            timeout_secs: None,
        }
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL (defaults to OpenRouter)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the GenerationClient
    pub fn build(self) -> Result<GenerationClient> {
        let api_key = self.api_key.ok_or(Error::ApiKeyMissing)?;

        let timeout = Duration::from_secs(self.timeout_secs.unwrap_or(120));

        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::NetworkError)?;

        Ok(GenerationClient {
            http_client,
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| OPENROUTER_BASE_URL.to_string()),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

impl GenerationClient {
    /// Create a new GenerationClient with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        GenerationClientBuilder::new().api_key(api_key).build()
    }

    /// Create a new builder
    pub fn builder() -> GenerationClientBuilder {
        GenerationClientBuilder::new()
    }

    /// The model this client sends requests to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Stylize an uploaded photo.
    ///
    /// Optimizes the payload, builds the prompt for the selected strength
    /// and issues one generation request. The first inline image part of
    /// the response becomes the result; a response without one fails with
    /// [`Error::NoImageProduced`]. Transport and server failures propagate
    /// unmodified.
    pub async fn stylize(
        &self,
        image: &ProcessedImage,
        strength: StyleStrength,
    ) -> Result<GeneratedImage> {
        let start = Instant::now();

        let optimized = optimizer::optimize(image).await;
        let prompt = StylePrompt::build(strength);

        debug!(
            model = %self.model,
            strength = %strength,
            temperature = prompt.temperature,
            "sending stylization request"
        );

        let response = self.send_stylize_request(&optimized, &prompt).await?;
        let generated = extract_generated_image(response)?;

        info!(
            model = %self.model,
            time_ms = start.elapsed().as_millis() as u64,
            "image stylized"
        );

        Ok(generated)
    }

    async fn send_stylize_request(
        &self,
        image: &ProcessedImage,
        prompt: &StylePrompt,
    ) -> Result<ChatCompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "image_url",
                        "image_url": { "url": image.to_data_url() }
                    },
                    {
                        "type": "text",
                        "text": prompt.text
                    }
                ]
            }],
            "modalities": ["text", "image"],
            "temperature": prompt.temperature,
            "max_tokens": MAX_TOKENS
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => Error::ApiKeyMissing,
                code => Error::GenerationError(format!("HTTP {}: {}", code, body)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::GenerationError(format!("Failed to parse response: {}", e)))
    }
}

/// Pull the first inline image out of a completion response.
///
/// Content parts are scanned in order; a text-only or empty response is a
/// no-image failure.
fn extract_generated_image(response: ChatCompletionResponse) -> Result<GeneratedImage> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(Error::NoImageProduced)?;

    match choice.message.content {
        Some(ChatMessageContent::Parts(parts)) => {
            for part in parts {
                if part.part_type == "image_url" || part.part_type == "image" {
                    if let Some(image_url) = part.image_url {
                        return generated_from_payload(&image_url.url);
                    }
                    if let Some(data) = part.data {
                        return generated_from_payload(&data);
                    }
                }
            }
            Err(Error::NoImageProduced)
        }
        Some(ChatMessageContent::Simple(text)) => {
            // Some models return a bare data URL instead of content parts
            if text.starts_with("data:image") {
                generated_from_payload(&text)
            } else {
                Err(Error::NoImageProduced)
            }
        }
        None => Err(Error::NoImageProduced),
    }
}

/// Decode an inline image payload (data URL or raw base64) into a reference
fn generated_from_payload(data: &str) -> Result<GeneratedImage> {
    let encoded = if data.starts_with("data:") {
        data.split_once(',')
            .map(|(_, rest)| rest)
            .ok_or_else(|| Error::GenerationError("Malformed data URL in response".to_string()))?
    } else {
        data
    };

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| Error::GenerationError(format!("Invalid base64 in response: {}", e)))?;

    debug!(
        mime = detect_image_mime_type(&bytes),
        size_bytes = bytes.len(),
        "decoded inline image from response"
    );

    Ok(GeneratedImage::from_bytes(&bytes))
}

/// Chat completion response structure
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<ChatMessageContent>,
}

/// Message content - either a plain string or structured content parts
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatMessageContent {
    Simple(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    part_type: String,
    image_url: Option<ImageUrl>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageUrl {
    url: String,
}
