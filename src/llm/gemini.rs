use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::llm::{models::ImagePayload, LlmError, VisionProvider};

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, base_url: String, model: String, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {}", e);
            Client::new()
        });

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn answer(
        &self,
        instruction: &str,
        image: &ImagePayload,
        question: &str,
    ) -> Result<String, LlmError> {
        if image.is_empty() {
            return Err(LlmError::InvalidRequest("image payload is empty".to_string()));
        }

        let body = build_request(instruction, image, question);
        debug!(
            "Sending generateContent to {} ({} bytes of {})",
            self.model,
            image.len(),
            image.mime_type
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Api(format!("Failed to parse Gemini response: {}", e)))?;

        extract_text(parsed)
    }
}

fn build_request(instruction: &str, image: &ImagePayload, question: &str) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(3);
    if !instruction.trim().is_empty() {
        parts.push(Part::Text {
            text: instruction.to_string(),
        });
    }
    parts.push(Part::InlineData {
        inline_data: InlineData {
            mime_type: image.mime_type.clone(),
            data: BASE64_STANDARD.encode(&image.data),
        },
    });
    // Gemini rejects empty text parts, so a blank question is simply left out
    if !question.trim().is_empty() {
        parts.push(Part::Text {
            text: question.to_string(),
        });
    }

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
    }
}

fn map_http_error(status: StatusCode, body: &str) -> LlmError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return LlmError::RateLimited;
    }

    let message = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| {
            let msg = wrapper.error.message?;
            Some(match wrapper.error.status {
                Some(s) if !s.is_empty() => format!("{}: {}", s, msg),
                _ => msg,
            })
        })
        .unwrap_or_else(|| body.to_string());

    LlmError::Api(format!("Gemini Error {}: {}", status, message))
}

fn extract_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    let text: String = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}
