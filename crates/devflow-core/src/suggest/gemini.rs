//! Gemini-backed task suggester
//!
//! Sends a schema-constrained `generateContent` request and reads the JSON
//! document out of the first candidate's text part.

use super::{parse_proposals, ProposedTask, TaskSuggester};
use crate::config::SuggestConfig;
use crate::error::SuggestError;
use async_trait::async_trait;
use devflow_model::Task;
use serde::Deserialize;
use serde_json::{json, Value};

const MAX_ERROR_BODY: usize = 512;

/// Suggester calling the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiSuggester {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiSuggester {
    /// Create from configuration; the key is read from the configured environment variable
    #[must_use]
    pub fn from_config(config: &SuggestConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key(),
            api_key_env: config.api_key_env.clone(),
        }
    }

    /// With explicit API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Request URL (without the key)
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Request body for a phase
    #[must_use]
    pub fn request_body(phase_title: &str) -> Value {
        let prompt = format!(
            "Generate a list of typical software development tasks for the project phase: \
             \"{phase_title}\". For each task, provide a title, a brief description, and an \
             estimated duration in days."
        );
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "tasks": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "title": { "type": "STRING", "description": "The title of the task." },
                                    "description": { "type": "STRING", "description": "A brief description of the task." },
                                    "durationDays": { "type": "NUMBER", "description": "The estimated duration of the task in days." }
                                },
                                "required": ["title", "description", "durationDays"]
                            }
                        }
                    },
                    "required": ["tasks"]
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull the generated JSON text out of a `generateContent` response
pub(crate) fn extract_text(response: &str) -> Result<String, SuggestError> {
    let parsed: GenerateResponse = serde_json::from_str(response)
        .map_err(|e| SuggestError::MalformedResponse(e.to_string()))?;
    parsed
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .ok_or_else(|| SuggestError::MalformedResponse("no candidate text".to_string()))
}

#[async_trait]
impl TaskSuggester for GeminiSuggester {
    async fn suggest(
        &self,
        phase_title: &str,
        _last_task: Option<&Task>,
    ) -> Result<Vec<ProposedTask>, SuggestError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SuggestError::MissingApiKey(self.api_key_env.clone()))?;

        tracing::debug!(model = %self.model, phase = phase_title, "requesting task suggestions");
        let response = self
            .client
            .post(self.url())
            .query(&[("key", key)])
            .json(&Self::request_body(phase_title))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SuggestError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        parse_proposals(&extract_text(&body)?)
    }
}
