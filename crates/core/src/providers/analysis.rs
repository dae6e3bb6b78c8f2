use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::analysis::{StressAnalysis, STRESS_TAGS};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const SYSTEM_PROMPT: &str = "You are a warm, empathetic counselor who reads a person's writing \
and offers mental-health advice. Understand their feelings and suggest concrete, practical ways \
to relieve stress. Always answer in the requested JSON format.";

/// Abstraction over the stress/sentiment analysis backend.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SentimentAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    /// Analyze the concatenated post corpus.
    async fn analyze(&self, corpus: &str) -> Result<StressAnalysis, CoreError>;
}

/// Google Gemini `generateContent` client with a JSON response schema.
pub struct GeminiAnalyzer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAnalyzer {
    pub fn new(api_key: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(60));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

/// The `generateContent` payload: system prompt, user prompt with the
/// corpus, and a schema forcing `{ advice, stressAnalysis }`.
pub fn build_request(corpus: &str) -> Value {
    let user_prompt = format!(
        "Below is a collection of posts written by one user. Please do two things:\n\
         1. In 'advice', analyze the user's current state of mind and write warm, \
         comforting advice with concrete stress-relief steps or a suggestion to seek \
         counselling (markdown).\n\
         2. In 'stressAnalysis', classify the causes of stress into one or more of {} \
         and estimate each cause's share as a number. All shares must add up to 100.\n\n\
         Posts:\n---\n{corpus}\n---\n",
        STRESS_TAGS.join(", ")
    );

    let tag_properties: Map<String, Value> = STRESS_TAGS
        .iter()
        .map(|tag| (tag.to_string(), json!({ "type": "NUMBER" })))
        .collect();

    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
        "contents": [{ "parts": [{ "text": user_prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "advice": { "type": "STRING" },
                    "stressAnalysis": {
                        "type": "OBJECT",
                        "properties": tag_properties
                    }
                },
                "required": ["advice", "stressAnalysis"]
            }
        }
    })
}

// ── Gemini API response types ───────────────────────────────────────

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Pull the JSON text out of `candidates[0].content.parts[0].text` and
/// decode it.
pub fn parse_response(body: &str) -> Result<StressAnalysis, CoreError> {
    let resp: GenerateResponse = serde_json::from_str(body)?;
    let text = resp
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.as_str())
        .ok_or_else(|| CoreError::Api {
            provider: "Gemini".into(),
            message: "Response contained no candidates".into(),
        })?;

    serde_json::from_str(text).map_err(|e| CoreError::Api {
        provider: "Gemini".into(),
        message: format!("Candidate text is not a stress analysis: {e}"),
    })
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SentimentAnalyzer for GeminiAnalyzer {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn analyze(&self, corpus: &str) -> Result<StressAnalysis, CoreError> {
        if self.api_key.trim().is_empty() {
            return Err(CoreError::Validation(
                "An analysis API key is required (set analysis_api_key)".into(),
            ));
        }

        let body = self
            .client
            .post(self.endpoint())
            .json(&build_request(corpus))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_response(&body)
    }
}
