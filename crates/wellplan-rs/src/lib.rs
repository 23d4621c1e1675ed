//! Wellness plan generation on top of the Google Gemini API.
//!
//! `wellplan-rs` turns a user's profile and self-reported symptoms into a
//! one-day schedule of time-stamped reminders. The core is a small pipeline:
//!
//! ```text
//! build_prompt ──▶ PlanProvider::generate ──▶ parse_reminders ──▶ PlanResult
//!                   │
//!                   ├─ list available models
//!                   ├─ choose_backend(available, priority)
//!                   └─ generate content, or fall back to the canned plan
//! ```
//!
//! The provider never fails: when no backend is available, or any service
//! call errors or times out, it returns [`CANNED_PLAN`](plan::CANNED_PLAN)
//! and reports a [`PlanWarning`](plan::PlanWarning) through the
//! [`EventHandler`](plan::EventHandler) side channel.
//!
//! # Getting started
//!
//! ```ignore
//! use std::sync::Arc;
//! use wellplan_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let config = AppConfig::load(None).map_err(|e| e.to_string())?;
//!     let client = GeminiClient::with_base_url(&config.api_key, &config.api_base)
//!         .map_err(|e| e.to_string())?;
//!
//!     let warnings = WarningCollector::new();
//!     let provider = PlanProvider::new(Arc::new(client), config.provider_config());
//!     let result = PlanPipeline::new(&provider)
//!         .with_event_handler(&warnings)
//!         .run(&["Fever".to_string()], &Profile::default())
//!         .await;
//!
//!     for reminder in &result.reminders {
//!         println!("{} {}", reminder.time_label(), reminder.activity);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`plan`] | Prompt builder, provider with fallback chain, reminder parser, pipeline, events |
//! | [`api`] | [`GenerationService`](api::GenerationService) seam, backend priority, service errors |
//! | [`wizard`] | Explicit session state, pure transitions, pure view rendering |
//! | [`config`] | API key and runtime settings from env, `.env`, or a secrets file |

pub mod api;
pub mod config;
pub mod plan;
pub mod prelude;
pub mod wizard;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::api::ServiceError;
use crate::api::router::normalize_model_name;

// ── Constants ──────────────────────────────────────────────────────

/// Production endpoint of the Generative Language API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// API version segment used for every request path.
pub const GEMINI_API_VERSION: &str = "v1beta";

/// Preferred model for plan generation.
pub const PRIMARY_MODEL: &str = "gemini-pro";

/// Alternates tried, in order, when the primary is not listed.
pub const ALTERNATE_MODELS: [&str; 2] = ["gemini-1.0-pro", "gemini-1.5-pro"];

/// Page size requested when listing models.
const LIST_MODELS_PAGE_SIZE: &str = "1000";

// ── Request types ──────────────────────────────────────────────────

/// Body of a `models/{model}:generateContent` call.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerateContentRequest {
    /// Single-turn user prompt with the given parameters.
    pub fn user_prompt(
        prompt: impl Into<String>,
        generation_config: GenerationConfig,
        safety_settings: Vec<SafetySetting>,
    ) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            generation_config: Some(generation_config),
            safety_settings,
        }
    }
}

/// A turn of conversation: a role and its parts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".into()),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }

    /// Concatenated text of all parts, `None` if no part carries text.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self.parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

/// One part of a [`Content`]. Only text parts are used.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Sampling parameters sent with every generation call.
///
/// The defaults are the fixed wellness-plan parameters: temperature `0.9`,
/// top-p `1`, top-k `1`, at most `2048` output tokens.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_p: 1.0,
            top_k: 1,
            max_output_tokens: 2048,
        }
    }
}

/// Harm categories the safety filter can be configured for.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Severity at and above which content is blocked.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Block medium-and-above for harassment, hate speech, sexually explicit and
/// dangerous content.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    })
    .collect()
}

// ── Response types ─────────────────────────────────────────────────

/// Raw `generateContent` response (internal deserialization target).
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawGenerateResponse {
    #[serde(default)]
    candidates: Vec<RawCandidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    error: Option<ApiErrorResponse>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawCandidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Raw `models` list page.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
    error: Option<ApiErrorResponse>,
}

/// A model entry returned by the list endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `"models/gemini-pro"`.
    pub name: String,
    /// Empty when the service omits the field.
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Model identifier without the `models/` prefix.
    pub fn id(&self) -> &str {
        normalize_model_name(&self.name)
    }

    /// Whether the model can serve `generateContent`. Entries that do not
    /// list their methods are assumed to.
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods.is_empty()
            || self
                .supported_generation_methods
                .iter()
                .any(|m| m == "generateContent")
    }
}

/// Token usage statistics.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

/// Clean return type from [`GeminiClient::generate_content`].
#[derive(Debug, Clone)]
pub struct ContentCompletion {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageMetadata>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the Gemini REST API.
pub struct GeminiClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
}

impl GeminiClient {
    /// Create a client for the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ServiceError> {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    /// Create a client against a custom base URL (proxies, local mocks).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .user_agent("wellplan/0.1")
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ServiceError::Client(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{GEMINI_API_VERSION}/{path}",
            self.base_url.trim_end_matches('/')
        )
    }

    /// List every model the key can see, following pagination.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ServiceError> {
        let start = Instant::now();
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = reqwest::Url::parse(&self.endpoint("models"))
                .map_err(|e| ServiceError::Request(format!("invalid base URL: {e}")))?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", LIST_MODELS_PAGE_SIZE);
                if let Some(ref token) = page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let page: RawModelList = self
                .send_json(self.client.get(url).header("x-goog-api-key", &self.api_key))
                .await?;
            if let Some(err) = page.error {
                return Err(ServiceError::Api(err.message));
            }
            models.extend(page.models);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(
            "Listed {} model(s) in {:.1}s",
            models.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(models)
    }

    /// Generate content with the given model.
    ///
    /// A blocked prompt, a response without candidates, or a candidate
    /// without text is reported as an error.
    pub async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<ContentCompletion, ServiceError> {
        let model = normalize_model_name(model);
        debug!(
            "Gemini request: model={}, contents={}, safety_settings={}",
            model,
            body.contents.len(),
            body.safety_settings.len(),
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();
        let url = self.endpoint(&format!("models/{model}:generateContent"));
        let parsed: RawGenerateResponse = self
            .send_json(
                self.client
                    .post(url)
                    .header("x-goog-api-key", &self.api_key)
                    .json(body),
            )
            .await?;
        debug!(
            "Gemini response from {} in {:.1}s",
            model,
            start.elapsed().as_secs_f64()
        );

        if let Some(err) = parsed.error {
            return Err(ServiceError::Api(err.message));
        }
        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ServiceError::Blocked(reason));
        }
        if let Some(ref usage) = parsed.usage_metadata {
            debug!(
                "Token usage: prompt={}, candidates={}, total={}",
                usage.prompt_token_count.unwrap_or(0),
                usage.candidates_token_count.unwrap_or(0),
                usage.total_token_count.unwrap_or(0),
            );
        }

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::EmptyResponse(model.to_string()))?;
        let text = candidate
            .content
            .as_ref()
            .and_then(Content::text)
            .ok_or_else(|| match candidate.finish_reason.as_deref() {
                Some("SAFETY") => ServiceError::Blocked("SAFETY".into()),
                _ => ServiceError::EmptyResponse(model.to_string()),
            })?;

        Ok(ContentCompletion {
            text,
            finish_reason: candidate.finish_reason,
            usage: parsed.usage_metadata,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ServiceError> {
        let resp = request
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ServiceError::Request(format!("failed to read response: {e}")))?;
        trace!("HTTP {} ({} bytes)", status, text.len());

        if !status.is_success() {
            return Err(ServiceError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}
