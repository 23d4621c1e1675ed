//! The [`GenerationService`] trait and its error type.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::{GeminiClient, GenerateContentRequest, ModelInfo};

/// Boxed future returned by [`GenerationService`] methods.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ServiceError>> + Send + 'a>>;

/// Failure of a call to the generation service.
///
/// Every variant is recoverable from the pipeline's point of view: the
/// provider maps all of them to the canned plan.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("Gemini API HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Gemini API error: {0}")]
    Api(String),
    #[error("failed to parse response: {0}")]
    Decode(String),
    #[error("content blocked: {0}")]
    Blocked(String),
    #[error("empty response from {0}")]
    EmptyResponse(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// External text-generation service.
///
/// Implemented by [`GeminiClient`]. Tests implement it with in-memory fakes
/// so the provider's fallback chain runs without a network.
pub trait GenerationService: Send + Sync {
    /// Identifiers of the models currently available for content
    /// generation, as reported by the service (may carry a `models/` prefix).
    fn list_models(&self) -> ServiceFuture<'_, Vec<String>>;

    /// Generate text for `request` with `model`.
    fn generate_content<'a>(
        &'a self,
        model: &'a str,
        request: &'a GenerateContentRequest,
    ) -> ServiceFuture<'a, String>;
}

impl GenerationService for GeminiClient {
    fn list_models(&self) -> ServiceFuture<'_, Vec<String>> {
        Box::pin(async move {
            let models = GeminiClient::list_models(self).await?;
            Ok(models
                .into_iter()
                .filter(ModelInfo::supports_generate_content)
                .map(|m| m.name)
                .collect())
        })
    }

    fn generate_content<'a>(
        &'a self,
        model: &'a str,
        request: &'a GenerateContentRequest,
    ) -> ServiceFuture<'a, String> {
        Box::pin(async move {
            let completion = GeminiClient::generate_content(self, model, request).await?;
            Ok(completion.text)
        })
    }
}
