//! Plan text generation with an ordered backend fallback chain.
//!
//! [`PlanProvider::generate`] lists the service's available models, picks the
//! first one from the [`BackendPriority`], and asks it for a plan. If no
//! prioritized model is listed, or any call fails or times out, it returns
//! [`CANNED_PLAN`] and emits a [`PlanEvent::Fallback`] carrying the matching
//! [`PlanWarning`]. It never returns an error.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::api::{BackendPriority, GenerationService, ServiceError, ServiceFuture};
use crate::plan::events::{EventHandler, PlanEvent, PlanWarning};
use crate::{GenerateContentRequest, GenerationConfig, SafetySetting, default_safety_settings};

/// Generic one-day plan returned whenever no backend can produce one.
pub const CANNED_PLAN: &str = "\
08:00 Water: Drink 250ml of water
08:30 Food: Eat oatmeal with berries
09:00 Activity: Light stretching for 10 minutes
10:00 Water: Drink another 250ml
12:00 Food: Balanced lunch with protein and vegetables
15:00 Activity: Short walk (10-15 minutes)
18:00 Food: Light dinner with lean protein
20:00 Relaxation: Meditation or deep breathing for 5 minutes
22:00 Sleep: Aim for 7-9 hours of quality sleep";

/// Default bound on each service call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Whether the available-models list is fetched for every plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelListPolicy {
    /// Query the service before every generation (picks up new models).
    #[default]
    RefreshEveryCall,
    /// Reuse a successful listing for the given duration.
    CacheFor(Duration),
}

/// Configuration for a [`PlanProvider`].
#[derive(Debug, Clone)]
pub struct PlanProviderConfig {
    pub priority: BackendPriority,
    pub generation: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
    /// Bound applied to each list/generate call. `None` leaves only the HTTP
    /// client's own timeout.
    pub timeout: Option<Duration>,
    pub model_list_policy: ModelListPolicy,
}

impl Default for PlanProviderConfig {
    fn default() -> Self {
        Self {
            priority: BackendPriority::default(),
            generation: GenerationConfig::default(),
            safety_settings: default_safety_settings(),
            timeout: Some(DEFAULT_CALL_TIMEOUT),
            model_list_policy: ModelListPolicy::default(),
        }
    }
}

impl PlanProviderConfig {
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_model_list_policy(mut self, policy: ModelListPolicy) -> Self {
        self.model_list_policy = policy;
        self
    }

    pub fn with_priority(mut self, priority: BackendPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Reason a generation attempt resolved to the canned plan.
#[derive(Debug, Error)]
enum Fallback {
    #[error("none of the {listed} listed model(s) is a prioritized backend")]
    Unavailable { listed: usize },
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl Fallback {
    fn warning(&self) -> PlanWarning {
        match self {
            Fallback::Unavailable { .. } => PlanWarning::ModelsUnavailable,
            Fallback::Service(_) => PlanWarning::TechnicalDifficulty,
        }
    }
}

/// Produces raw plan text from a prompt, degrading to [`CANNED_PLAN`].
pub struct PlanProvider {
    service: Arc<dyn GenerationService>,
    config: PlanProviderConfig,
    model_cache: Mutex<Option<(Instant, HashSet<String>)>>,
}

impl PlanProvider {
    pub fn new(service: Arc<dyn GenerationService>, config: PlanProviderConfig) -> Self {
        Self {
            service,
            config,
            model_cache: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PlanProviderConfig {
        &self.config
    }

    /// Generate plan text for `prompt`. Never fails.
    pub async fn generate(&self, prompt: &str, events: &dyn EventHandler) -> String {
        match self.try_generate(prompt, events).await {
            Ok(text) => text,
            Err(fallback) => {
                let detail = fallback.to_string();
                events.on_event(&PlanEvent::Fallback {
                    warning: fallback.warning(),
                    detail: &detail,
                });
                CANNED_PLAN.to_string()
            }
        }
    }

    async fn try_generate(&self, prompt: &str, events: &dyn EventHandler) -> Result<String, Fallback> {
        let available = self.available_models().await?;
        events.on_event(&PlanEvent::ModelsListed {
            count: available.len(),
        });

        let model = self
            .config
            .priority
            .choose(&available)
            .ok_or(Fallback::Unavailable {
                listed: available.len(),
            })?;
        events.on_event(&PlanEvent::BackendSelected { model });

        let request = GenerateContentRequest::user_prompt(
            prompt,
            self.config.generation.clone(),
            self.config.safety_settings.clone(),
        );
        let text = self
            .bounded(self.service.generate_content(model, &request))
            .await?;
        events.on_event(&PlanEvent::Generated {
            model,
            chars: text.chars().count(),
        });
        Ok(text)
    }

    async fn available_models(&self) -> Result<HashSet<String>, ServiceError> {
        if let ModelListPolicy::CacheFor(ttl) = self.config.model_list_policy
            && let Ok(cache) = self.model_cache.lock()
            && let Some((fetched_at, ref models)) = *cache
            && fetched_at.elapsed() < ttl
        {
            debug!("Using cached model list ({} entries)", models.len());
            return Ok(models.clone());
        }

        let models: HashSet<String> = self
            .bounded(self.service.list_models())
            .await?
            .into_iter()
            .collect();

        if matches!(self.config.model_list_policy, ModelListPolicy::CacheFor(_))
            && let Ok(mut cache) = self.model_cache.lock()
        {
            *cache = Some((Instant::now(), models.clone()));
        }
        Ok(models)
    }

    async fn bounded<T>(&self, call: ServiceFuture<'_, T>) -> Result<T, ServiceError> {
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ServiceError::Timeout(limit))?,
            None => call.await,
        }
    }
}
