//! Generation service: the orchestration entry point
//!
//! Resolves and validates provider configuration, runs one adapter under
//! the retry orchestrator, and assembles the final `GenerationResult`.
//! Each call is independent; the only shared state is the read-only
//! archetype catalog and provider constant tables.

use crate::archetype::ArchetypeId;
use crate::config::{EngineConfig, ProviderOverrides};
use crate::http::{HttpClient, UreqClient};
use crate::prompt::ImagePrompt;
use crate::provider::GenerateContext;
use crate::providers;
use crate::retry;
use slideforge_core::{Result, SlideId};
use std::time::{Duration, Instant};

/// The outcome of a successful generation. Created exactly once, on the
/// attempt that terminates the retry loop; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Freshly minted id for the downstream persistence layer
    pub slide_id: SlideId,
    pub image_url: String,
    pub image_base64: Option<String>,
    /// The prompt that produced the image
    pub prompt: ImagePrompt,
    pub archetype_id: ArchetypeId,
    /// Wall clock from the first attempt's start to terminal success
    pub generation_time_ms: u64,
    pub model_used: String,
    pub seed: Option<u64>,
}

/// Orchestrates image generation across the registered providers
pub struct GenerationService {
    config: EngineConfig,
    http: Box<dyn HttpClient>,
    seed_source: Option<Box<dyn Fn() -> u64 + Send + Sync>>,
    sleep: Box<dyn Fn(Duration) + Send + Sync>,
}

impl GenerationService {
    /// Service with the production transport and real sleeps
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            http: Box::new(UreqClient::new()),
            seed_source: None,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Replace the HTTP transport (tests, embedding)
    pub fn with_client(mut self, http: Box<dyn HttpClient>) -> Self {
        self.http = http;
        self
    }

    /// Supply deterministic seeds to providers that accept one
    pub fn with_seed_source(
        mut self,
        seed_source: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.seed_source = Some(Box::new(seed_source));
        self
    }

    /// Replace the sleep used for backoff and poll intervals
    pub fn with_sleep(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Whether a provider + key can be resolved from process config alone
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Generate one image for an already-built prompt.
    ///
    /// Configuration failures (unknown provider, missing key, malformed
    /// model) are hard errors raised before any network call. Everything
    /// else runs under the provider's retry budget; the error that comes
    /// back is the last attempt's, classified.
    pub fn generate(
        &self,
        prompt: &ImagePrompt,
        archetype_id: ArchetypeId,
        overrides: Option<&ProviderOverrides>,
    ) -> Result<GenerationResult> {
        let default_overrides = ProviderOverrides::default();
        let config = self
            .config
            .resolve(overrides.unwrap_or(&default_overrides))?;
        config.validate()?;

        let params = config.provider.params();
        let adapter = providers::adapter_for(config.provider);
        let seed = self.seed_source.as_ref().map(|f| f());

        tracing::info!(
            provider = config.provider.as_str(),
            model = %config.model,
            archetype = %archetype_id,
            "starting generation"
        );

        let start = Instant::now();
        let output = retry::with_retries_sleep(
            config.provider.as_str(),
            params.max_retries,
            |attempt| {
                tracing::debug!(provider = config.provider.as_str(), attempt, "attempt start");
                let ctx = GenerateContext {
                    http: self.http.as_ref(),
                    params: &params,
                    seed,
                    sleep: self.sleep.as_ref(),
                };
                adapter.generate(&ctx, prompt, &config)
            },
            |d| (self.sleep)(d),
        )?;
        let generation_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            provider = config.provider.as_str(),
            generation_time_ms,
            "generation succeeded"
        );

        Ok(GenerationResult {
            slide_id: SlideId::new(),
            image_url: output.image_url,
            image_base64: output.image_base64,
            prompt: prompt.clone(),
            archetype_id,
            generation_time_ms,
            model_used: output.model_used,
            seed: output.seed,
        })
    }

    /// Generate several independent variations. Each prompt gets its own
    /// full retry and poll budget; one failing does not stop the rest.
    pub fn generate_variations(
        &self,
        prompts: &[ImagePrompt],
        archetype_id: ArchetypeId,
        overrides: Option<&ProviderOverrides>,
    ) -> Vec<Result<GenerationResult>> {
        prompts
            .iter()
            .map(|prompt| self.generate(prompt, archetype_id, overrides))
            .collect()
    }
}
