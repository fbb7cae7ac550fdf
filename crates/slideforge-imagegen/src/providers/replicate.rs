//! Replicate adapter (submit-and-wait)
//!
//! Replicate can complete synchronously when asked via the `Prefer: wait`
//! header. If the immediate response is already terminal no polling
//! happens; otherwise the prediction id is polled until the status is
//! terminal.

use crate::config::{ProviderConfig, ProviderId};
use crate::polling::{GenerationAttempt, PollStatus, PollingEngine};
use crate::prompt::ImagePrompt;
use crate::provider::{
    check_status, classify_transport, GenerateContext, ProviderAdapter, ProviderOutput,
};
use serde_json::Value;
use slideforge_core::{ClassifiedError, Result};

/// How long the initial request should block server-side before falling
/// back to the polling flow
const WAIT_SECONDS: u32 = 30;

/// Replicate image generation adapter
#[derive(Debug, Default)]
pub struct ReplicateAdapter;

/// Decoded state of a Replicate prediction response
#[derive(Debug, Clone)]
pub struct Prediction {
    pub id: Option<String>,
    pub status: PredictionStatus,
    pub output_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionStatus {
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

/// Decode a prediction body (from submit or poll). Output may be a bare
/// URL string or an array of URLs; the first entry wins.
pub fn parse_prediction(body: &Value) -> Prediction {
    let status = match body.get("status").and_then(Value::as_str) {
        Some("succeeded") => PredictionStatus::Succeeded,
        Some("failed") => PredictionStatus::Failed,
        Some("canceled") => PredictionStatus::Canceled,
        _ => PredictionStatus::Processing,
    };

    let output_url = match body.get("output") {
        Some(Value::String(url)) => Some(url.clone()),
        Some(Value::Array(urls)) => urls.first().and_then(Value::as_str).map(String::from),
        _ => None,
    };

    Prediction {
        id: body.get("id").and_then(Value::as_str).map(String::from),
        status,
        output_url,
        error: body.get("error").and_then(Value::as_str).map(String::from),
    }
}

impl ReplicateAdapter {
    fn auth_header(config: &ProviderConfig) -> (String, String) {
        (
            "Authorization".to_string(),
            format!("Bearer {}", config.api_key),
        )
    }

    fn submit_headers(config: &ProviderConfig) -> Vec<(String, String)> {
        vec![
            Self::auth_header(config),
            ("Prefer".to_string(), format!("wait={}", WAIT_SECONDS)),
        ]
    }

    /// Status requests carry only authentication; the wait preference is
    /// meaningful on submit alone.
    fn poll_headers(config: &ProviderConfig) -> Vec<(String, String)> {
        vec![Self::auth_header(config)]
    }

    fn payload(prompt: &ImagePrompt) -> Value {
        serde_json::json!({
            "input": {
                "prompt": prompt.prompt,
                "negative_prompt": prompt.negative_prompt,
                "aspect_ratio": prompt.aspect_ratio.as_ratio_str(),
                "guidance_scale": prompt.guidance_scale,
                "num_inference_steps": prompt.num_inference_steps,
                "output_format": "png",
                "output_quality": 95,
            }
        })
    }

    fn finish(config: &ProviderConfig, prediction: Prediction) -> Result<ProviderOutput> {
        let image_url = prediction.output_url.ok_or_else(|| {
            ClassifiedError::provider_failure(
                ProviderId::Replicate.as_str(),
                "succeeded prediction carried no output URL",
            )
        })?;
        Ok(ProviderOutput {
            image_url,
            image_base64: None,
            model_used: config.model.clone(),
            seed: None,
        })
    }
}

impl ProviderAdapter for ReplicateAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Replicate
    }

    fn generate(
        &self,
        ctx: &GenerateContext<'_>,
        prompt: &ImagePrompt,
        config: &ProviderConfig,
    ) -> Result<ProviderOutput> {
        let submit_url = format!("{}/v1/models/{}/predictions", config.base_url, config.model);

        let response = ctx
            .http
            .post_json(
                &submit_url,
                &Self::submit_headers(config),
                &Self::payload(prompt),
                ctx.timeout(),
            )
            .map_err(|e| classify_transport(ProviderId::Replicate, e))?;
        check_status(ProviderId::Replicate, &response)?;

        let prediction = parse_prediction(&response.body);
        match prediction.status {
            PredictionStatus::Succeeded => return Self::finish(config, prediction),
            PredictionStatus::Failed => {
                return Err(ClassifiedError::provider_failure(
                    ProviderId::Replicate.as_str(),
                    prediction
                        .error
                        .unwrap_or_else(|| "prediction failed".to_string()),
                ));
            }
            PredictionStatus::Canceled => {
                return Err(ClassifiedError::canceled(ProviderId::Replicate.as_str()));
            }
            PredictionStatus::Processing => {}
        }

        // Wait window elapsed without a terminal state; fall back to polling
        let job_id = prediction.id.ok_or_else(|| {
            ClassifiedError::provider_failure(
                ProviderId::Replicate.as_str(),
                "non-terminal response carried no prediction id",
            )
        })?;
        tracing::debug!(job_id = %job_id, "replicate prediction not ready, polling");

        let poll_url = format!("{}/v1/predictions/{}", config.base_url, job_id);
        let poll_headers = Self::poll_headers(config);
        let mut attempt = GenerationAttempt::submitted(job_id);
        let engine = PollingEngine::new(ProviderId::Replicate, ctx.params, ctx.sleep);

        let payload = engine.run(&mut attempt, || {
            let response = ctx
                .http
                .get_json(&poll_url, &poll_headers, ctx.timeout())
                .map_err(|e| classify_transport(ProviderId::Replicate, e))?;
            check_status(ProviderId::Replicate, &response)?;

            let prediction = parse_prediction(&response.body);
            Ok(match prediction.status {
                PredictionStatus::Processing => PollStatus::Processing,
                PredictionStatus::Succeeded => PollStatus::Succeeded(response.body),
                PredictionStatus::Canceled => PollStatus::Canceled,
                PredictionStatus::Failed => PollStatus::Failed(
                    prediction
                        .error
                        .unwrap_or_else(|| "prediction failed".to_string()),
                ),
            })
        })?;

        Self::finish(config, parse_prediction(&payload))
    }
}
