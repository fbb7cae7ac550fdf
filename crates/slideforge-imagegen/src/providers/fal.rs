//! fal.ai adapter (low-latency synchronous)
//!
//! fal completes fast enough that `sync_mode` returns the finished image
//! in the POST response; no job id and no polling. The model name is a
//! path segment under the base URL (e.g. `fal-ai/flux/dev`).

use crate::config::{ProviderConfig, ProviderId};
use crate::prompt::ImagePrompt;
use crate::provider::{
    check_status, classify_transport, GenerateContext, ProviderAdapter, ProviderOutput,
};
use serde_json::Value;
use slideforge_core::{ClassifiedError, Result};

/// fal.ai image generation adapter
#[derive(Debug, Default)]
pub struct FalAdapter;

/// Decoded fal response: first image URL, optional inline content, seed
pub fn parse_fal_response(body: &Value) -> Result<(String, Option<String>, Option<u64>)> {
    let image = body
        .get("images")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .ok_or_else(|| {
            ClassifiedError::provider_failure(
                ProviderId::Fal.as_str(),
                "response carried no images",
            )
        })?;

    let content = image
        .get("content")
        .and_then(Value::as_str)
        .map(String::from);
    let url = image
        .get("url")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            ClassifiedError::provider_failure(
                ProviderId::Fal.as_str(),
                "image entry carried no URL",
            )
        })?;

    let seed = body.get("seed").and_then(Value::as_u64);
    Ok((url, content, seed))
}

impl FalAdapter {
    fn payload(prompt: &ImagePrompt, seed: Option<u64>) -> Value {
        let (width, height) = prompt.aspect_ratio.dimensions();
        let mut payload = serde_json::json!({
            "prompt": prompt.prompt,
            "image_size": { "width": width, "height": height },
            "num_inference_steps": prompt.num_inference_steps,
            "num_images": 1,
            "enable_safety_checker": false,
            "sync_mode": true,
        });
        if let Some(s) = seed {
            payload["seed"] = serde_json::json!(s);
        }
        payload
    }
}

impl ProviderAdapter for FalAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Fal
    }

    fn generate(
        &self,
        ctx: &GenerateContext<'_>,
        prompt: &ImagePrompt,
        config: &ProviderConfig,
    ) -> Result<ProviderOutput> {
        let url = format!("{}/{}", config.base_url, config.model);
        let headers = vec![(
            "Authorization".to_string(),
            format!("Key {}", config.api_key),
        )];

        let response = ctx
            .http
            .post_json(
                &url,
                &headers,
                &Self::payload(prompt, ctx.seed),
                ctx.timeout(),
            )
            .map_err(|e| classify_transport(ProviderId::Fal, e))?;
        check_status(ProviderId::Fal, &response)?;

        let (image_url, content, seed) = parse_fal_response(&response.body)?;
        Ok(ProviderOutput {
            image_url,
            image_base64: content,
            model_used: config.model.clone(),
            seed: seed.or(ctx.seed),
        })
    }
}
