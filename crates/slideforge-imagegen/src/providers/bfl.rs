//! Black Forest Labs adapter (official vendor, submit-then-poll)
//!
//! The POST goes to a model-specific endpoint and only ever returns a
//! request id; completion is discovered by polling the shared result
//! endpoint until the status is `Ready`, `Failed`, or `Error`.
//! Authentication uses the vendor's `x-key` header, not a bearer token.

use crate::config::{ProviderConfig, ProviderId};
use crate::polling::{GenerationAttempt, PollStatus, PollingEngine};
use crate::prompt::ImagePrompt;
use crate::provider::{
    check_status, classify_transport, GenerateContext, ProviderAdapter, ProviderOutput,
};
use serde_json::Value;
use slideforge_core::{ClassifiedError, Result};

/// Moderation strictness passed through verbatim (0 = strictest, 6 = most
/// permissive; 2 is the vendor default)
const SAFETY_TOLERANCE: u8 = 2;

/// Black Forest Labs image generation adapter
#[derive(Debug, Default)]
pub struct BflAdapter;

/// Extract the request id from a submit response
pub fn parse_bfl_submit(body: &Value) -> Result<String> {
    body.get("id")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            ClassifiedError::provider_failure(
                ProviderId::Bfl.as_str(),
                "submit response carried no request id",
            )
        })
}

/// Map a result-endpoint body onto the poll state machine
pub fn parse_bfl_result(body: &Value) -> PollStatus {
    match body.get("status").and_then(Value::as_str) {
        Some("Ready") => PollStatus::Succeeded(body.clone()),
        Some("Failed") | Some("Error") => {
            let detail = match body.get("details") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "generation failed".to_string(),
            };
            PollStatus::Failed(detail)
        }
        Some("Content Moderated") | Some("Request Moderated") => {
            PollStatus::Failed("request rejected by content moderation".to_string())
        }
        _ => PollStatus::Processing,
    }
}

/// Pull the sample URL and seed out of a `Ready` payload
pub fn parse_bfl_sample(body: &Value) -> Result<(String, Option<u64>)> {
    let result = body.get("result").ok_or_else(|| {
        ClassifiedError::provider_failure(
            ProviderId::Bfl.as_str(),
            "ready response carried no result object",
        )
    })?;
    let url = result
        .get("sample")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            ClassifiedError::provider_failure(
                ProviderId::Bfl.as_str(),
                "ready result carried no sample URL",
            )
        })?;
    Ok((url, result.get("seed").and_then(Value::as_u64)))
}

impl BflAdapter {
    fn headers(config: &ProviderConfig) -> Vec<(String, String)> {
        vec![("x-key".to_string(), config.api_key.clone())]
    }

    fn payload(prompt: &ImagePrompt, seed: Option<u64>) -> Value {
        let (width, height) = prompt.aspect_ratio.dimensions();
        let mut payload = serde_json::json!({
            "prompt": prompt.prompt,
            "width": width,
            "height": height,
            "steps": prompt.num_inference_steps,
            "guidance": prompt.guidance_scale,
            "safety_tolerance": SAFETY_TOLERANCE,
        });
        if let Some(s) = seed {
            payload["seed"] = serde_json::json!(s);
        }
        payload
    }
}

impl ProviderAdapter for BflAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Bfl
    }

    fn generate(
        &self,
        ctx: &GenerateContext<'_>,
        prompt: &ImagePrompt,
        config: &ProviderConfig,
    ) -> Result<ProviderOutput> {
        let submit_url = format!("{}/v1/{}", config.base_url, config.model);
        let headers = Self::headers(config);

        let response = ctx
            .http
            .post_json(
                &submit_url,
                &headers,
                &Self::payload(prompt, ctx.seed),
                ctx.timeout(),
            )
            .map_err(|e| classify_transport(ProviderId::Bfl, e))?;
        check_status(ProviderId::Bfl, &response)?;

        let job_id = parse_bfl_submit(&response.body)?;
        tracing::debug!(job_id = %job_id, model = %config.model, "bfl request submitted");

        let poll_url = format!("{}/v1/get_result?id={}", config.base_url, job_id);
        let mut attempt = GenerationAttempt::submitted(job_id);
        let engine = PollingEngine::new(ProviderId::Bfl, ctx.params, ctx.sleep);

        let payload = engine.run(&mut attempt, || {
            let response = ctx
                .http
                .get_json(&poll_url, &headers, ctx.timeout())
                .map_err(|e| classify_transport(ProviderId::Bfl, e))?;
            check_status(ProviderId::Bfl, &response)?;
            Ok(parse_bfl_result(&response.body))
        })?;

        let (image_url, seed) = parse_bfl_sample(&payload)?;
        Ok(ProviderOutput {
            image_url,
            image_base64: None,
            model_used: config.model.clone(),
            seed: seed.or(ctx.seed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_submit_response() {
        let body = json!({"id": "req-0192", "polling_url": "https://api.bfl.ai/v1/get_result?id=req-0192"});
        assert_eq!(parse_bfl_submit(&body).unwrap(), "req-0192");
    }

    #[test]
    fn test_parse_submit_missing_id() {
        assert!(parse_bfl_submit(&json!({"detail": "bad request"})).is_err());
    }

    #[test]
    fn test_parse_result_pending() {
        let status = parse_bfl_result(&json!({"status": "Pending"}));
        assert!(matches!(status, PollStatus::Processing));
    }

    #[test]
    fn test_parse_result_ready() {
        let body = json!({
            "status": "Ready",
            "result": {"sample": "https://delivery.bfl.ai/sample.png", "seed": 1234}
        });
        let status = parse_bfl_result(&body);
        let PollStatus::Succeeded(payload) = status else {
            panic!("expected success");
        };
        let (url, seed) = parse_bfl_sample(&payload).unwrap();
        assert_eq!(url, "https://delivery.bfl.ai/sample.png");
        assert_eq!(seed, Some(1234));
    }

    #[test]
    fn test_parse_result_failed() {
        let status = parse_bfl_result(&json!({"status": "Error", "details": {"reason": "internal"}}));
        let PollStatus::Failed(message) = status else {
            panic!("expected failure");
        };
        assert!(message.contains("internal"));
    }

    #[test]
    fn test_parse_result_moderated_is_failure() {
        let status = parse_bfl_result(&json!({"status": "Content Moderated"}));
        assert!(matches!(status, PollStatus::Failed(_)));
    }

    #[test]
    fn test_payload_shape() {
        let prompt = ImagePrompt {
            prompt: "timeline slide".to_string(),
            negative_prompt: "blurry".to_string(),
            aspect_ratio: crate::prompt::AspectRatio::Widescreen,
            style: crate::prompt::ImageStyle::Isometric,
            guidance_scale: 3.5,
            num_inference_steps: 28,
        };
        let payload = BflAdapter::payload(&prompt, None);
        assert_eq!(payload["width"], 1344);
        assert_eq!(payload["height"], 768);
        assert_eq!(payload["safety_tolerance"], 2);
        assert!(payload.get("seed").is_none());
    }
}
