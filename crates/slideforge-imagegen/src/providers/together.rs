//! Together adapter (generic images API)
//!
//! Single synchronous POST against the OpenAI-shaped images endpoint;
//! the response `data[]` carries either a URL or inline base64 depending
//! on the requested `response_format`.

use crate::config::{ProviderConfig, ProviderId};
use crate::prompt::ImagePrompt;
use crate::provider::{
    check_status, classify_transport, GenerateContext, ProviderAdapter, ProviderOutput,
};
use serde_json::Value;
use slideforge_core::{ClassifiedError, Result};

/// Together image generation adapter
#[derive(Debug, Default)]
pub struct TogetherAdapter;

/// Decoded together response: image URL (or a data URI built from
/// b64_json), optional inline base64, and the serving model if echoed
pub fn parse_together_response(
    body: &Value,
) -> Result<(String, Option<String>, Option<String>)> {
    let entry = body
        .get("data")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .ok_or_else(|| {
            ClassifiedError::provider_failure(
                ProviderId::Together.as_str(),
                "response carried no data entries",
            )
        })?;

    let b64 = entry
        .get("b64_json")
        .and_then(Value::as_str)
        .map(String::from);

    let url = match entry.get("url").and_then(Value::as_str) {
        Some(url) => url.to_string(),
        None => match &b64 {
            Some(b64) => format!("data:image/png;base64,{}", b64),
            None => {
                return Err(ClassifiedError::provider_failure(
                    ProviderId::Together.as_str(),
                    "data entry carried neither url nor b64_json",
                ))
            }
        },
    };

    let model = body.get("model").and_then(Value::as_str).map(String::from);
    Ok((url, b64, model))
}

impl TogetherAdapter {
    fn payload(prompt: &ImagePrompt, model: &str, seed: Option<u64>) -> Value {
        let (width, height) = prompt.aspect_ratio.dimensions();
        let mut payload = serde_json::json!({
            "model": model,
            "prompt": prompt.prompt,
            "negative_prompt": prompt.negative_prompt,
            "width": width,
            "height": height,
            "steps": prompt.num_inference_steps,
            "guidance": prompt.guidance_scale,
            "n": 1,
            "response_format": "url",
        });
        if let Some(s) = seed {
            payload["seed"] = serde_json::json!(s);
        }
        payload
    }
}

impl ProviderAdapter for TogetherAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Together
    }

    fn generate(
        &self,
        ctx: &GenerateContext<'_>,
        prompt: &ImagePrompt,
        config: &ProviderConfig,
    ) -> Result<ProviderOutput> {
        let url = format!("{}/v1/images/generations", config.base_url);
        let headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", config.api_key),
        )];

        let response = ctx
            .http
            .post_json(
                &url,
                &headers,
                &Self::payload(prompt, &config.model, ctx.seed),
                ctx.timeout(),
            )
            .map_err(|e| classify_transport(ProviderId::Together, e))?;
        check_status(ProviderId::Together, &response)?;

        let (image_url, b64, model) = parse_together_response(&response.body)?;
        Ok(ProviderOutput {
            image_url,
            image_base64: b64,
            model_used: model.unwrap_or_else(|| config.model.clone()),
            seed: ctx.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_together_url_response() {
        let body = json!({
            "id": "gen-abc",
            "model": "black-forest-labs/FLUX.1-schnell",
            "data": [{"url": "https://api.together.ai/imgproxy/out.png", "index": 0}]
        });
        let (url, b64, model) = parse_together_response(&body).unwrap();
        assert_eq!(url, "https://api.together.ai/imgproxy/out.png");
        assert!(b64.is_none());
        assert_eq!(model.as_deref(), Some("black-forest-labs/FLUX.1-schnell"));
    }

    #[test]
    fn test_parse_together_b64_response() {
        let body = json!({"data": [{"b64_json": "iVBORw0K"}]});
        let (url, b64, _) = parse_together_response(&body).unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw0K");
        assert_eq!(b64.as_deref(), Some("iVBORw0K"));
    }

    #[test]
    fn test_parse_together_empty_data() {
        let body = json!({"data": []});
        assert!(parse_together_response(&body).is_err());
    }

    #[test]
    fn test_payload_shape() {
        let prompt = ImagePrompt {
            prompt: "quadrant chart".to_string(),
            negative_prompt: "clutter".to_string(),
            aspect_ratio: crate::prompt::AspectRatio::Widescreen,
            style: crate::prompt::ImageStyle::GradientModern,
            guidance_scale: 7.0,
            num_inference_steps: 50,
        };
        let payload = TogetherAdapter::payload(&prompt, "owner/model", Some(99));
        assert_eq!(payload["model"], "owner/model");
        assert_eq!(payload["width"], 1344);
        assert_eq!(payload["height"], 768);
        assert_eq!(payload["steps"], 50);
        assert_eq!(payload["guidance"], 7.0);
        assert_eq!(payload["seed"], 99);
        assert_eq!(payload["response_format"], "url");
    }
}
