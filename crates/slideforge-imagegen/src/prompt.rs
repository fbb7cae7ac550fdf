//! Prompt construction from structured content and archetype guidance
//!
//! `PromptBuilder::build` is deterministic and performs no I/O: same
//! content, archetype, and modifiers always produce the same `ImagePrompt`.

use crate::archetype::ArchetypeId;
use serde::{Deserialize, Serialize};
use slideforge_core::StructuredContent;
use std::fmt;

/// Maximum data points folded into the prompt text
const MAX_DATA_POINTS: usize = 3;
/// Maximum bullet excerpts folded into the prompt text
const MAX_BULLETS: usize = 4;

/// Terms every generation must avoid, regardless of archetype
const NEGATIVE_PROMPT_TERMS: &[&str] = &[
    "blurry text",
    "illegible text",
    "misspelled words",
    "watermark",
    "signature",
    "human faces",
    "photorealistic people",
    "stock photo look",
    "cluttered layout",
    "distorted charts",
];

/// Marker line prepended to the literal-text block by the accuracy pass.
/// Its presence makes `enhance_for_text_accuracy` idempotent.
const TEXT_ACCURACY_MARKER: &str = "Render these exact text elements, spelled precisely:";

/// Guidance/steps applied by the text-accuracy pass. Values sit inside
/// every supported provider's accepted range.
const ENHANCED_GUIDANCE_SCALE: f64 = 7.0;
const ENHANCED_INFERENCE_STEPS: u32 = 50;

/// Slide aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 16:9
    Widescreen,
    /// 4:3
    Standard,
}

impl AspectRatio {
    /// Ratio string as wire formats expect it ("16:9" / "4:3")
    pub fn as_ratio_str(&self) -> &'static str {
        match self {
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Standard => "4:3",
        }
    }

    /// Pixel dimensions for providers that take explicit width/height
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AspectRatio::Widescreen => (1344, 768),
            AspectRatio::Standard => (1024, 768),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ratio_str())
    }
}

/// The four fixed rendering styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStyle {
    FlatCorporate,
    Isometric,
    GradientModern,
    MinimalLine,
}

impl ImageStyle {
    fn descriptor(&self) -> &'static str {
        match self {
            ImageStyle::FlatCorporate => "flat corporate vector illustration",
            ImageStyle::Isometric => "isometric 3D illustration with soft shadows",
            ImageStyle::GradientModern => "modern gradient design with smooth color transitions",
            ImageStyle::MinimalLine => "minimal single-weight line art",
        }
    }
}

/// Target audience modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Executive,
    Technical,
    General,
}

impl Audience {
    fn modifier(&self) -> &'static str {
        match self {
            Audience::Executive => "boardroom-ready, authoritative, focused on outcomes",
            Audience::Technical => "precise, detail-tolerant, diagram-oriented",
            Audience::General => "approachable, simple visual metaphors",
        }
    }
}

/// Information density modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Density {
    Minimal,
    Balanced,
    Dense,
}

impl Density {
    fn modifier(&self) -> &'static str {
        match self {
            Density::Minimal => "generous whitespace, one focal element",
            Density::Balanced => "balanced composition, moderate detail",
            Density::Dense => "information-rich but organized, clear visual hierarchy",
        }
    }
}

/// A fully assembled generation prompt. Immutable once built; the
/// text-accuracy pass returns a new value rather than mutating in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePrompt {
    pub prompt: String,
    pub negative_prompt: String,
    pub aspect_ratio: AspectRatio,
    pub style: ImageStyle,
    pub guidance_scale: f64,
    pub num_inference_steps: u32,
}

impl ImagePrompt {
    /// Append the literal-text block and raise guidance/steps so providers
    /// render the listed strings verbatim. With no text elements only the
    /// guidance/steps raise applies; the prompt text is left untouched.
    ///
    /// Idempotent: if the prompt already carries the text-accuracy block
    /// the value is returned unchanged.
    pub fn enhance_for_text_accuracy(&self, text_elements: &[String]) -> ImagePrompt {
        if self.prompt.contains(TEXT_ACCURACY_MARKER) {
            return self.clone();
        }

        let mut enhanced = self.clone();
        if !text_elements.is_empty() {
            enhanced.prompt = format!(
                "{}. {} {}",
                self.prompt,
                TEXT_ACCURACY_MARKER,
                text_elements.join("; ")
            );
        }
        enhanced.guidance_scale = self.guidance_scale.max(ENHANCED_GUIDANCE_SCALE);
        enhanced.num_inference_steps = self.num_inference_steps.max(ENHANCED_INFERENCE_STEPS);
        enhanced
    }
}

/// Builds `ImagePrompt` values from structured content and archetype
/// visual guidance
pub struct PromptBuilder;

impl PromptBuilder {
    /// Assemble the prompt. Total for any valid archetype id; unknown
    /// archetypes cannot be represented (`ArchetypeId` is exhaustive).
    pub fn build(
        content: &StructuredContent,
        archetype: ArchetypeId,
        audience: Audience,
        density: Density,
        style: ImageStyle,
    ) -> ImagePrompt {
        let config = archetype.visual_config();
        let mut parts = Vec::new();

        parts.push(format!("Consulting slide visual: {}", content.title));
        parts.push(content.core_message.clone());

        let points: Vec<String> = content
            .data_points
            .iter()
            .take(MAX_DATA_POINTS)
            .map(|p| format!("{} {}", p.label, p.value))
            .collect();
        if !points.is_empty() {
            parts.push(format!("Key figures: {}", points.join(", ")));
        }

        let bullets: Vec<&str> = content
            .logical_groups
            .iter()
            .flat_map(|g| g.bullets.iter())
            .take(MAX_BULLETS)
            .map(String::as_str)
            .collect();
        if !bullets.is_empty() {
            parts.push(format!("Covering: {}", bullets.join("; ")));
        }

        parts.push(config.visual_style.to_string());
        parts.push(format!("Layout: {}", config.layout_guidance));
        parts.push(format!("Colors: {}", config.color_palette));
        parts.push(format!("Typography: {}", config.typography_style));
        parts.push(style.descriptor().to_string());
        parts.push(format!("Audience: {}", audience.modifier()));
        parts.push(format!("Density: {}", density.modifier()));

        ImagePrompt {
            prompt: parts.join(". "),
            negative_prompt: NEGATIVE_PROMPT_TERMS.join(", "),
            aspect_ratio: AspectRatio::Widescreen,
            style,
            guidance_scale: 3.5,
            num_inference_steps: 28,
        }
    }

    /// The literal strings a text-accurate render must contain: title plus
    /// the leading data points as "label: value" pairs.
    pub fn text_elements(content: &StructuredContent) -> Vec<String> {
        let mut elements = vec![content.title.clone()];
        elements.extend(
            content
                .data_points
                .iter()
                .take(MAX_DATA_POINTS)
                .map(|p| format!("{}: {}", p.label, p.value)),
        );
        elements
    }
}
