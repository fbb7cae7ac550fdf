//! Structured slide content produced by the upstream analysis stage
//!
//! These types are the contract with the content-analysis pipeline. The
//! generation engine treats them as opaque input: it extracts text for
//! prompt construction but never validates their internal consistency.

use serde::{Deserialize, Serialize};

/// A single quantitative data point extracted from the source material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    /// Short label (e.g. "ARR growth")
    pub label: String,
    /// Display value (e.g. "34%", "$2.1M")
    pub value: String,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A MECE group of related bullet points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalGroup {
    pub heading: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

/// MECE-organized slide content from the analysis stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredContent {
    /// Slide title
    pub title: String,
    /// The one-sentence takeaway
    pub core_message: String,
    #[serde(default)]
    pub data_points: Vec<DataPoint>,
    #[serde(default)]
    pub logical_groups: Vec<LogicalGroup>,
}

impl StructuredContent {
    /// Minimal content with just a title and message (for testing and
    /// sparse slides)
    pub fn minimal(title: impl Into<String>, core_message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            core_message: core_message.into(),
            data_points: Vec::new(),
            logical_groups: Vec::new(),
        }
    }
}
