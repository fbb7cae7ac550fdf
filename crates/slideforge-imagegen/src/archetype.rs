//! Archetype visual configuration catalog
//!
//! Each slide archetype carries fixed layout/color/typography guidance and
//! an example prompt. The catalog is a pure static lookup; it is never
//! mutated at runtime and performs no I/O.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named slide layout/visual pattern produced by the upstream
/// classification stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeId {
    KpiDashboard,
    Timeline,
    ProcessFlow,
    Comparison,
    MarketLandscape,
    ConceptSpotlight,
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArchetypeId::KpiDashboard => "kpi_dashboard",
            ArchetypeId::Timeline => "timeline",
            ArchetypeId::ProcessFlow => "process_flow",
            ArchetypeId::Comparison => "comparison",
            ArchetypeId::MarketLandscape => "market_landscape",
            ArchetypeId::ConceptSpotlight => "concept_spotlight",
        };
        write!(f, "{}", name)
    }
}

impl ArchetypeId {
    /// All known archetypes
    pub fn all() -> &'static [ArchetypeId] {
        &[
            ArchetypeId::KpiDashboard,
            ArchetypeId::Timeline,
            ArchetypeId::ProcessFlow,
            ArchetypeId::Comparison,
            ArchetypeId::MarketLandscape,
            ArchetypeId::ConceptSpotlight,
        ]
    }

    /// Visual configuration for this archetype
    pub fn visual_config(&self) -> &'static ArchetypeVisualConfig {
        match self {
            ArchetypeId::KpiDashboard => &KPI_DASHBOARD,
            ArchetypeId::Timeline => &TIMELINE,
            ArchetypeId::ProcessFlow => &PROCESS_FLOW,
            ArchetypeId::Comparison => &COMPARISON,
            ArchetypeId::MarketLandscape => &MARKET_LANDSCAPE,
            ArchetypeId::ConceptSpotlight => &CONCEPT_SPOTLIGHT,
        }
    }
}

/// Static visual guidance for one archetype
#[derive(Debug, Clone)]
pub struct ArchetypeVisualConfig {
    /// Overall rendering direction
    pub visual_style: &'static str,
    /// Spatial arrangement guidance
    pub layout_guidance: &'static str,
    /// Color palette description
    pub color_palette: &'static str,
    /// Typography direction for in-image text
    pub typography_style: &'static str,
    /// A known-good example prompt for this archetype
    pub example_prompt: &'static str,
}

static KPI_DASHBOARD: ArchetypeVisualConfig = ArchetypeVisualConfig {
    visual_style: "clean corporate dashboard with large metric cards and subtle data visualization",
    layout_guidance: "grid of 3-4 metric panels, primary KPI top-left, supporting charts below",
    color_palette: "deep navy background, white panels, single teal accent for positive deltas",
    typography_style: "bold oversized numerals, small uppercase metric labels",
    example_prompt: "executive KPI dashboard slide, four metric cards on navy, minimal line charts",
};

static TIMELINE: ArchetypeVisualConfig = ArchetypeVisualConfig {
    visual_style: "horizontal milestone timeline with connected nodes",
    layout_guidance: "left-to-right axis across the middle third, milestones as evenly spaced nodes",
    color_palette: "white background, slate axis, alternating blue and amber milestone markers",
    typography_style: "compact sans-serif date labels above the axis, descriptions below",
    example_prompt: "product roadmap timeline slide, five milestones on a horizontal axis, flat design",
};

static PROCESS_FLOW: ArchetypeVisualConfig = ArchetypeVisualConfig {
    visual_style: "left-to-right process diagram with chevron stages",
    layout_guidance: "3-5 chevron arrows spanning the full width, one short label per stage",
    color_palette: "light gray background, sequential blue gradient across stages",
    typography_style: "medium-weight stage titles centered inside each chevron",
    example_prompt: "four-stage process flow slide, blue chevron arrows, flat corporate style",
};

static COMPARISON: ArchetypeVisualConfig = ArchetypeVisualConfig {
    visual_style: "two-column side-by-side comparison panel",
    layout_guidance: "vertical divider at center, mirrored rows aligned across both columns",
    color_palette: "neutral background, cool blue left column, warm orange right column",
    typography_style: "column headers in bold, row items in regular weight with icons",
    example_prompt: "build-vs-buy comparison slide, two balanced columns with aligned criteria rows",
};

static MARKET_LANDSCAPE: ArchetypeVisualConfig = ArchetypeVisualConfig {
    visual_style: "2x2 strategic quadrant chart with positioned entities",
    layout_guidance: "full-bleed quadrant grid, axis labels at edges, entities as labeled dots",
    color_palette: "off-white background, muted gridlines, saturated dots sized by relevance",
    typography_style: "italic axis labels, small annotations next to each dot",
    example_prompt: "competitive landscape 2x2 quadrant slide, labeled vendor dots, consulting style",
};

static CONCEPT_SPOTLIGHT: ArchetypeVisualConfig = ArchetypeVisualConfig {
    visual_style: "single central concept illustration with radiating supporting elements",
    layout_guidance: "hero graphic centered, 3-4 supporting callouts arranged around it",
    color_palette: "dark charcoal background, one vivid accent color on the central element",
    typography_style: "large statement headline, thin callout labels with leader lines",
    example_prompt: "central concept spotlight slide, abstract hub illustration with four callouts",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_archetype_has_config() {
        for id in ArchetypeId::all() {
            let config = id.visual_config();
            assert!(!config.visual_style.is_empty());
            assert!(!config.layout_guidance.is_empty());
            assert!(!config.color_palette.is_empty());
            assert!(!config.typography_style.is_empty());
            assert!(!config.example_prompt.is_empty());
        }
    }

    #[test]
    fn test_serde_snake_case_names() {
        let json = serde_json::to_string(&ArchetypeId::KpiDashboard).unwrap();
        assert_eq!(json, "\"kpi_dashboard\"");
        let parsed: ArchetypeId = serde_json::from_str("\"market_landscape\"").unwrap();
        assert_eq!(parsed, ArchetypeId::MarketLandscape);
    }

    #[test]
    fn test_display_matches_serde() {
        assert_eq!(ArchetypeId::ProcessFlow.to_string(), "process_flow");
    }
}
