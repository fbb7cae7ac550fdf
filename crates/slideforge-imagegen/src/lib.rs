//! SlideForge Imagegen - image generation orchestration engine
//!
//! Turns structured slide content into a request against one of several
//! third-party image-generation backends (Replicate, fal.ai, Together,
//! Black Forest Labs) and reliably returns a usable image URL despite
//! network flakiness, provider-specific async completion models, and
//! heterogeneous error semantics. Retry, polling, and error classification
//! live here; persistence, quotas, and HTTP response shaping do not.

pub mod archetype;
pub mod config;
pub mod http;
pub mod polling;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod retry;
pub mod service;

pub use archetype::{ArchetypeId, ArchetypeVisualConfig};
pub use config::{EngineConfig, ProviderConfig, ProviderId, ProviderOverrides, ProviderParams};
pub use http::{HttpClient, HttpResponse, TransportError, UreqClient};
pub use prompt::{Audience, AspectRatio, Density, ImagePrompt, ImageStyle, PromptBuilder};
pub use provider::{GenerateContext, ProviderAdapter, ProviderOutput};
pub use service::{GenerationResult, GenerationService};
