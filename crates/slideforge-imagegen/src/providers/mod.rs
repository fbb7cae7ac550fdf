//! Provider registry
//!
//! Maps provider ids to concrete adapter implementations. Adapters are
//! stateless; one static instance per backend is shared by all calls.

pub mod bfl;
pub mod fal;
pub mod replicate;
pub mod together;

use crate::config::ProviderId;
use crate::provider::ProviderAdapter;

static REPLICATE: replicate::ReplicateAdapter = replicate::ReplicateAdapter;
static FAL: fal::FalAdapter = fal::FalAdapter;
static TOGETHER: together::TogetherAdapter = together::TogetherAdapter;
static BFL: bfl::BflAdapter = bfl::BflAdapter;

/// Look up the adapter for a provider id
pub fn adapter_for(provider: ProviderId) -> &'static dyn ProviderAdapter {
    match provider {
        ProviderId::Replicate => &REPLICATE,
        ProviderId::Fal => &FAL,
        ProviderId::Together => &TOGETHER,
        ProviderId::Bfl => &BFL,
    }
}

/// All registered provider names
pub fn available_providers() -> Vec<&'static str> {
    ProviderId::all().iter().map(ProviderId::as_str).collect()
}
