//! Provider configuration: layered loading, resolution, and validation
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `SLIDEFORGE_{PROVIDER}_API_KEY`,
//!    `SLIDEFORGE_IMAGE_PROVIDER`
//! 2. Project-local: `.slideforge/config.toml`
//! 3. Global: `~/.slideforge/config.toml`
//!
//! Caller-supplied `ProviderOverrides` win over all three. The resolved
//! `ProviderConfig` is validated before any network call is made.

use serde::{Deserialize, Serialize};
use slideforge_core::{ClassifiedError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The supported image generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Replicate,
    Fal,
    Together,
    Bfl,
}

impl ProviderId {
    /// All registered providers
    pub fn all() -> &'static [ProviderId] {
        &[
            ProviderId::Replicate,
            ProviderId::Fal,
            ProviderId::Together,
            ProviderId::Bfl,
        ]
    }

    /// Stable lowercase name used in config files and env vars
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Replicate => "replicate",
            ProviderId::Fal => "fal",
            ProviderId::Together => "together",
            ProviderId::Bfl => "bfl",
        }
    }

    /// Default API base URL
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::Replicate => "https://api.replicate.com",
            ProviderId::Fal => "https://fal.run",
            ProviderId::Together => "https://api.together.xyz",
            ProviderId::Bfl => "https://api.bfl.ai",
        }
    }

    /// Default model identifier
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::Replicate => "black-forest-labs/flux-schnell",
            ProviderId::Fal => "fal-ai/flux/dev",
            ProviderId::Together => "black-forest-labs/FLUX.1-schnell",
            ProviderId::Bfl => "flux-pro-1.1",
        }
    }

    /// Retry/timeout/polling constants for this provider
    pub fn params(&self) -> ProviderParams {
        match self {
            ProviderId::Replicate => ProviderParams {
                max_retries: 3,
                timeout_secs: 60,
                poll_interval_ms: 2000,
                max_poll_attempts: 60,
            },
            ProviderId::Fal => ProviderParams {
                max_retries: 3,
                timeout_secs: 60,
                poll_interval_ms: 1000,
                max_poll_attempts: 60,
            },
            ProviderId::Together => ProviderParams {
                max_retries: 3,
                timeout_secs: 60,
                poll_interval_ms: 1000,
                max_poll_attempts: 30,
            },
            ProviderId::Bfl => ProviderParams {
                max_retries: 3,
                timeout_secs: 60,
                poll_interval_ms: 1500,
                max_poll_attempts: 80,
            },
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ClassifiedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "replicate" => Ok(ProviderId::Replicate),
            "fal" => Ok(ProviderId::Fal),
            "together" => Ok(ProviderId::Together),
            "bfl" => Ok(ProviderId::Bfl),
            other => Err(ClassifiedError::unknown_provider(other)),
        }
    }
}

/// Per-provider retry/timeout/polling constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderParams {
    /// Outer retry budget for a single generation call
    pub max_retries: u32,
    /// Hard wall-clock timeout for one HTTP call
    pub timeout_secs: u64,
    /// Sleep between poll iterations
    pub poll_interval_ms: u64,
    /// Poll budget for one submitted job
    pub max_poll_attempts: u32,
}

/// A resolved, validated-at-call-time provider configuration.
///
/// Resolved once per generation call, never persisted. The API key is a
/// secret: `Debug` redacts it so it cannot leak through logging.
#[derive(Clone)]
pub struct ProviderConfig {
    pub provider: ProviderId,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Validate the resolved configuration. Hard failure, no network call.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ClassifiedError::config_invalid(format!(
                "{} API key is missing. Set SLIDEFORGE_{}_API_KEY or add it to .slideforge/config.toml",
                self.provider,
                self.provider.as_str().to_uppercase(),
            )));
        }
        if self.api_key.chars().any(char::is_whitespace) {
            return Err(ClassifiedError::config_invalid(format!(
                "{} API key contains whitespace",
                self.provider
            )));
        }
        if self.model.trim().is_empty() {
            return Err(ClassifiedError::config_invalid(format!(
                "{} model is empty",
                self.provider
            )));
        }
        match self.provider {
            // Replicate and Together address models as "owner/name"
            ProviderId::Replicate | ProviderId::Together => {
                if !self.model.contains('/') {
                    return Err(ClassifiedError::config_invalid(format!(
                        "{} model '{}' must be of the form owner/name",
                        self.provider, self.model
                    )));
                }
            }
            // BFL models are bare endpoint names embedded in the URL path
            ProviderId::Bfl => {
                if self.model.contains('/') {
                    return Err(ClassifiedError::config_invalid(format!(
                        "bfl model '{}' must be a bare endpoint name like flux-pro-1.1",
                        self.model
                    )));
                }
            }
            ProviderId::Fal => {}
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClassifiedError::config_invalid(format!(
                "{} base URL '{}' is not an http(s) URL",
                self.provider, self.base_url
            )));
        }
        Ok(())
    }
}

/// Caller-supplied overrides for a single generation call. Any field set
/// here wins over process configuration.
#[derive(Debug, Clone, Default)]
pub struct ProviderOverrides {
    pub provider: Option<ProviderId>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Per-provider entry in a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderFileEntry {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Generation defaults section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationDefaults {
    #[serde(default)]
    pub default_provider: Option<String>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EngineConfigFile {
    #[serde(default)]
    providers: HashMap<String, ProviderFileEntry>,
    #[serde(default)]
    generation: GenerationDefaults,
}

/// Process configuration with env overrides applied
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    providers: HashMap<String, ProviderFileEntry>,
    default_provider: Option<String>,
}

impl EngineConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut file = EngineConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                merge_into(&mut file, Self::load_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".slideforge/config.toml");
        if local_path.exists() {
            merge_into(&mut file, Self::load_file(&local_path)?);
        }

        let mut config = EngineConfig {
            providers: file.providers,
            default_provider: file.generation.default_provider,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let file = Self::load_file(path)?;
        let mut config = EngineConfig {
            providers: file.providers,
            default_provider: file.generation.default_provider,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// An empty config (everything must come from overrides)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set a provider entry programmatically (for testing and embedding)
    pub fn set_provider(&mut self, provider: ProviderId, entry: ProviderFileEntry) {
        self.providers.insert(provider.as_str().to_string(), entry);
    }

    /// Set the default provider programmatically
    pub fn set_default_provider(&mut self, provider: ProviderId) {
        self.default_provider = Some(provider.as_str().to_string());
    }

    /// Whether a usable provider + key pair can be resolved without
    /// caller overrides
    pub fn is_configured(&self) -> bool {
        self.resolve(&ProviderOverrides::default())
            .map(|c| c.validate().is_ok())
            .unwrap_or(false)
    }

    /// Merge caller overrides over process configuration into a
    /// `ProviderConfig` ready for validation. Unknown provider names are a
    /// hard failure here, before any adapter is looked up.
    pub fn resolve(&self, overrides: &ProviderOverrides) -> Result<ProviderConfig> {
        let provider = match overrides.provider {
            Some(p) => p,
            None => {
                let name = self.default_provider.as_deref().ok_or_else(|| {
                    ClassifiedError::config_invalid(
                        "no provider selected: set SLIDEFORGE_IMAGE_PROVIDER or pass an override",
                    )
                })?;
                ProviderId::from_str(name)?
            }
        };

        let entry = self.providers.get(provider.as_str());

        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| entry.and_then(|e| e.api_key.clone()))
            .unwrap_or_default();

        let model = overrides
            .model
            .clone()
            .or_else(|| entry.and_then(|e| e.model.clone()))
            .unwrap_or_else(|| provider.default_model().to_string());

        let base_url = overrides
            .base_url
            .clone()
            .or_else(|| entry.and_then(|e| e.base_url.clone()))
            .unwrap_or_else(|| provider.default_base_url().to_string());

        Ok(ProviderConfig {
            provider,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".slideforge").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<EngineConfigFile> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClassifiedError::config_invalid(format!(
                "failed to read config {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClassifiedError::config_invalid(format!(
                "failed to parse config {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn apply_env_overrides(&mut self) {
        for provider in ProviderId::all() {
            let env_key = format!("SLIDEFORGE_{}_API_KEY", provider.as_str().to_uppercase());
            if let Ok(key) = std::env::var(&env_key) {
                let entry = self
                    .providers
                    .entry(provider.as_str().to_string())
                    .or_default();
                entry.api_key = Some(key);
            }
        }
        if let Ok(name) = std::env::var("SLIDEFORGE_IMAGE_PROVIDER") {
            self.default_provider = Some(name);
        }
    }
}

fn merge_into(base: &mut EngineConfigFile, overlay: EngineConfigFile) {
    for (name, provider) in overlay.providers {
        let entry = base.providers.entry(name).or_default();
        if provider.api_key.is_some() {
            entry.api_key = provider.api_key;
        }
        if provider.model.is_some() {
            entry.model = provider.model;
        }
        if provider.base_url.is_some() {
            entry.base_url = provider.base_url;
        }
    }
    if overlay.generation.default_provider.is_some() {
        base.generation.default_provider = overlay.generation.default_provider;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("slideforge_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn config_with_key(provider: ProviderId, key: &str) -> EngineConfig {
        let mut config = EngineConfig::empty();
        config.set_provider(
            provider,
            ProviderFileEntry {
                api_key: Some(key.to_string()),
                model: None,
                base_url: None,
            },
        );
        config.set_default_provider(provider);
        config
    }

    #[test]
    fn test_load_config_from_file() {
        std::env::remove_var("SLIDEFORGE_TOGETHER_API_KEY");
        std::env::remove_var("SLIDEFORGE_IMAGE_PROVIDER");

        let config_str = r#"
[providers.together]
api_key = "tk-test-123"
model = "black-forest-labs/FLUX.1-dev"

[providers.bfl]
api_key = "bfl-test"
base_url = "https://api.eu.bfl.ai"

[generation]
default_provider = "together"
"#;
        let path = temp_config(config_str);
        let config = EngineConfig::load_from_file(&path).unwrap();

        let resolved = config.resolve(&ProviderOverrides::default()).unwrap();
        assert_eq!(resolved.provider, ProviderId::Together);
        assert_eq!(resolved.api_key, "tk-test-123");
        assert_eq!(resolved.model, "black-forest-labs/FLUX.1-dev");

        let bfl = config
            .resolve(&ProviderOverrides {
                provider: Some(ProviderId::Bfl),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(bfl.base_url, "https://api.eu.bfl.ai");
        assert_eq!(bfl.model, "flux-pro-1.1");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_env_var_override() {
        let config_str = r#"
[providers.fal]
api_key = "file-key"

[generation]
default_provider = "fal"
"#;
        let path = temp_config(config_str);

        std::env::set_var("SLIDEFORGE_FAL_API_KEY", "env-key-override");
        let config = EngineConfig::load_from_file(&path).unwrap();
        let resolved = config.resolve(&ProviderOverrides::default()).unwrap();
        assert_eq!(resolved.api_key, "env-key-override");

        std::env::remove_var("SLIDEFORGE_FAL_API_KEY");
        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_caller_overrides_win() {
        let config = config_with_key(ProviderId::Replicate, "process-key");
        let resolved = config
            .resolve(&ProviderOverrides {
                provider: Some(ProviderId::Replicate),
                api_key: Some("caller-key".to_string()),
                model: Some("acme/custom-flux".to_string()),
                base_url: None,
            })
            .unwrap();
        assert_eq!(resolved.api_key, "caller-key");
        assert_eq!(resolved.model, "acme/custom-flux");
        assert_eq!(resolved.base_url, "https://api.replicate.com");
    }

    #[test]
    fn test_unknown_provider_is_hard_failure() {
        let mut config = EngineConfig::empty();
        config.default_provider = Some("dalle".to_string());
        let err = config.resolve(&ProviderOverrides::default()).unwrap_err();
        assert_eq!(err.code, slideforge_core::ErrorCode::UnknownProvider);
        assert!(!err.retryable);
    }

    #[test]
    fn test_no_provider_selected() {
        let config = EngineConfig::empty();
        let err = config.resolve(&ProviderOverrides::default()).unwrap_err();
        assert_eq!(err.code, slideforge_core::ErrorCode::ConfigInvalid);
    }

    #[test]
    fn test_validate_missing_key() {
        let config = ProviderConfig {
            provider: ProviderId::Fal,
            api_key: String::new(),
            model: "fal-ai/flux/dev".to_string(),
            base_url: "https://fal.run".to_string(),
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, slideforge_core::ErrorCode::ConfigInvalid);
        assert!(err.message.contains("SLIDEFORGE_FAL_API_KEY"));
    }

    #[test]
    fn test_validate_model_shape() {
        let bad_replicate = ProviderConfig {
            provider: ProviderId::Replicate,
            api_key: "r8_test".to_string(),
            model: "flux-schnell".to_string(),
            base_url: "https://api.replicate.com".to_string(),
        };
        assert!(bad_replicate.validate().is_err());

        let bad_bfl = ProviderConfig {
            provider: ProviderId::Bfl,
            api_key: "key".to_string(),
            model: "black-forest-labs/flux".to_string(),
            base_url: "https://api.bfl.ai".to_string(),
        };
        assert!(bad_bfl.validate().is_err());
    }

    #[test]
    fn test_validate_base_url_shape() {
        let config = ProviderConfig {
            provider: ProviderId::Together,
            api_key: "tk".to_string(),
            model: "owner/model".to_string(),
            base_url: "ftp://api.together.xyz".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig {
            provider: ProviderId::Bfl,
            api_key: "super-secret".to_string(),
            model: "flux-pro-1.1".to_string(),
            base_url: "https://api.bfl.ai".to_string(),
        };
        let text = format!("{:?}", config);
        assert!(!text.contains("super-secret"));
        assert!(text.contains("[redacted]"));
    }

    #[test]
    fn test_is_configured() {
        assert!(!EngineConfig::empty().is_configured());
        assert!(config_with_key(ProviderId::Together, "tk-x").is_configured());
    }

    #[test]
    fn test_params_table() {
        for provider in ProviderId::all() {
            let params = provider.params();
            assert!(params.max_retries >= 1);
            assert!(params.timeout_secs > 0);
            assert!(params.poll_interval_ms > 0);
            assert!(params.max_poll_attempts > 0);
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = config_with_key(ProviderId::Fal, "k");
        let resolved = config
            .resolve(&ProviderOverrides {
                base_url: Some("https://fal.run/".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(resolved.base_url, "https://fal.run");
    }
}
