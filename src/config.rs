//! Configuration loaded from bmi_coach.toml and environment variables.

use serde::{Deserialize, Serialize};

use crate::error::{CoachError, Result};

/// Main configuration structure. File values are overlaid with environment
/// variables; provider credentials come only from the environment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

/// Recommendation provider settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// "gemini", "openai", "canned", or empty/"auto" for key-based detection
    pub provider: String,
    /// Empty selects the provider's default model
    pub model: String,
    pub timeout_ms: u64,
    pub retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: String::new(),
            model: String::new(),
            timeout_ms: 20_000,
            retries: 3,
        }
    }
}

impl ProviderConfig {
    /// Configured model, or the named provider's default.
    pub fn resolved_model(&self, provider: &str) -> String {
        if !self.model.trim().is_empty() {
            return self.model.clone();
        }
        match provider {
            "openai" => "gpt-4o-mini".to_string(),
            _ => "gemini-2.0-flash".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Refuse to start without real provider credentials
    pub strict_provider: bool,
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        let is_true = |s: &str| s == "1" || s.eq_ignore_ascii_case("true");
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            strict_provider: std::env::var("BMI_PROVIDER_STRICT").is_ok_and(|v| is_true(&v)),
        }
    }
}

impl Config {
    /// Load from the optional TOML file (BMI_COACH_CONFIG or
    /// ./bmi_coach.toml), overlay environment variables, then validate.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("BMI_COACH_CONFIG").unwrap_or_else(|_| "bmi_coach.toml".to_string());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                toml::from_str::<Config>(&contents).map_err(|e| CoachError::Config {
                    message: format!("failed to parse {path}: {e}"),
                })?
            }
            Err(_) => Config::default(),
        };

        config.runtime = RuntimeConfig::load_from_env();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("BMI_PROVIDER") {
            self.provider.provider = provider;
        }
        if let Ok(model) = std::env::var("BMI_MODEL") {
            self.provider.model = model;
        }
        if let Some(timeout_ms) = std::env::var("BMI_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.provider.timeout_ms = timeout_ms;
        }
        if let Some(retries) = std::env::var("BMI_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.provider.retries = retries;
        }
        if let Ok(bind) = std::env::var("BMI_HTTP_BIND") {
            self.server.bind = bind;
        }
    }

    fn validate(&mut self) -> Result<()> {
        match self.provider.provider.as_str() {
            "" | "auto" | "gemini" | "openai" | "canned" => {}
            other => {
                return Err(CoachError::Config {
                    message: format!("unknown recommendation provider '{other}'"),
                });
            }
        }

        if self.provider.retries == 0 {
            self.provider.retries = 1;
        } else if self.provider.retries > 5 {
            tracing::warn!(
                "retries {} exceeds max 5, clamping to 5",
                self.provider.retries
            );
            self.provider.retries = 5;
        }

        if self.provider.timeout_ms < 1_000 {
            tracing::warn!(
                "timeout_ms {} below minimum 1000, clamping",
                self.provider.timeout_ms
            );
            self.provider.timeout_ms = 1_000;
        }

        self.server
            .bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| CoachError::Config {
                message: format!("invalid bind address '{}': {e}", self.server.bind),
            })?;

        Ok(())
    }
}
