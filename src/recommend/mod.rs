//! Recommendation providers: the capability boundary to the hosted
//! generative-text service that turns a BMI value into free-text
//! exercise/diet advice.

mod canned;
mod gemini;
mod openai;

pub use canned::CannedRecommender;
pub use gemini::GeminiRecommender;
pub use openai::OpenAiRecommender;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::{CoachError, Result};

/// Wire contract at the provider boundary: one numeric BMI in, one free-text
/// recommendation block out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub bmi: f64,
}

/// Successful responses always carry non-empty recommendation text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: String,
}

#[async_trait]
pub trait Recommender: Send + Sync {
    /// Fetch recommendation text for a BMI value. The text is returned
    /// verbatim, whitespace and newlines preserved.
    async fn recommend(&self, bmi: f64) -> Result<String>;
    fn name(&self) -> &'static str;
}

// Shared helpers for the HTTP providers.

pub(crate) async fn backoff(attempt: u32) {
    let delay_ms = 200u64 * (1u64 << attempt);
    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
}

pub(crate) fn non_empty(text: String, provider: &str) -> Result<String> {
    if text.trim().is_empty() {
        Err(CoachError::Recommendation {
            message: format!("empty {provider} response: no recommendation text returned"),
        })
    } else {
        Ok(text)
    }
}

pub(crate) fn truncate_snippet(input: &str, max: usize) -> String {
    let mut out = String::new();
    for (idx, ch) in input.chars().enumerate() {
        if idx >= max {
            out.push_str("...");
            break;
        }
        out.push(ch);
    }
    out
}

/// Factory function to create a recommender based on configuration.
///
/// Selection order:
/// 1) Respect an explicit provider choice from config/env
/// 2) Else prefer Gemini if its key is set
/// 3) Else use OpenAI if its key is set
/// 4) Else fall back to the deterministic canned provider, unless strict
///    mode demands real credentials
pub fn create_recommender(config: &Config) -> Result<Arc<dyn Recommender>> {
    let provider = config.provider.provider.as_str();

    let is_placeholder = |s: &str| {
        let t = s.trim();
        t.is_empty()
            || t.contains("${")
            || t.eq_ignore_ascii_case("your-api-key-here")
            || t.eq_ignore_ascii_case("changeme")
    };

    match provider {
        "gemini" => {
            let key = config.runtime.gemini_api_key.clone().unwrap_or_default();
            if is_placeholder(&key) {
                return Err(CoachError::Config {
                    message: "provider is 'gemini' but GEMINI_API_KEY is not set".to_string(),
                });
            }
            info!(model = %config.provider.resolved_model("gemini"), "Using Gemini recommendations");
            Ok(Arc::new(GeminiRecommender::new(key, config)?))
        }
        "openai" => {
            let key = config.runtime.openai_api_key.clone().unwrap_or_default();
            if is_placeholder(&key) {
                return Err(CoachError::Config {
                    message: "provider is 'openai' but OPENAI_API_KEY is not set".to_string(),
                });
            }
            info!(model = %config.provider.resolved_model("openai"), "Using OpenAI recommendations");
            Ok(Arc::new(OpenAiRecommender::new(key, config)?))
        }
        "canned" => {
            info!("Using CannedRecommender (deterministic)");
            Ok(Arc::new(CannedRecommender::new()))
        }
        "" | "auto" => {
            let gemini_key = config.runtime.gemini_api_key.as_deref();
            if let Some(key) = gemini_key.filter(|k| !is_placeholder(k)) {
                info!(model = %config.provider.resolved_model("gemini"), "Using Gemini recommendations");
                return Ok(Arc::new(GeminiRecommender::new(key.to_string(), config)?));
            }
            let openai_key = config.runtime.openai_api_key.as_deref();
            if let Some(key) = openai_key.filter(|k| !is_placeholder(k)) {
                info!(model = %config.provider.resolved_model("openai"), "Using OpenAI recommendations");
                return Ok(Arc::new(OpenAiRecommender::new(key.to_string(), config)?));
            }
            if config.runtime.strict_provider {
                return Err(CoachError::Config {
                    message:
                        "no recommendation provider configured; set GEMINI_API_KEY or OPENAI_API_KEY (or BMI_PROVIDER)"
                            .to_string(),
                });
            }
            info!("Using CannedRecommender (deterministic); no provider credentials found");
            Ok(Arc::new(CannedRecommender::new()))
        }
        other => Err(CoachError::Config {
            message: format!("unknown recommendation provider '{other}'"),
        }),
    }
}
