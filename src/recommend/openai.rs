use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::error::{CoachError, Result};
use crate::prompts::recommendation_prompt;
use crate::recommend::{RecommendationResponse, Recommender, backoff, non_empty, truncate_snippet};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_INSTRUCTION: &str = "Respond with a JSON object containing a single non-empty string field \"recommendations\".";

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// OpenAI chat-completions implementation, constrained to a JSON object
/// reply carrying the same `{recommendations}` schema as the Gemini path.
pub struct OpenAiRecommender {
    client: reqwest::Client,
    api_key: String,
    model: String,
    retries: u32,
}

impl OpenAiRecommender {
    pub fn new(api_key: String, config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.provider.timeout_ms))
            .build()
            .map_err(|e| CoachError::Config {
                message: format!("failed to build HTTP client with timeout: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            model: config.provider.resolved_model("openai"),
            retries: config.provider.retries,
        })
    }

    fn extract(&self, parsed: ChatResponse) -> Result<String> {
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CoachError::Recommendation {
                message: "no choices in OpenAI response".to_string(),
            })?;

        let response: RecommendationResponse =
            serde_json::from_str(&content).map_err(|e| CoachError::Recommendation {
                message: format!(
                    "OpenAI reply is not a recommendations object: {e}; got: {}",
                    truncate_snippet(&content, 200)
                ),
            })?;
        non_empty(response.recommendations, "OpenAI")
    }
}

#[async_trait]
impl Recommender for OpenAiRecommender {
    async fn recommend(&self, bmi: f64) -> Result<String> {
        debug!(model = %self.model, bmi, "requesting OpenAI recommendations");

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": recommendation_prompt(bmi) }
            ],
            "response_format": { "type": "json_object" }
        });

        let mut last_err: Option<CoachError> = None;
        for i in 0..self.retries {
            let send_res = self
                .client
                .post(API_URL)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;
            let response = match send_res {
                Ok(resp) => resp,
                Err(e) => {
                    last_err = Some(e.into());
                    backoff(i).await;
                    continue;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                last_err = Some(CoachError::Recommendation {
                    message: format!(
                        "OpenAI API error {}: {}",
                        status,
                        truncate_snippet(&error_text, 200)
                    ),
                });
                backoff(i).await;
                continue;
            }

            match response.json::<ChatResponse>().await {
                Ok(parsed) => match self.extract(parsed) {
                    Ok(text) => return Ok(text),
                    Err(e) => {
                        last_err = Some(e);
                        backoff(i).await;
                    }
                },
                Err(e) => {
                    last_err = Some(CoachError::Recommendation {
                        message: format!("failed to parse OpenAI response: {e}"),
                    });
                    backoff(i).await;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| CoachError::Recommendation {
            message: "OpenAI recommendation request failed".to_string(),
        }))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn recommender() -> OpenAiRecommender {
        OpenAiRecommender::new("test-key".to_string(), &Config::default()).unwrap()
    }

    #[test]
    fn extract_reads_json_object_reply() {
        let parsed: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": { "content": "{\"recommendations\":\"Walk daily.\"}" }
            }]
        }))
        .unwrap();
        assert_eq!(recommender().extract(parsed).unwrap(), "Walk daily.");
    }

    #[test]
    fn extract_rejects_missing_choices() {
        let parsed: ChatResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(
            recommender().extract(parsed),
            Err(CoachError::Recommendation { .. })
        ));
    }
}
