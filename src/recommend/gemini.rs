use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::error::{CoachError, Result};
use crate::prompts::recommendation_prompt;
use crate::recommend::{RecommendationResponse, Recommender, backoff, non_empty, truncate_snippet};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

// Generative Language API response shape, pared down to the fields we read.
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: String,
}

/// Gemini API implementation. The model is constrained to a JSON response
/// matching the `{recommendations}` schema, so the reply parses directly
/// into the wire contract.
pub struct GeminiRecommender {
    client: reqwest::Client,
    api_key: String,
    model: String,
    retries: u32,
}

impl GeminiRecommender {
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
            model: config.provider.resolved_model("gemini"),
            retries: config.provider.retries,
        })
    }

    fn extract(&self, parsed: GenerateContentResponse) -> Result<String> {
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .ok_or_else(|| CoachError::Recommendation {
                message: "no candidates in Gemini response".to_string(),
            })?;

        let response: RecommendationResponse =
            serde_json::from_str(&text).map_err(|e| CoachError::Recommendation {
                message: format!(
                    "Gemini reply is not a recommendations object: {e}; got: {}",
                    truncate_snippet(&text, 200)
                ),
            })?;
        non_empty(response.recommendations, "Gemini")
    }
}

#[async_trait]
impl Recommender for GeminiRecommender {
    async fn recommend(&self, bmi: f64) -> Result<String> {
        debug!(model = %self.model, bmi, "requesting Gemini recommendations");

        let url = format!("{API_BASE}/{}:generateContent", self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": recommendation_prompt(bmi) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "recommendations": { "type": "STRING" }
                    },
                    "required": ["recommendations"]
                }
            }
        });

        // Retry with simple exponential backoff
        let mut last_err: Option<CoachError> = None;
        for i in 0..self.retries {
            let send_res = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
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
                        "Gemini API error {}: {}",
                        status,
                        truncate_snippet(&error_text, 200)
                    ),
                });
                backoff(i).await;
                continue;
            }

            match response.json::<GenerateContentResponse>().await {
                Ok(parsed) => match self.extract(parsed) {
                    Ok(text) => return Ok(text),
                    Err(e) => {
                        last_err = Some(e);
                        backoff(i).await;
                    }
                },
                Err(e) => {
                    last_err = Some(CoachError::Recommendation {
                        message: format!("failed to parse Gemini response: {e}"),
                    });
                    backoff(i).await;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| CoachError::Recommendation {
            message: "Gemini recommendation request failed".to_string(),
        }))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
