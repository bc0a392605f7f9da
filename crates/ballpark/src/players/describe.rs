use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::Player;
use crate::config::DescriptionConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Produces free-text player descriptions.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn describe(&self, player: &Player) -> Result<String, DescribeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DescribeError {
    #[error("Gemini API key not configured")]
    NotConfigured,
    #[error("description service unreachable: {0}")]
    Transport(String),
    #[error("description service answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("description service returned no text")]
    EmptyResponse,
}

/// Builds the commentator-style prompt sent to the model.
pub fn description_prompt(player: &Player) -> String {
    let stats = &player.stats;
    let position = player.position.as_deref().unwrap_or("unknown");
    let batting_average = format_rate(stats.batting_average);
    let ops = format_rate(stats.on_base_plus_slugging);

    format!(
        "Write a brief, engaging description of baseball player {name}.\n\
         Include their position ({position}) and key statistics:\n\
         - Games: {games}\n\
         - Hits: {hits}\n\
         - Home Runs: {home_runs}\n\
         - Batting Average: {batting_average}\n\
         - RBI: {rbi}\n\
         - Runs: {runs}\n\
         - Stolen Bases: {stolen_bases}\n\
         - OPS: {ops}\n\n\
         Make it sound like a sports commentator describing the player. Keep it under 150 words.",
        name = player.name,
        games = stats.games,
        hits = stats.hits,
        home_runs = stats.home_runs,
        rbi = stats.rbi,
        runs = stats.runs,
        stolen_bases = stats.stolen_bases,
    )
}

fn format_rate(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |rate| format!("{rate:.3}"))
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiDescriber {
    client: reqwest::Client,
    config: DescriptionConfig,
}

impl GeminiDescriber {
    pub fn new(config: DescriptionConfig) -> Result<Self, DescribeError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| DescribeError::Transport(err.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl std::fmt::Debug for GeminiDescriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiDescriber")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DescriptionGenerator for GeminiDescriber {
    async fn describe(&self, player: &Player) -> Result<String, DescribeError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(DescribeError::NotConfigured)?;

        let prompt = description_prompt(player);
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
        };

        tracing::debug!(player_id = %player.id, model = %self.config.model, "requesting player description");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|err| DescribeError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DescribeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|err| DescribeError::Transport(err.to_string()))?;

        payload.first_text().ok_or(DescribeError::EmptyResponse)
    }
}
