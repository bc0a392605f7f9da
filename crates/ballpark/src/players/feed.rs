//! Client for the third-party player statistics feed.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::FeedConfig;

const USER_AGENT: &str = concat!("ballpark/", env!("CARGO_PKG_VERSION"));

/// One player object as published by the feed. Key names are the feed's own.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedRecord {
    #[serde(rename = "Player name", default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(rename = "position", default, deserialize_with = "lenient_text")]
    pub position: Option<String>,
    #[serde(rename = "Games", default, deserialize_with = "lenient_count")]
    pub games: u32,
    #[serde(rename = "At-bat", default, deserialize_with = "lenient_count")]
    pub at_bat: u32,
    #[serde(rename = "Runs", default, deserialize_with = "lenient_count")]
    pub runs: u32,
    #[serde(rename = "Hits", default, deserialize_with = "lenient_count")]
    pub hits: u32,
    #[serde(rename = "Double (2B)", default, deserialize_with = "lenient_count")]
    pub double_2b: u32,
    #[serde(rename = "third baseman", default, deserialize_with = "lenient_count")]
    pub third_baseman: u32,
    #[serde(rename = "home run", default, deserialize_with = "lenient_count")]
    pub home_runs: u32,
    #[serde(rename = "run batted in", default, deserialize_with = "lenient_count")]
    pub rbi: u32,
    #[serde(rename = "a walk", default, deserialize_with = "lenient_count")]
    pub walks: u32,
    #[serde(rename = "Strikeouts", default, deserialize_with = "lenient_count")]
    pub strikeouts: u32,
    #[serde(rename = "stolen base", default, deserialize_with = "lenient_count")]
    pub stolen_bases: u32,
    #[serde(rename = "Caught stealing", default, deserialize_with = "lenient_count")]
    pub caught_stealing: u32,
    #[serde(rename = "AVG", default, deserialize_with = "lenient_rate")]
    pub batting_average: Option<f64>,
    #[serde(rename = "On-base Percentage", default, deserialize_with = "lenient_rate")]
    pub on_base_percentage: Option<f64>,
    #[serde(rename = "Slugging Percentage", default, deserialize_with = "lenient_rate")]
    pub slugging_percentage: Option<f64>,
    #[serde(rename = "On-base Plus Slugging", default, deserialize_with = "lenient_rate")]
    pub on_base_plus_slugging: Option<f64>,
}

/// Source of raw player records.
#[async_trait]
pub trait StatsFeed: Send + Sync {
    async fn fetch_players(&self) -> Result<Vec<FeedRecord>, FeedError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("stats feed unreachable: {0}")]
    Transport(String),
    #[error("stats feed answered with status {0}")]
    Status(u16),
    #[error("stats feed returned malformed data: {0}")]
    Decode(String),
}

/// HTTP implementation backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpStatsFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpStatsFeed {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        Self::with_timeout(config.url.clone(), config.timeout)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| FeedError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StatsFeed for HttpStatsFeed {
    async fn fetch_players(&self) -> Result<Vec<FeedRecord>, FeedError> {
        tracing::debug!(url = %self.url, "requesting player feed");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| FeedError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FeedError::Transport(err.to_string()))?;
        let records = parse_records(&body)?;

        tracing::info!(url = %self.url, count = records.len(), "retrieved players from feed");
        Ok(records)
    }
}

/// Decodes a feed payload: a JSON array of player objects.
pub fn parse_records(body: &[u8]) -> Result<Vec<FeedRecord>, FeedError> {
    serde_json::from_slice(body).map_err(|err| FeedError::Decode(err.to_string()))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Counts arrive as numbers, numeric strings, or the `"--"` placeholder for
/// "not recorded". Anything that is not a non-negative whole number is zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let count = match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|v| v.fract() == 0.0 && *v >= 0.0).map(|v| v as u64)),
        Some(Value::String(text)) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(count.and_then(|v| u32::try_from(v).ok()).unwrap_or(0))
}

fn lenient_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let rate = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(rate.filter(|v| v.is_finite()))
}
