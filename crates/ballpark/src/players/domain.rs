use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::TextNormalizer;

/// Database identifier for a stored player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Season batting line. Counting stats default to zero; rate stats are absent
/// when the feed did not report them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingStats {
    pub games: u32,
    pub at_bat: u32,
    pub runs: u32,
    pub hits: u32,
    pub double_2b: u32,
    pub third_baseman: u32,
    pub home_runs: u32,
    pub rbi: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub stolen_bases: u32,
    pub caught_stealing: u32,
    pub batting_average: Option<f64>,
    pub on_base_percentage: Option<f64>,
    pub slugging_percentage: Option<f64>,
    pub on_base_plus_slugging: Option<f64>,
}

impl BattingStats {
    /// Hits per game rounded to three decimals; zero when no games were played.
    pub fn hits_per_game(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let ratio = f64::from(self.hits) / f64::from(self.games);
        (ratio * 1000.0).round() / 1000.0
    }
}

/// A player ready to be inserted, before the database assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlayer {
    pub name: String,
    pub position: Option<String>,
    pub stats: BattingStats,
}

/// Stored player row.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Option<String>,
    pub stats: BattingStats,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            position: self.position.clone(),
            stats: self.stats.clone(),
            hits_per_game: self.stats.hits_per_game(),
            description: self.description.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}

/// JSON representation served by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub position: Option<String>,
    #[serde(flatten)]
    pub stats: BattingStats,
    pub hits_per_game: f64,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update; only the fields present in the request change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub position: Option<String>,
    pub games: Option<u32>,
    pub at_bat: Option<u32>,
    pub runs: Option<u32>,
    pub hits: Option<u32>,
    pub double_2b: Option<u32>,
    pub third_baseman: Option<u32>,
    pub home_runs: Option<u32>,
    pub rbi: Option<u32>,
    pub walks: Option<u32>,
    pub strikeouts: Option<u32>,
    pub stolen_bases: Option<u32>,
    pub caught_stealing: Option<u32>,
    pub batting_average: Option<f64>,
    pub on_base_percentage: Option<f64>,
    pub slugging_percentage: Option<f64>,
    pub on_base_plus_slugging: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpdateError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("{field} must be a finite, non-negative number")]
    InvalidRate { field: &'static str },
}

impl PlayerUpdate {
    /// Applies the update to `player`. Name and position go through the same
    /// normalizer as feed data so stored text stays ASCII. Nothing is written
    /// when validation fails.
    pub fn apply(self, player: &mut Player, normalizer: &TextNormalizer) -> Result<(), UpdateError> {
        let name = match self.name {
            Some(raw) => {
                let name = normalizer.normalize(raw.trim()).text;
                if name.trim().is_empty() {
                    return Err(UpdateError::EmptyName);
                }
                Some(name)
            }
            None => None,
        };

        let rates = [
            ("batting_average", self.batting_average),
            ("on_base_percentage", self.on_base_percentage),
            ("slugging_percentage", self.slugging_percentage),
            ("on_base_plus_slugging", self.on_base_plus_slugging),
        ];
        for (field, value) in rates {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(UpdateError::InvalidRate { field });
                }
            }
        }

        if let Some(name) = name {
            player.name = name;
        }
        if let Some(position) = self.position {
            let position = normalizer.normalize(position.trim()).text;
            player.position = (!position.is_empty()).then_some(position);
        }

        let stats = &mut player.stats;
        let counts = [
            (&mut stats.games, self.games),
            (&mut stats.at_bat, self.at_bat),
            (&mut stats.runs, self.runs),
            (&mut stats.hits, self.hits),
            (&mut stats.double_2b, self.double_2b),
            (&mut stats.third_baseman, self.third_baseman),
            (&mut stats.home_runs, self.home_runs),
            (&mut stats.rbi, self.rbi),
            (&mut stats.walks, self.walks),
            (&mut stats.strikeouts, self.strikeouts),
            (&mut stats.stolen_bases, self.stolen_bases),
            (&mut stats.caught_stealing, self.caught_stealing),
        ];
        for (slot, value) in counts {
            if let Some(value) = value {
                *slot = value;
            }
        }

        if self.batting_average.is_some() {
            stats.batting_average = self.batting_average;
        }
        if self.on_base_percentage.is_some() {
            stats.on_base_percentage = self.on_base_percentage;
        }
        if self.slugging_percentage.is_some() {
            stats.slugging_percentage = self.slugging_percentage;
        }
        if self.on_base_plus_slugging.is_some() {
            stats.on_base_plus_slugging = self.on_base_plus_slugging;
        }

        Ok(())
    }
}

/// Column a listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Hits,
    HomeRuns,
    Name,
    BattingAverage,
}

impl SortKey {
    /// Unknown or missing keys fall back to hits.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("home_runs") => Self::HomeRuns,
            Some("name") => Self::Name,
            Some("batting_average") => Self::BattingAverage,
            _ => Self::Hits,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Hits => "hits",
            Self::HomeRuns => "home_runs",
            Self::Name => "name",
            Self::BattingAverage => "batting_average",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Unknown or missing orders fall back to descending.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerSort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl PlayerSort {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }
}
