//! Player statistics: storage, feed ingestion, descriptions, and the HTTP API.

pub mod describe;
pub mod domain;
pub mod feed;
mod ingest;
pub mod repository;
pub mod router;
pub mod service;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use describe::{description_prompt, DescribeError, DescriptionGenerator, GeminiDescriber};
pub use domain::{
    BattingStats, NewPlayer, Player, PlayerId, PlayerSort, PlayerUpdate, PlayerView, SortKey,
    SortOrder, UpdateError,
};
pub use feed::{parse_records, FeedError, FeedRecord, HttpStatsFeed, StatsFeed};
pub use ingest::IngestedPlayer;
pub use repository::{PlayerRepository, RepositoryError};
pub use router::{player_router, ApiError};
pub use service::{NameRepair, PlayerService, PlayerServiceError, RepairSummary, SeedSummary};
pub use sqlite::SqlitePlayerRepository;
