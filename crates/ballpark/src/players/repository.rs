use chrono::{DateTime, Utc};

use super::domain::{NewPlayer, Player, PlayerId, PlayerSort};

/// Storage abstraction so the service can be exercised without a database.
pub trait PlayerRepository: Send + Sync {
    fn list(&self, sort: PlayerSort) -> Result<Vec<Player>, RepositoryError>;
    fn fetch(&self, id: PlayerId) -> Result<Option<Player>, RepositoryError>;
    fn update(&self, player: Player) -> Result<(), RepositoryError>;
    /// Drops every stored player and inserts `players` in one unit of work,
    /// stamping them with `now`. Returns the number inserted.
    fn replace_all(
        &self,
        players: Vec<NewPlayer>,
        now: DateTime<Utc>,
    ) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
