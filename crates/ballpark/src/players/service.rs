use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::describe::{DescribeError, DescriptionGenerator};
use super::domain::{Player, PlayerId, PlayerSort, PlayerUpdate, UpdateError};
use super::feed::{FeedError, StatsFeed};
use super::repository::{PlayerRepository, RepositoryError};
use crate::text::TextNormalizer;

/// Service composing storage, the upstream feed, and the description model.
pub struct PlayerService<R, F, D> {
    repository: Arc<R>,
    feed: Arc<F>,
    describer: Arc<D>,
    normalizer: &'static TextNormalizer,
}

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub seeded: usize,
    /// Feed records dropped because they carried no usable name.
    pub skipped: usize,
    /// Name or position fields stored with a guessed letter.
    pub guessed_fields: usize,
}

/// A row rewritten by [`PlayerService::repair_names`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameRepair {
    pub id: PlayerId,
    pub before: String,
    pub after: String,
    pub position_before: Option<String>,
    pub position_after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    pub examined: usize,
    pub repairs: Vec<NameRepair>,
}

impl RepairSummary {
    pub fn updated(&self) -> usize {
        self.repairs.len()
    }
}

impl<R, F, D> PlayerService<R, F, D>
where
    R: PlayerRepository + 'static,
    F: StatsFeed + 'static,
    D: DescriptionGenerator + 'static,
{
    pub fn new(repository: Arc<R>, feed: Arc<F>, describer: Arc<D>) -> Self {
        Self::with_normalizer(repository, feed, describer, TextNormalizer::standard())
    }

    pub fn with_normalizer(
        repository: Arc<R>,
        feed: Arc<F>,
        describer: Arc<D>,
        normalizer: &'static TextNormalizer,
    ) -> Self {
        Self {
            repository,
            feed,
            describer,
            normalizer,
        }
    }

    pub fn list(&self, sort: PlayerSort) -> Result<Vec<Player>, PlayerServiceError> {
        Ok(self.repository.list(sort)?)
    }

    pub fn get(&self, id: PlayerId) -> Result<Player, PlayerServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(PlayerServiceError::NotFound(id))
    }

    /// Apply a partial update and persist it.
    pub fn update(&self, id: PlayerId, update: PlayerUpdate) -> Result<Player, PlayerServiceError> {
        let mut player = self.get(id)?;
        update.apply(&mut player, self.normalizer)?;
        player.updated_at = Utc::now();

        self.repository.update(player.clone()).map_err(|err| match err {
            RepositoryError::NotFound => PlayerServiceError::NotFound(id),
            other => other.into(),
        })?;
        Ok(player)
    }

    /// Replace the stored players with a fresh copy of the feed.
    pub async fn seed(&self) -> Result<SeedSummary, PlayerServiceError> {
        let records = self.feed.fetch_players().await?;

        let received = records.len();
        let mut guessed_fields = 0;
        let players = records
            .into_iter()
            .filter_map(|record| record.into_new_player(self.normalizer))
            .map(|ingested| {
                guessed_fields += ingested.guessed_fields.len();
                ingested.player
            })
            .collect::<Vec<_>>();
        let skipped = received - players.len();

        let now = Utc::now();
        let seeded = self
            .with_repository(move |repository| repository.replace_all(players, now))
            .await?;
        info!(seeded, skipped, guessed_fields, "seeded player table from feed");

        Ok(SeedSummary {
            seeded,
            skipped,
            guessed_fields,
        })
    }

    /// Return the player's description, generating and caching it when none
    /// is stored yet or when `refresh` is set.
    pub async fn describe(&self, id: PlayerId, refresh: bool) -> Result<Player, PlayerServiceError> {
        let mut player = self
            .with_repository(move |repository| repository.fetch(id))
            .await?
            .ok_or(PlayerServiceError::NotFound(id))?;
        if !refresh && player.description.is_some() {
            return Ok(player);
        }

        let description = self.describer.describe(&player).await?;
        player.description = Some(description);
        player.updated_at = Utc::now();
        let stored = player.clone();
        self.with_repository(move |repository| repository.update(stored))
            .await?;

        info!(player_id = %id, "stored generated description");
        Ok(player)
    }

    /// Runs a repository call on the blocking pool; the repository API is
    /// synchronous and may touch disk.
    async fn with_repository<T, Op>(&self, operation: Op) -> Result<T, PlayerServiceError>
    where
        T: Send + 'static,
        Op: FnOnce(&R) -> Result<T, RepositoryError> + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        let outcome = tokio::task::spawn_blocking(move || operation(&repository))
            .await
            .map_err(|err| RepositoryError::Unavailable(format!("storage task failed: {err}")))?;
        Ok(outcome?)
    }

    /// Re-run the normalizer over stored names and positions, saving only the
    /// rows that change. A row whose name would normalize to nothing is left
    /// as it is.
    pub fn repair_names(&self) -> Result<RepairSummary, PlayerServiceError> {
        let players = self.repository.list(PlayerSort::default())?;
        let examined = players.len();
        let mut repairs = Vec::new();

        for mut player in players {
            let name = self.normalizer.normalize(player.name.trim());
            if name.text.trim().is_empty() {
                warn!(player_id = %player.id, stored = %player.name, "name has no ASCII spelling; row left unchanged");
                continue;
            }
            let position = self
                .normalizer
                .normalize_optional(player.position.as_deref().map(str::trim))
                .filter(|position| !position.text.is_empty());

            let name_changed = name.text != player.name;
            let position_changed =
                position.as_ref().map(|p| p.text.as_str()) != player.position.as_deref();
            if !name_changed && !position_changed {
                continue;
            }

            if name.has_guesses() {
                warn!(player_id = %player.id, stored = %name.text, "name repair relied on a guess");
            }
            if let Some(position) = position.as_ref().filter(|p| p.has_guesses()) {
                warn!(player_id = %player.id, stored = %position.text, "position repair relied on a guess");
            }

            let before = player.name.clone();
            let position_before = player.position.clone();
            player.name = name.text;
            player.position = position.map(|p| p.text);
            player.updated_at = Utc::now();
            self.repository.update(player.clone())?;

            repairs.push(NameRepair {
                id: player.id,
                before,
                after: player.name,
                position_before,
                position_after: player.position,
            });
        }

        info!(examined, updated = repairs.len(), "repaired stored player names");
        Ok(RepairSummary { examined, repairs })
    }
}

/// Error raised by the player service.
#[derive(Debug, thiserror::Error)]
pub enum PlayerServiceError {
    #[error("player {0} not found")]
    NotFound(PlayerId),
    #[error(transparent)]
    Validation(#[from] UpdateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Describe(#[from] DescribeError),
}
