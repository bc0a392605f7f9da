use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::players::describe::{DescribeError, DescriptionGenerator};
use crate::players::domain::{NewPlayer, Player, PlayerId, PlayerSort, SortKey, SortOrder};
use crate::players::feed::{FeedError, FeedRecord, StatsFeed};
use crate::players::repository::{PlayerRepository, RepositoryError};
use crate::players::{player_router, PlayerService};

#[derive(Default)]
pub(super) struct MemoryRepository {
    players: Mutex<BTreeMap<PlayerId, Player>>,
    next_id: AtomicUsize,
}

impl MemoryRepository {
    pub(super) fn snapshot(&self) -> Vec<Player> {
        self.players
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl PlayerRepository for MemoryRepository {
    fn list(&self, sort: PlayerSort) -> Result<Vec<Player>, RepositoryError> {
        let mut players = self.snapshot();
        players.sort_by(|a, b| {
            let ordering = match sort.key {
                SortKey::Hits => a.stats.hits.cmp(&b.stats.hits),
                SortKey::HomeRuns => a.stats.home_runs.cmp(&b.stats.home_runs),
                SortKey::Name => a.name.cmp(&b.name),
                SortKey::BattingAverage => a
                    .stats
                    .batting_average
                    .partial_cmp(&b.stats.batting_average)
                    .unwrap_or(CmpOrdering::Equal),
            };
            let ordering = match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then(a.id.cmp(&b.id))
        });
        Ok(players)
    }

    fn fetch(&self, id: PlayerId) -> Result<Option<Player>, RepositoryError> {
        let guard = self.players.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn update(&self, player: Player) -> Result<(), RepositoryError> {
        let mut guard = self.players.lock().expect("repository mutex poisoned");
        match guard.get_mut(&player.id) {
            Some(slot) => {
                *slot = player;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn replace_all(
        &self,
        players: Vec<NewPlayer>,
        now: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let mut guard = self.players.lock().expect("repository mutex poisoned");
        guard.clear();
        for player in players {
            let id = PlayerId(self.next_id.fetch_add(1, Ordering::Relaxed) as i64 + 1);
            guard.insert(
                id,
                Player {
                    id,
                    name: player.name,
                    position: player.position,
                    stats: player.stats,
                    description: None,
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        Ok(guard.len())
    }
}

pub(super) struct UnavailableRepository;

impl PlayerRepository for UnavailableRepository {
    fn list(&self, _sort: PlayerSort) -> Result<Vec<Player>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: PlayerId) -> Result<Option<Player>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _player: Player) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace_all(
        &self,
        _players: Vec<NewPlayer>,
        _now: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct StubFeed {
    records: Vec<FeedRecord>,
    unavailable: bool,
}

impl StubFeed {
    pub(super) fn with_records(records: Vec<FeedRecord>) -> Self {
        Self {
            records,
            unavailable: false,
        }
    }

    pub(super) fn unavailable() -> Self {
        Self {
            records: Vec::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl StatsFeed for StubFeed {
    async fn fetch_players(&self) -> Result<Vec<FeedRecord>, FeedError> {
        if self.unavailable {
            return Err(FeedError::Status(503));
        }
        Ok(self.records.clone())
    }
}

#[derive(Default)]
pub(super) struct StubDescriber {
    calls: AtomicUsize,
    unconfigured: bool,
}

impl StubDescriber {
    pub(super) fn unconfigured() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            unconfigured: true,
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DescriptionGenerator for StubDescriber {
    async fn describe(&self, player: &Player) -> Result<String, DescribeError> {
        if self.unconfigured {
            return Err(DescribeError::NotConfigured);
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{} takes the field (take {call}).", player.name))
    }
}

pub(super) type MemoryService = PlayerService<MemoryRepository, StubFeed, StubDescriber>;

pub(super) fn feed_record(name: &str, position: &str, hits: u32, home_runs: u32) -> FeedRecord {
    FeedRecord {
        name: Some(name.to_string()),
        position: Some(position.to_string()),
        games: 100,
        hits,
        home_runs,
        batting_average: Some(f64::from(hits) / 400.0),
        ..FeedRecord::default()
    }
}

pub(super) fn feed_records() -> Vec<FeedRecord> {
    vec![
        feed_record("C Beltr?", "CF", 150, 12),
        feed_record("E Encarnaci?n", "DH", 140, 40),
        feed_record("J B?ez", "SS", 160, 25),
        feed_record("M San?", "3B", 90, 28),
        feed_record("Q Xy?z", "LF", 120, 5),
    ]
}

pub(super) struct Harness {
    pub(super) repository: Arc<MemoryRepository>,
    pub(super) describer: Arc<StubDescriber>,
    pub(super) service: Arc<MemoryService>,
}

pub(super) fn harness_with(feed: StubFeed, describer: StubDescriber) -> Harness {
    let repository = Arc::new(MemoryRepository::default());
    let describer = Arc::new(describer);
    let service = Arc::new(PlayerService::new(
        repository.clone(),
        Arc::new(feed),
        describer.clone(),
    ));
    Harness {
        repository,
        describer,
        service,
    }
}

pub(super) fn harness() -> Harness {
    harness_with(
        StubFeed::with_records(feed_records()),
        StubDescriber::default(),
    )
}

pub(super) async fn seeded_harness() -> Harness {
    let harness = harness();
    harness.service.seed().await.expect("seed succeeds");
    harness
}

pub(super) fn id_of(repository: &MemoryRepository, name: &str) -> PlayerId {
    repository
        .snapshot()
        .into_iter()
        .find(|player| player.name == name)
        .map(|player| player.id)
        .expect("player present")
}

pub(super) fn router_for(harness: &Harness) -> axum::Router {
    player_router(harness.service.clone())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
