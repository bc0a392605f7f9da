use super::common::*;
use crate::players::describe::DescribeError;
use crate::players::domain::{PlayerId, PlayerSort, PlayerUpdate, SortKey, SortOrder, UpdateError};
use crate::players::feed::{FeedError, FeedRecord};
use crate::players::repository::{PlayerRepository, RepositoryError};
use crate::players::{PlayerService, PlayerServiceError};
use std::sync::Arc;

#[tokio::test]
async fn seed_normalizes_names_and_counts_guesses() {
    let harness = harness();
    let summary = harness.service.seed().await.expect("seed succeeds");

    assert_eq!(summary.seeded, 5);
    assert_eq!(summary.guessed_fields, 1);

    let mut names: Vec<String> = harness
        .repository
        .snapshot()
        .into_iter()
        .map(|player| player.name)
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["C Beltran", "E Encarnacion", "J Baez", "M Sano", "Q Xyaz"]
    );
}

#[tokio::test]
async fn seed_replaces_previous_rows() {
    let harness = seeded_harness().await;
    harness.service.seed().await.expect("second seed succeeds");
    assert_eq!(harness.repository.snapshot().len(), 5);
}

#[tokio::test]
async fn seed_propagates_feed_failure_and_keeps_rows() {
    let harness = seeded_harness().await;
    let failing = PlayerService::new(
        harness.repository.clone(),
        Arc::new(StubFeed::unavailable()),
        harness.describer.clone(),
    );

    match failing.seed().await {
        Err(PlayerServiceError::Feed(FeedError::Status(503))) => {}
        other => panic!("expected feed failure, got {other:?}"),
    }
    assert_eq!(harness.repository.snapshot().len(), 5);
}

#[tokio::test]
async fn list_honors_sort_key_and_order() {
    let harness = seeded_harness().await;

    let by_hits = harness.service.list(PlayerSort::default()).expect("list");
    assert_eq!(by_hits[0].name, "J Baez");
    assert_eq!(by_hits[4].name, "M Sano");

    let by_home_runs = harness
        .service
        .list(PlayerSort::new(SortKey::HomeRuns, SortOrder::Desc))
        .expect("list");
    assert_eq!(by_home_runs[0].name, "E Encarnacion");

    let by_name = harness
        .service
        .list(PlayerSort::new(SortKey::Name, SortOrder::Asc))
        .expect("list");
    assert_eq!(by_name[0].name, "C Beltran");
    assert_eq!(by_name[4].name, "Q Xyaz");
}

#[tokio::test]
async fn update_changes_fields_and_bumps_timestamp() {
    let harness = seeded_harness().await;
    let id = id_of(&harness.repository, "J Baez");
    let before = harness.service.get(id).expect("player exists");

    let update = PlayerUpdate {
        home_runs: Some(31),
        position: Some("2B".to_string()),
        ..PlayerUpdate::default()
    };
    let updated = harness.service.update(id, update).expect("update succeeds");

    assert_eq!(updated.stats.home_runs, 31);
    assert_eq!(updated.position.as_deref(), Some("2B"));
    assert_eq!(updated.stats.hits, before.stats.hits);
    assert!(updated.updated_at >= before.updated_at);

    let stored = harness
        .repository
        .fetch(id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.stats.home_runs, 31);
}

#[tokio::test]
async fn update_reports_validation_errors() {
    let harness = seeded_harness().await;
    let id = id_of(&harness.repository, "J Baez");

    let update = PlayerUpdate {
        name: Some(String::new()),
        ..PlayerUpdate::default()
    };
    match harness.service.update(id, update) {
        Err(PlayerServiceError::Validation(UpdateError::EmptyName)) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn get_reports_missing_player() {
    let harness = harness();
    match harness.service.get(PlayerId(404)) {
        Err(PlayerServiceError::NotFound(PlayerId(404))) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn repository_failures_propagate() {
    let service = PlayerService::new(
        Arc::new(UnavailableRepository),
        Arc::new(StubFeed::default()),
        Arc::new(StubDescriber::default()),
    );

    match service.list(PlayerSort::default()) {
        Err(PlayerServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
}

#[tokio::test]
async fn describe_caches_until_refresh() {
    let harness = seeded_harness().await;
    let id = id_of(&harness.repository, "M Sano");

    let first = harness.service.describe(id, false).await.expect("describe");
    assert_eq!(
        first.description.as_deref(),
        Some("M Sano takes the field (take 1).")
    );

    let cached = harness.service.describe(id, false).await.expect("describe");
    assert_eq!(cached.description, first.description);
    assert_eq!(harness.describer.calls(), 1);

    let refreshed = harness.service.describe(id, true).await.expect("describe");
    assert_eq!(
        refreshed.description.as_deref(),
        Some("M Sano takes the field (take 2).")
    );

    let stored = harness
        .repository
        .fetch(id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.description, refreshed.description);
}

#[tokio::test]
async fn describe_without_model_leaves_record_untouched() {
    let harness = harness_with(
        StubFeed::with_records(feed_records()),
        StubDescriber::unconfigured(),
    );
    harness.service.seed().await.expect("seed succeeds");
    let id = id_of(&harness.repository, "J Baez");

    match harness.service.describe(id, false).await {
        Err(PlayerServiceError::Describe(DescribeError::NotConfigured)) => {}
        other => panic!("expected unconfigured describer, got {other:?}"),
    }
    let stored = harness.service.get(id).expect("player exists");
    assert!(stored.description.is_none());
}

#[tokio::test]
async fn repair_names_fixes_only_dirty_rows() {
    let harness = seeded_harness().await;
    let id = id_of(&harness.repository, "J Baez");

    let mut dirty = harness.service.get(id).expect("player exists");
    dirty.name = "J B?ez".to_string();
    dirty.position = Some("Shortstop\u{e9}".to_string());
    harness.repository.update(dirty).expect("direct write");

    let summary = harness.service.repair_names().expect("repair runs");
    assert_eq!(summary.examined, 5);
    assert_eq!(summary.updated(), 1);
    assert_eq!(summary.repairs[0].id, id);
    assert_eq!(summary.repairs[0].before, "J B?ez");
    assert_eq!(summary.repairs[0].after, "J Baez");
    assert_eq!(
        summary.repairs[0].position_before.as_deref(),
        Some("Shortstop\u{e9}")
    );
    assert_eq!(
        summary.repairs[0].position_after.as_deref(),
        Some("Shortstope")
    );

    let stored = harness.service.get(id).expect("player exists");
    assert_eq!(stored.position.as_deref(), Some("Shortstope"));

    let again = harness.service.repair_names().expect("repair runs");
    assert_eq!(again.updated(), 0);
}

#[tokio::test]
async fn seed_skips_records_without_a_usable_name() {
    let mut records = feed_records();
    records.push(FeedRecord {
        name: None,
        hits: 3,
        ..FeedRecord::default()
    });
    records.push(feed_record("大谷", "DH", 2, 1));
    let harness = harness_with(StubFeed::with_records(records), StubDescriber::default());

    let summary = harness.service.seed().await.expect("seed succeeds");
    assert_eq!(summary.seeded, 5);
    assert_eq!(summary.skipped, 2);

    let players = harness.repository.snapshot();
    assert_eq!(players.len(), 5);
    assert!(players.iter().all(|player| !player.name.trim().is_empty()));
}

#[tokio::test]
async fn repair_names_keeps_rows_without_an_ascii_spelling() {
    let harness = seeded_harness().await;
    let id = id_of(&harness.repository, "M Sano");

    let mut stored = harness.service.get(id).expect("player exists");
    stored.name = "大谷".to_string();
    harness.repository.update(stored).expect("direct write");

    let summary = harness.service.repair_names().expect("repair runs");
    assert_eq!(summary.updated(), 0);
    assert_eq!(harness.service.get(id).expect("player exists").name, "大谷");
}

#[tokio::test]
async fn repair_names_reports_position_only_changes() {
    let harness = seeded_harness().await;
    let id = id_of(&harness.repository, "C Beltran");

    let mut stored = harness.service.get(id).expect("player exists");
    stored.position = Some("C?".to_string());
    harness.repository.update(stored).expect("direct write");

    let summary = harness.service.repair_names().expect("repair runs");
    assert_eq!(summary.updated(), 1);
    let repair = &summary.repairs[0];
    assert_eq!(repair.before, repair.after);
    assert_eq!(repair.position_before.as_deref(), Some("C?"));
    assert_eq!(repair.position_after.as_deref(), Some("Ca"));
}
