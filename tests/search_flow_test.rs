//! End-to-end search flows through the orchestrator with stubbed providers.

mod common;

use std::sync::atomic::Ordering;

use common::{movie_hit, series_hit, supplemental, StubPrimary, StubSecondary, TestHarness};
use screendex::metadata::provider::TitleKind;
use screendex::search::{MediaKind, Provenance, SearchCriteria, SearchError};

fn title_criteria(title: &str) -> SearchCriteria {
    SearchCriteria {
        title: Some(title.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn title_search_merges_both_providers() {
    let primary = StubPrimary {
        search_hits: vec![movie_hit(
            209112,
            "Batman v Superman: Dawn of Justice",
            2016,
        )],
        external_id: Some("tt2975590".to_string()),
        ..Default::default()
    };
    let secondary = StubSecondary {
        record: Some(supplemental("Batman v Superman: Dawn of Justice", 2016)),
        ..Default::default()
    };
    let harness = TestHarness::new(primary, secondary);

    let movies = harness
        .ctx
        .orchestrator
        .search(&title_criteria("Batman v Superman: Dawn of Justice"))
        .await
        .unwrap();

    assert_eq!(movies.len(), 1);
    let movie = &movies[0];
    assert_eq!(movie.provenance, Provenance::Merged);
    assert_eq!(movie.id, "tt2975590");
    assert_eq!(movie.title, "Batman v Superman: Dawn of Justice");
    assert_eq!(movie.year, Some(2016));
    // Genres come from the Primary genre-id table, not the Secondary strings.
    assert_eq!(movie.genres, vec!["Action", "Science Fiction"]);
    // At least one Secondary rating source survived the merge.
    assert_eq!(
        movie.ratings.get("Rotten Tomatoes").map(String::as_str),
        Some("29%")
    );
    assert_eq!(movie.director.as_deref(), Some("Zack Snyder"));
    // No discovery happened for a title-only search.
    assert_eq!(harness.primary.discover_calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.primary.popular_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_criteria_return_popular_page_without_secondary_calls() {
    let mut popular_hits: Vec<_> = (0..15)
        .map(|i| movie_hit(1000 + i, &format!("Popular {i:02}"), 2020))
        .collect();
    popular_hits.extend((0..10).map(|i| series_hit(2000 + i, &format!("Show {i:02}"), 2019)));

    let primary = StubPrimary {
        popular_hits,
        external_id: Some("tt0000001".to_string()),
        ..Default::default()
    };
    let secondary = StubSecondary {
        record: Some(supplemental("Popular 00", 2020)),
        ..Default::default()
    };
    let harness = TestHarness::new(primary, secondary);

    let movies = harness
        .ctx
        .orchestrator
        .search(&SearchCriteria::default())
        .await
        .unwrap();

    // One page drawn from both kinds' listings, sorted by title, enriched
    // but never cross-referenced.
    assert_eq!(movies.len(), 20);
    let titles: Vec<_> = movies.iter().map(|m| m.title.as_str()).collect();
    let mut sorted = titles.clone();
    sorted.sort();
    assert_eq!(titles, sorted);
    assert!(movies.iter().any(|m| m.kind == TitleKind::Movie));
    assert!(movies.iter().any(|m| m.kind == TitleKind::Series));
    assert!(movies.iter().all(|m| m.provenance == Provenance::Primary));
    assert!(movies.iter().all(|m| !m.actors.is_empty()));
    assert_eq!(harness.primary.popular_calls.load(Ordering::SeqCst), 2);
    assert_eq!(harness.secondary.id_calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.secondary.title_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn primary_failure_returns_no_partial_results() {
    let primary = StubPrimary {
        fail_search: true,
        ..Default::default()
    };
    let harness = TestHarness::new(primary, StubSecondary::default());

    let err = harness
        .ctx
        .orchestrator
        .search(&title_criteria("Inception"))
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::ProviderUnavailable(_)));
}

#[tokio::test]
async fn secondary_outage_degrades_to_primary_provenance() {
    let primary = StubPrimary {
        search_hits: vec![movie_hit(27205, "Inception", 2010)],
        external_id: Some("tt1375666".to_string()),
        ..Default::default()
    };
    let secondary = StubSecondary {
        fail: true,
        ..Default::default()
    };
    let harness = TestHarness::new(primary, secondary);

    let movies = harness
        .ctx
        .orchestrator
        .search(&title_criteria("Inception"))
        .await
        .unwrap();

    assert_eq!(movies.len(), 1);
    let movie = &movies[0];
    assert_eq!(movie.provenance, Provenance::Primary);
    // Secondary-only fields are absent, not defaulted to junk.
    assert_eq!(movie.director, None);
    assert_eq!(movie.runtime, None);
    assert!(movie.ratings.is_empty());
    // Primary credits still fill the cast.
    assert!(!movie.actors.is_empty());
}

#[tokio::test]
async fn repeated_search_makes_no_additional_provider_calls() {
    let primary = StubPrimary {
        search_hits: vec![movie_hit(27205, "Inception", 2010)],
        external_id: Some("tt1375666".to_string()),
        ..Default::default()
    };
    let secondary = StubSecondary {
        record: Some(supplemental("Inception", 2010)),
        ..Default::default()
    };
    let harness = TestHarness::new(primary, secondary);

    let first = harness
        .ctx
        .orchestrator
        .search(&title_criteria("Inception"))
        .await
        .unwrap();

    let search_calls = harness.primary.search_calls.load(Ordering::SeqCst);
    let credits_calls = harness.primary.credits_calls.load(Ordering::SeqCst);
    let xref_calls = harness.primary.external_id_calls.load(Ordering::SeqCst);
    let id_calls = harness.secondary.id_calls.load(Ordering::SeqCst);

    let second = harness
        .ctx
        .orchestrator
        .search(&title_criteria("Inception"))
        .await
        .unwrap();

    assert_eq!(
        harness.primary.search_calls.load(Ordering::SeqCst),
        search_calls
    );
    assert_eq!(
        harness.primary.credits_calls.load(Ordering::SeqCst),
        credits_calls
    );
    assert_eq!(
        harness.primary.external_id_calls.load(Ordering::SeqCst),
        xref_calls
    );
    assert_eq!(harness.secondary.id_calls.load(Ordering::SeqCst), id_calls);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn filters_only_applies_residual_actor_filter() {
    let primary = StubPrimary {
        discover_hits: vec![
            movie_hit(603, "The Matrix", 1999),
            movie_hit(604, "The Matrix Reloaded", 2003),
        ],
        external_id: Some("tt0133093".to_string()),
        ..Default::default()
    };
    // Secondary knows a cast the Primary credits do not contain.
    let secondary = StubSecondary {
        record: Some(supplemental("The Matrix", 1999)),
        ..Default::default()
    };
    let harness = TestHarness::new(primary, secondary);

    let criteria = SearchCriteria {
        kind: MediaKind::Movie,
        genre: Some("Action".to_string()),
        actors: vec!["Amy Adams".to_string()],
        ..Default::default()
    };
    let movies = harness.ctx.orchestrator.search(&criteria).await.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(harness.primary.search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.primary.discover_calls.load(Ordering::SeqCst), 1);

    // An actor nobody has filters everything out client-side.
    let criteria = SearchCriteria {
        kind: MediaKind::Movie,
        genre: Some("Action".to_string()),
        actors: vec!["Nobody Famous".to_string()],
        ..Default::default()
    };
    assert!(harness
        .ctx
        .orchestrator
        .search(&criteria)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn title_with_type_filter_drops_wrong_kind() {
    let primary = StubPrimary {
        search_hits: vec![
            movie_hit(268, "Batman", 1989),
            series_hit(2287, "Batman", 1966),
        ],
        external_id: Some("tt0096895".to_string()),
        ..Default::default()
    };
    let harness = TestHarness::new(primary, StubSecondary::default());

    let criteria = SearchCriteria {
        title: Some("Batman".to_string()),
        kind: MediaKind::Movie,
        ..Default::default()
    };
    let movies = harness.ctx.orchestrator.search(&criteria).await.unwrap();

    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].year, Some(1989));
}

#[tokio::test]
async fn missing_external_id_skips_secondary_entirely() {
    let primary = StubPrimary {
        search_hits: vec![movie_hit(42, "Obscure Indie Film", 2021)],
        external_id: None,
        ..Default::default()
    };
    let secondary = StubSecondary {
        record: Some(supplemental("Obscure Indie Film", 2021)),
        ..Default::default()
    };
    let harness = TestHarness::new(primary, secondary);

    let movies = harness
        .ctx
        .orchestrator
        .search(&title_criteria("Obscure Indie Film"))
        .await
        .unwrap();

    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].provenance, Provenance::Primary);
    // The Primary id is surfaced when no external id exists.
    assert_eq!(movies[0].id, "42");
    assert_eq!(harness.secondary.id_calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.secondary.title_calls.load(Ordering::SeqCst), 0);
}
