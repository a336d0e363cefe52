//! Ordering and isolation properties of the research fan-out.
//!
//! Branch completion order must never change which results reach synthesis,
//! only the order they are listed in.

mod common;

use common::mocks::{MockLLMClient, MockSearchProvider};
use rand::Rng;
use rstest::rstest;
use scout::research::{CoordinatorSettings, FanOutReducer, ResearchBranch, ResearchCoordinator};
use scout::types::ResearchResult;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const QUERIES: [&str; 3] = ["alpha", "beta", "gamma"];

fn plan() -> String {
    format!(r#"{{"queries": ["{}", "{}", "{}"]}}"#, QUERIES[0], QUERIES[1], QUERIES[2])
}

fn sorted(mut results: Vec<ResearchResult>) -> Vec<ResearchResult> {
    results.sort();
    results
}

async fn run_with_delays(delays_ms: [u64; 3]) -> Vec<ResearchResult> {
    let mut search = MockSearchProvider::new();
    for (query, delay) in QUERIES.iter().zip(delays_ms) {
        search = search.delay_on(query, Duration::from_millis(delay));
    }

    let coordinator = ResearchCoordinator::new(
        Arc::new(MockLLMClient::planner(&plan())),
        Arc::new(MockLLMClient::writer("answer")),
        Arc::new(search),
        CoordinatorSettings::default(),
    );

    coordinator.run("question").await.unwrap().sources
}

#[rstest]
#[case::in_order([10, 40, 70])]
#[case::reversed([70, 40, 10])]
#[case::middle_last([10, 70, 40])]
#[case::middle_first([40, 10, 70])]
#[case::first_last([70, 10, 40])]
#[case::last_middle([40, 70, 10])]
#[tokio::test]
async fn test_results_independent_of_completion_order(#[case] delays_ms: [u64; 3]) {
    let baseline = sorted(run_with_delays([0, 0, 0]).await);
    let permuted = sorted(run_with_delays(delays_ms).await);

    assert_eq!(baseline.len(), 3);
    assert_eq!(permuted, baseline);
}

#[tokio::test]
async fn test_sources_follow_completion_order() {
    let sources = run_with_delays([70, 10, 40]).await;
    let titles: Vec<_> = sources.iter().map(|s| s.display_title()).collect();
    assert_eq!(titles, vec!["Article on beta", "Article on gamma", "Article on alpha"]);
}

#[tokio::test]
async fn test_random_delays_keep_the_same_multiset() {
    let baseline = sorted(run_with_delays([0, 0, 0]).await);

    for _ in 0..5 {
        let delays = {
            let mut rng = rand::rng();
            [
                rng.random_range(0..30),
                rng.random_range(0..30),
                rng.random_range(0..30),
            ]
        };
        assert_eq!(sorted(run_with_delays(delays).await), baseline, "delays {:?}", delays);
    }
}

#[tokio::test]
async fn test_reducer_with_real_branches_isolates_failures() {
    let search = Arc::new(MockSearchProvider::new().fail_on("beta"));
    let llm = Arc::new(MockLLMClient::planner(&plan()));
    let branch = ResearchBranch::new(search.clone(), llm, 1, 4000);

    let queries: Vec<String> = QUERIES.iter().map(|q| q.to_string()).collect();
    let (results, stats) = FanOutReducer::new()
        .run(
            &queries,
            |query| {
                let branch = branch.clone();
                async move { branch.execute("question", &query).await }
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(stats.branches, 3);
    assert_eq!(stats.productive, 2);
    assert_eq!(stats.empty, 1);
    assert_eq!(stats.crashed, 0);
    assert_eq!(search.search_calls(), 3);
}

#[tokio::test]
async fn test_batches_are_merged_whole() {
    let queries: Vec<String> = (0..8).map(|i| format!("q{}", i)).collect();

    let (items, _) = FanOutReducer::new()
        .run(
            &queries,
            |query| async move {
                let jitter = query.trim_start_matches('q').parse::<u64>().unwrap_or(0) % 3;
                tokio::time::sleep(Duration::from_millis(jitter * 5)).await;
                (0..4).map(|n| format!("{}-{}", query, n)).collect::<Vec<_>>()
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(items.len(), 32);
    // Each branch's four items stay adjacent and in their local order
    for chunk in items.chunks(4) {
        let prefix = chunk[0].split('-').next().unwrap();
        let expected: Vec<String> = (0..4).map(|n| format!("{}-{}", prefix, n)).collect();
        assert_eq!(chunk, expected.as_slice());
    }
}
