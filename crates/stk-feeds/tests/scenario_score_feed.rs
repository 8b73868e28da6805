//! Scenario: validators.app score feed over HTTP
//!
//! # Invariants under test
//! - The request targets the cluster's network path and carries the token
//!   header.
//! - Rows decode into score records; null sub-scores read as zero.
//! - Non-success statuses surface as `FeedError::Api` with the status code;
//!   malformed bodies as `FeedError::Decode`.
//! - `WithScores` joins file-backed votes/infos with HTTP scores.

use httpmock::prelude::*;
use serde_json::json;
use stk_feeds::{JsonFileFeeds, ScoreNetwork, ValidatorsAppScores, WithScores};
use stk_validators::{FeedError, ValidatorDirectory, ValidatorFeeds};

fn client(server: &MockServer, network: ScoreNetwork) -> ValidatorsAppScores {
    ValidatorsAppScores::new_with_base_url("tok-123".to_string(), network, server.base_url())
}

#[tokio::test]
async fn scores_are_fetched_with_token_header() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/validators/mainnet.json")
                .header("Token", "tok-123");
            then.status(200).json_body(json!([
                {"account": "N1", "total_score": 9, "root_distance_score": 2},
                {"account": "N2", "total_score": null}
            ]));
        })
        .await;

    let scores = client(&server, ScoreNetwork::Mainnet).fetch_scores().await.unwrap();

    mock.assert_async().await;
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].account, "N1");
    assert_eq!(scores[0].total_score, 9);
    assert_eq!(scores[0].root_distance_score, 2);
    assert_eq!(scores[1].total_score, 0);
}

#[tokio::test]
async fn non_mainnet_cluster_reads_testnet_path() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/validators/testnet.json");
            then.status(200).json_body(json!([]));
        })
        .await;

    let scores = client(&server, ScoreNetwork::for_cluster("devnet"))
        .fetch_scores()
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(scores.is_empty());
}

#[tokio::test]
async fn http_error_maps_to_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/validators/mainnet.json");
            then.status(401).body("invalid token");
        })
        .await;

    let err = client(&server, ScoreNetwork::Mainnet).fetch_scores().await.unwrap_err();
    match err {
        FeedError::Api { status, message } => {
            assert_eq!(status, Some(401));
            assert_eq!(message, "invalid token");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/validators/mainnet.json");
            then.status(200).body("{\"not\":\"a list\"}");
        })
        .await;

    let err = client(&server, ScoreNetwork::Mainnet).fetch_scores().await.unwrap_err();
    assert!(matches!(err, FeedError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn file_votes_join_http_scores_in_the_directory() {
    let dir = tempfile::tempdir().unwrap();
    let votes = dir.path().join("votes.json");
    let infos = dir.path().join("infos.json");
    std::fs::write(
        &votes,
        json!([
            {"nodePubkey": "N1", "votePubkey": "V1", "commission": 5, "activatedStake": 10},
            {"nodePubkey": "N2", "votePubkey": "V2", "commission": 7, "activatedStake": 20}
        ])
        .to_string(),
    )
    .unwrap();
    std::fs::write(&infos, json!([{"identity": "N1", "name": "One"}]).to_string()).unwrap();

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/validators/mainnet.json");
            then.status(200).json_body(json!([{"account": "N2", "total_score": 10}]));
        })
        .await;

    let feeds = WithScores {
        base: JsonFileFeeds::new(&votes, &infos, dir.path().join("unused.json")),
        scores: client(&server, ScoreNetwork::Mainnet),
    };
    assert_eq!(feeds.fetch_score_records().await.unwrap().len(), 1);

    let mut directory = ValidatorDirectory::new(100);
    directory.refresh(&feeds).await.unwrap();
    directory.settle().await;

    let view = directory.snapshot();
    assert!(view.complete);
    assert_eq!(view.records.len(), 2);
    assert_eq!(view.records[0].vote.node_identity, "N2", "scored record first");
    assert_eq!(view.records[1].display_name(), Some("One"));
}
