//! Scenario: matcher progress and cancellation
//!
//! # Invariants under test
//! - A partial is published after every batch.
//! - Cancelling mid-run returns `None` without panicking.
//! - Every partial is a prefix of the full result.

use stk_validators::{match_validators, InfoRecord, MergedRecord, ScoreRecord, VoteRecord};
use tokio_util::sync::CancellationToken;

fn fixture() -> (Vec<VoteRecord>, Vec<InfoRecord>, Vec<ScoreRecord>) {
    let votes: Vec<_> = (0..95)
        .map(|i| VoteRecord::new(format!("N{i}"), format!("V{i}"), 1, i as u64))
        .collect();
    let infos: Vec<_> = (0..95)
        .step_by(2)
        .map(|i| InfoRecord::new(format!("N{i}"), format!("name {i}")))
        .collect();
    let scores: Vec<_> = (0..95)
        .step_by(4)
        .map(|i| ScoreRecord::new(format!("N{i}"), 8))
        .collect();
    (votes, infos, scores)
}

#[tokio::test]
async fn partials_are_published_per_batch_and_prefix_the_result() {
    let (votes, infos, scores) = fixture();
    let cancel = CancellationToken::new();
    let mut partials: Vec<Vec<MergedRecord>> = Vec::new();

    let full = match_validators(&votes, &infos, &scores, 10, |p| partials.push(p.to_vec()), &cancel)
        .await
        .unwrap();

    // 24 scores + 71 leftover votes = 95 processed items -> 9 batches.
    assert_eq!(partials.len(), 9);
    for p in &partials {
        assert_eq!(p.as_slice(), &full[..p.len()]);
    }
    let lens: Vec<usize> = partials.iter().map(Vec::len).collect();
    assert!(lens.windows(2).all(|w| w[0] <= w[1]), "partials only grow");
}

#[tokio::test]
async fn cancel_during_run_returns_none_and_keeps_last_partial() {
    let (votes, infos, scores) = fixture();
    let full = {
        let c = CancellationToken::new();
        match_validators(&votes, &infos, &scores, 10, |_| {}, &c)
            .await
            .unwrap()
    };

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let mut last: Vec<MergedRecord> = Vec::new();
    let mut calls = 0;

    let out = match_validators(
        &votes,
        &infos,
        &scores,
        10,
        |p| {
            calls += 1;
            last = p.to_vec();
            if calls == 3 {
                trigger.cancel();
            }
        },
        &cancel,
    )
    .await;

    assert!(out.is_none(), "cancelled run yields no final result");
    assert_eq!(calls, 3, "no partial after cancellation is observed");
    assert!(!last.is_empty());
    assert_eq!(last.as_slice(), &full[..last.len()]);

    let scored = last.iter().filter(|r| r.has_score()).count();
    assert!(last[..scored].iter().all(|r| r.has_score()));
    assert!(last[scored..].iter().all(|r| !r.has_score()));
}

#[tokio::test]
async fn pre_cancelled_token_yields_none() {
    let (votes, infos, scores) = fixture();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let out = match_validators(&votes, &infos, &scores, 10, |_| {}, &cancel).await;
    assert!(out.is_none());
}
