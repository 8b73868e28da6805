//! Two-phase weak join of vote, info and score feeds.
//!
//! # Output order
//!
//! 1. Phase A: one record per score whose `account` matches a remaining vote
//!    record, in score-list order.
//! 2. Phase B: every vote record not claimed in phase A, in vote-list order,
//!    with no score.
//!
//! Scores that match no vote record are dropped. Every vote record appears in
//! exactly one output record.
//!
//! # Progress
//!
//! After every `batch_size` processed items the matcher yields to the
//! runtime, publishes the accumulated prefix through `on_partial`, then checks
//! the cancel token. A cancelled run returns `None`; the last partial stays
//! the caller's best view.

use std::collections::{HashMap, VecDeque};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{InfoRecord, MergedRecord, ScoreRecord, VoteRecord};

pub const DEFAULT_BATCH_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Remaining-record index
// ---------------------------------------------------------------------------

/// "Remaining" working set over an input slice that is never mutated.
///
/// Each key maps to the input positions carrying it, oldest first, so
/// `take_first` returns the same element a front-to-back search over the
/// not-yet-claimed records would.
struct Remaining<'a> {
    by_key: HashMap<&'a str, VecDeque<usize>>,
    claimed: Vec<bool>,
}

impl<'a> Remaining<'a> {
    fn new(keys: impl Iterator<Item = &'a str>) -> Self {
        let mut by_key: HashMap<&'a str, VecDeque<usize>> = HashMap::new();
        let mut len = 0;
        for (i, k) in keys.enumerate() {
            by_key.entry(k).or_default().push_back(i);
            len = i + 1;
        }
        Self {
            by_key,
            claimed: vec![false; len],
        }
    }

    fn take_first(&mut self, key: &str) -> Option<usize> {
        let queue = self.by_key.get_mut(key)?;
        let idx = queue.pop_front()?;
        self.claimed[idx] = true;
        Some(idx)
    }

    fn is_claimed(&self, idx: usize) -> bool {
        self.claimed[idx]
    }
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

async fn checkpoint<F>(merged: &[MergedRecord], on_partial: &mut F, cancel: &CancellationToken) -> bool
where
    F: FnMut(&[MergedRecord]),
{
    tokio::task::yield_now().await;
    on_partial(merged);
    !cancel.is_cancelled()
}

/// Merge the three feeds. Returns `None` if `cancel` fired.
pub async fn match_validators<F>(
    votes: &[VoteRecord],
    infos: &[InfoRecord],
    scores: &[ScoreRecord],
    batch_size: usize,
    mut on_partial: F,
    cancel: &CancellationToken,
) -> Option<Vec<MergedRecord>>
where
    F: FnMut(&[MergedRecord]),
{
    let batch_size = batch_size.max(1);
    let mut remaining_votes = Remaining::new(votes.iter().map(|v| v.node_identity.as_str()));
    let mut remaining_infos = Remaining::new(infos.iter().map(|i| i.node_identity.as_str()));
    let mut merged: Vec<MergedRecord> = Vec::with_capacity(votes.len());
    let mut processed = 0usize;
    let mut unmatched_scores = 0usize;

    // Phase A: score-driven.
    for score in scores {
        match remaining_votes.take_first(&score.account) {
            Some(vi) => {
                let vote = &votes[vi];
                let info = remaining_infos
                    .take_first(&vote.node_identity)
                    .map(|ii| infos[ii].clone());
                merged.push(MergedRecord {
                    vote: vote.clone(),
                    info,
                    score: Some(score.clone()),
                });
            }
            None => unmatched_scores += 1,
        }

        processed += 1;
        if processed % batch_size == 0 && !checkpoint(&merged, &mut on_partial, cancel).await {
            debug!(processed, "validator matcher cancelled in score phase");
            return None;
        }
    }

    // Phase B: leftover votes, original order.
    for (vi, vote) in votes.iter().enumerate() {
        if remaining_votes.is_claimed(vi) {
            continue;
        }
        let info = remaining_infos
            .take_first(&vote.node_identity)
            .map(|ii| infos[ii].clone());
        merged.push(MergedRecord {
            vote: vote.clone(),
            info,
            score: None,
        });

        processed += 1;
        if processed % batch_size == 0 && !checkpoint(&merged, &mut on_partial, cancel).await {
            debug!(processed, "validator matcher cancelled in vote phase");
            return None;
        }
    }

    if cancel.is_cancelled() {
        return None;
    }

    debug!(
        merged = merged.len(),
        unmatched_scores, "validator matcher finished"
    );
    Some(merged)
}
