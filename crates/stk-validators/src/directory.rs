//! Published validator view.
//!
//! Readers hold a `watch::Receiver<ValidatorView>`; only the directory's
//! matcher task writes. Each submitted feed snapshot gets a new generation and
//! cancels the run still working on the previous one. A view is never
//! overwritten by an older generation.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::{
    match_validators, FeedError, InfoRecord, MergedRecord, ScoreRecord, ValidatorFeeds, VoteRecord,
};

/// One consistent set of feed inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub votes: Vec<VoteRecord>,
    pub infos: Vec<InfoRecord>,
    pub scores: Vec<ScoreRecord>,
}

/// Read-only snapshot of the merged list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatorView {
    /// Latest submitted generation (0 = none yet).
    pub generation: u64,
    /// Generation whose matcher produced `records`. Trails `generation` until
    /// the newest run publishes its first partial.
    pub records_generation: u64,
    pub records: Arc<Vec<MergedRecord>>,
    /// `false` while the matcher for `generation` is still running.
    pub complete: bool,
}

struct MatcherRun {
    _cancel_on_drop: DropGuard,
    worker: JoinHandle<()>,
}

pub struct ValidatorDirectory {
    batch_size: usize,
    view: Arc<watch::Sender<ValidatorView>>,
    generation: u64,
    run: Option<MatcherRun>,
}

impl ValidatorDirectory {
    pub fn new(batch_size: usize) -> Self {
        let (view, _rx) = watch::channel(ValidatorView::default());
        Self {
            batch_size,
            view: Arc::new(view),
            generation: 0,
            run: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ValidatorView> {
        self.view.subscribe()
    }

    /// Current published view.
    pub fn snapshot(&self) -> ValidatorView {
        self.view.borrow().clone()
    }

    /// Start matching `snapshot`, cancelling any run in flight.
    ///
    /// Must be called from within a tokio runtime. Returns the generation
    /// assigned to the snapshot.
    pub fn submit(&mut self, snapshot: FeedSnapshot) -> u64 {
        // Dropping the previous run fires its cancel token.
        self.run = None;

        self.generation += 1;
        let generation = self.generation;
        let batch_size = self.batch_size;
        let view = Arc::clone(&self.view);

        // Claim the generation up front so a superseded run can no longer
        // publish; records stay until the new run's first partial.
        view.send_modify(|v| {
            v.generation = generation;
            v.complete = false;
        });

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let worker = tokio::spawn(async move {
            let partial_view = Arc::clone(&view);
            let outcome = match_validators(
                &snapshot.votes,
                &snapshot.infos,
                &snapshot.scores,
                batch_size,
                |partial| publish(&partial_view, generation, partial.to_vec(), false),
                &token,
            )
            .await;

            match outcome {
                Some(records) => {
                    info!(generation, records = records.len(), "validator view complete");
                    publish(&view, generation, records, true);
                }
                None => debug!(generation, "validator view run superseded"),
            }
        });

        self.run = Some(MatcherRun {
            _cancel_on_drop: cancel.drop_guard(),
            worker,
        });
        generation
    }

    /// Fetch all three feeds and submit the result.
    pub async fn refresh(&mut self, feeds: &dyn ValidatorFeeds) -> Result<u64, FeedError> {
        let (votes, infos, scores) = tokio::try_join!(
            feeds.fetch_vote_records(),
            feeds.fetch_info_records(),
            feeds.fetch_score_records(),
        )?;
        Ok(self.submit(FeedSnapshot {
            votes,
            infos,
            scores,
        }))
    }

    /// Wait for the current run (if any) to finish without cancelling it.
    pub async fn settle(&mut self) {
        if let Some(run) = self.run.take() {
            let MatcherRun {
                _cancel_on_drop,
                worker,
            } = run;
            if let Err(err) = worker.await {
                warn!(error = %err, "validator matcher ended abnormally");
            }
            drop(_cancel_on_drop);
        }
    }

    /// Cancel the current run and wait for its task to exit.
    pub async fn shutdown(&mut self) {
        if let Some(run) = self.run.take() {
            let MatcherRun {
                _cancel_on_drop,
                worker,
            } = run;
            drop(_cancel_on_drop);
            if let Err(err) = worker.await {
                // Cancellation is cooperative; a JoinError here is a panic.
                warn!(error = %err, "validator matcher ended abnormally");
            }
        }
    }
}

fn publish(
    view: &watch::Sender<ValidatorView>,
    generation: u64,
    records: Vec<MergedRecord>,
    complete: bool,
) {
    view.send_if_modified(|v| {
        if v.generation > generation {
            return false;
        }
        v.generation = generation;
        v.records_generation = generation;
        v.records = Arc::new(records);
        v.complete = complete;
        true
    });
}
