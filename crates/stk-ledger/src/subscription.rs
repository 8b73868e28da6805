//! Subscriptions as capabilities.
//!
//! A [`Subscription`] is a lazy, non-restartable stream of [`ChangeEvent`]s
//! owned by exactly one consumer. Releasing it (drop or `cancel`) is the only
//! way to unsubscribe; the producer holds the matching [`SubscriptionSink`]
//! and sees the release through `is_released`.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::ChangeEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

pub struct Subscription {
    id: SubscriptionId,
    events: UnboundedReceiverStream<ChangeEvent>,
    _release: DropGuard,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Release the capability. Equivalent to dropping it.
    pub fn cancel(self) {}
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Stream for Subscription {
    type Item = ChangeEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<ChangeEvent>> {
        Pin::new(&mut self.get_mut().events).poll_next(cx)
    }
}

/// Producer half held by the ledger client.
#[derive(Clone, Debug)]
pub struct SubscriptionSink {
    id: SubscriptionId,
    tx: mpsc::UnboundedSender<ChangeEvent>,
    released: CancellationToken,
}

impl SubscriptionSink {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Deliver an event. Returns `false` if the consumer has released.
    pub fn deliver(&self, event: ChangeEvent) -> bool {
        if self.is_released() {
            return false;
        }
        self.tx.send(event).is_ok()
    }

    pub fn is_released(&self) -> bool {
        self.released.is_cancelled() || self.tx.is_closed()
    }

    /// Resolves once the consumer releases the subscription.
    pub async fn released(&self) {
        self.released.cancelled().await
    }
}

/// Create a linked sink/subscription pair.
pub fn subscription_channel(id: SubscriptionId) -> (SubscriptionSink, Subscription) {
    let (tx, rx) = mpsc::unbounded_channel();
    let released = CancellationToken::new();
    let sink = SubscriptionSink {
        id,
        tx,
        released: released.clone(),
    };
    let sub = Subscription {
        id,
        events: UnboundedReceiverStream::new(rx),
        _release: released.drop_guard(),
    };
    (sink, sub)
}
