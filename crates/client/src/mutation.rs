//! Shared mutation lifecycle.
//!
//! Every cart and wishlist mutation goes `Idle -> Pending -> Idle`. On
//! success the affected cache entries are invalidated and an invalidation
//! event is broadcast; on failure the error is classified into a [`Notice`],
//! broadcast, and returned. A 401 additionally expires the session. Nothing
//! is retried automatically.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::cache::CacheKey;
use crate::error::Result;
use crate::notice::{MutationKind, Notice};
use crate::session::{Session, StoreEvent};
use crate::telemetry;

/// Observable state of a store's mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    Idle,
    Pending,
}

/// Counts in-flight mutations for one store.
///
/// Concurrent mutations are allowed; the store is `Pending` while at least one
/// of them has not settled.
#[derive(Debug, Default)]
pub struct MutationTracker {
    in_flight: AtomicUsize,
}

impl MutationTracker {
    /// Current state.
    #[must_use]
    pub fn state(&self) -> MutationState {
        if self.in_flight.load(Ordering::Acquire) == 0 {
            MutationState::Idle
        } else {
            MutationState::Pending
        }
    }

    fn begin(&self) -> PendingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        PendingGuard { tracker: self }
    }
}

/// Returns the tracker to idle when the mutation settles or is dropped.
struct PendingGuard<'a> {
    tracker: &'a MutationTracker,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

fn settled_event(kind: MutationKind) -> StoreEvent {
    match kind {
        MutationKind::AddToCart
        | MutationKind::UpdateCartQuantity
        | MutationKind::RemoveFromCart
        | MutationKind::ClearCart => StoreEvent::CartInvalidated,
        MutationKind::AddToWishlist | MutationKind::RemoveFromWishlist => {
            StoreEvent::WishlistInvalidated
        }
    }
}

/// Drive one mutation through its lifecycle.
pub(crate) async fn run<F>(
    session: &Session,
    tracker: &MutationTracker,
    kind: MutationKind,
    invalidate: &[CacheKey],
    request: F,
) -> std::result::Result<(), Notice>
where
    F: Future<Output = Result<()>>,
{
    let _pending = tracker.begin();

    match request.await {
        Ok(()) => {
            for key in invalidate {
                session.invalidate(key).await;
            }
            tracing::debug!(mutation = %kind, "mutation succeeded, cache invalidated");
            session.emit(settled_event(kind));
            Ok(())
        }
        Err(err) => {
            let notice = Notice::classify(kind, &err);
            tracing::warn!(
                mutation = %kind,
                error = %err,
                notice = ?notice.kind,
                "mutation failed"
            );
            telemetry::notice_breadcrumb(&notice);

            if err.is_unauthorized() {
                session.expire().await;
            }

            session.emit(StoreEvent::Notice(notice.clone()));
            Err(notice)
        }
    }
}
