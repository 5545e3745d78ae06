use std::sync::Arc;

use tracing::warn;

use super::bindings::binding;
use super::cache::{CachedView, QueryCache, QueryKey};
use super::domain::{RegistrationRequest, StakeholderKind};
use super::store::RegistrationStore;

/// Read-only view of the requests awaiting administrator review.
pub struct PendingQueueReader<S> {
    store: Arc<S>,
    cache: Arc<QueryCache>,
}

impl<S> PendingQueueReader<S>
where
    S: RegistrationStore + 'static,
{
    pub fn new(store: Arc<S>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    /// Pending requests for `kind`. Degrades to an empty list when the store is
    /// unreachable; degraded results are not cached so the next poll retries.
    pub async fn list_pending(&self, kind: StakeholderKind) -> Vec<RegistrationRequest> {
        let key = QueryKey::PendingQueue(kind);
        if let Some(CachedView::Requests(requests)) = self.cache.fresh(&key) {
            return requests;
        }

        let generation = self.cache.generation(&key);
        match self.store.pending(kind).await {
            Ok(requests) => {
                self.cache
                    .store(key, generation, CachedView::Requests(requests.clone()));
                requests
            }
            Err(err) => {
                warn!(
                    operation = binding(kind).pending_operation,
                    error = %err,
                    "pending queue unavailable, serving empty list"
                );
                Vec::new()
            }
        }
    }

    pub async fn pending_counts(&self) -> Vec<(StakeholderKind, usize)> {
        let mut counts = Vec::with_capacity(StakeholderKind::ALL.len());
        for kind in StakeholderKind::ALL {
            counts.push((kind, self.list_pending(kind).await.len()));
        }
        counts
    }
}
