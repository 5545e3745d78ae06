use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use super::domain::{
    ApprovedEntity, LocationGroup, MemberType, RegistrationRequest, StakeholderKind,
    UnifiedMember,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Named read views held by the query cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "view", content = "scope", rename_all = "snake_case")]
pub enum QueryKey {
    PendingQueue(StakeholderKind),
    ApprovedList(MemberType),
    ApprovedMembers,
    LocationGroups,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::PendingQueue(kind) => write!(f, "pending:{kind}"),
            QueryKey::ApprovedList(member_type) => write!(f, "approved:{}", member_type.label()),
            QueryKey::ApprovedMembers => f.write_str("approved-members"),
            QueryKey::LocationGroups => f.write_str("location-groups"),
        }
    }
}

/// Cached payload for one read view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedView {
    Requests(Vec<RegistrationRequest>),
    Entities(Vec<ApprovedEntity>),
    Members(Vec<UnifiedMember>),
    Locations(Vec<LocationGroup>),
}

/// Mutation that triggered an invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationCause {
    Submitted,
    Approved,
    Rejected,
    TransitionFailed,
}

/// Notification that the named views must be refetched on their next read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationEvent {
    pub cause: InvalidationCause,
    pub kind: StakeholderKind,
    pub keys: Vec<QueryKey>,
}

#[derive(Debug)]
struct CacheEntry {
    view: CachedView,
    stale: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    /// Bumped on every invalidation, whether or not the key holds a view yet.
    generations: HashMap<QueryKey, u64>,
}

impl CacheState {
    fn generation(&self, key: &QueryKey) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }
}

/// Query cache keyed by operation and kind. Entries only go stale through explicit events.
///
/// Readers take [`QueryCache::generation`] before fetching and hand it back to
/// [`QueryCache::store`]; a snapshot fetched across an invalidation is dropped
/// instead of being cached as fresh.
pub struct QueryCache {
    state: RwLock<CacheState>,
    events: broadcast::Sender<InvalidationEvent>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(CacheState::default()),
            events,
        }
    }

    /// Fresh cached view, or `None` when the entry is missing or stale.
    pub fn fresh(&self, key: &QueryKey) -> Option<CachedView> {
        let state = self.state.read().ok()?;
        state
            .entries
            .get(key)
            .filter(|entry| !entry.stale)
            .map(|entry| entry.view.clone())
    }

    /// Invalidation counter for `key`, read before fetching from the store.
    pub fn generation(&self, key: &QueryKey) -> u64 {
        self.state
            .read()
            .map(|state| state.generation(key))
            .unwrap_or(u64::MAX)
    }

    /// Cache `view` only if `key` has not been invalidated since `generation`.
    /// Returns whether the view was kept.
    pub fn store(&self, key: QueryKey, generation: u64, view: CachedView) -> bool {
        let Ok(mut state) = self.state.write() else {
            return false;
        };
        if state.generation(&key) != generation {
            debug!(key = %key, "discarding view fetched before an invalidation");
            return false;
        }
        state.entries.insert(key, CacheEntry { view, stale: false });
        true
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.state
            .read()
            .map(|state| state.entries.get(key).map_or(true, |entry| entry.stale))
            .unwrap_or(true)
    }

    /// Mark every key in the event stale and notify subscribers. Never blocks on listeners.
    pub fn apply(&self, event: InvalidationEvent) {
        if let Ok(mut state) = self.state.write() {
            for key in &event.keys {
                *state.generations.entry(*key).or_insert(0) += 1;
                if let Some(entry) = state.entries.get_mut(key) {
                    entry.stale = true;
                }
            }
        }

        debug!(cause = ?event.cause, kind = %event.kind, keys = ?event.keys, "read views invalidated");
        // No receivers is fine; the stale flags already force the next read to refetch.
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InvalidationEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(keys: Vec<QueryKey>) -> InvalidationEvent {
        InvalidationEvent {
            cause: InvalidationCause::Approved,
            kind: StakeholderKind::Vendor,
            keys,
        }
    }

    #[test]
    fn stored_views_are_fresh_until_invalidated() {
        let cache = QueryCache::new();
        let key = QueryKey::PendingQueue(StakeholderKind::Vendor);
        assert!(cache.fresh(&key).is_none());
        assert!(cache.is_stale(&key));

        assert!(cache.store(key, cache.generation(&key), CachedView::Requests(Vec::new())));
        assert_eq!(cache.fresh(&key), Some(CachedView::Requests(Vec::new())));

        cache.apply(event(vec![key]));
        assert!(cache.fresh(&key).is_none());
        assert!(cache.is_stale(&key));
    }

    #[test]
    fn invalidation_leaves_unrelated_views_fresh() {
        let cache = QueryCache::new();
        let pending = QueryKey::PendingQueue(StakeholderKind::Ngo);
        let members = QueryKey::ApprovedMembers;
        cache.store(pending, 0, CachedView::Requests(Vec::new()));
        cache.store(members, 0, CachedView::Members(Vec::new()));

        cache.apply(event(vec![members]));

        assert!(cache.fresh(&pending).is_some());
        assert!(cache.fresh(&members).is_none());
    }

    #[test]
    fn view_fetched_across_an_invalidation_is_not_cached() {
        let cache = QueryCache::new();
        let key = QueryKey::PendingQueue(StakeholderKind::Vendor);
        let before = cache.generation(&key);

        cache.apply(event(vec![key]));

        assert!(!cache.store(key, before, CachedView::Requests(Vec::new())));
        assert!(cache.fresh(&key).is_none());
        assert!(cache.is_stale(&key));

        let after = cache.generation(&key);
        assert_ne!(before, after);
        assert!(cache.store(key, after, CachedView::Requests(Vec::new())));
        assert!(cache.fresh(&key).is_some());
    }

    #[tokio::test]
    async fn subscribers_receive_invalidation_events() {
        let cache = QueryCache::new();
        let mut receiver = cache.subscribe();

        cache.apply(event(vec![QueryKey::LocationGroups]));

        let received = receiver.recv().await.expect("event delivered");
        assert_eq!(received.keys, vec![QueryKey::LocationGroups]);
        assert_eq!(received.cause, InvalidationCause::Approved);
    }
}
