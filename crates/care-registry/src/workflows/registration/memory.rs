use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use super::domain::{
    ApprovedEntity, Location, MemberType, RegistrationRequest, RequestId, RequestStatus,
    RequesterId, ReviewDecision, StakeholderKind,
};
use super::store::{RegistrationStore, RemoteError};

#[derive(Debug, Default)]
struct StoreState {
    requests: BTreeMap<RequestId, RegistrationRequest>,
    entities: Vec<ApprovedEntity>,
}

/// Process-local stand-in for the remote data service.
///
/// Transitions on the same request are serialized by a single lock, so the first
/// decision to land wins and any later one fails with an invalid transition.
#[derive(Debug, Default)]
pub struct InMemoryRegistrationStore {
    state: Mutex<StoreState>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directory record directly, bypassing the approval flow.
    pub fn seed_entity(&self, entity: ApprovedEntity) -> Result<(), RemoteError> {
        let mut state = self.lock()?;
        upsert_entity(&mut state.entities, entity);
        Ok(())
    }

    /// Current status of a request regardless of kind, for reconciliation and tests.
    pub fn status_of(&self, id: &RequestId) -> Result<Option<RequestStatus>, RemoteError> {
        let state = self.lock()?;
        Ok(state.requests.get(id).map(|request| request.status))
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RemoteError> {
        self.state
            .lock()
            .map_err(|_| RemoteError::Unavailable("store lock poisoned".to_string()))
    }

    fn transition(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
        decision: ReviewDecision,
    ) -> Result<Option<ApprovedEntity>, RemoteError> {
        let mut state = self.lock()?;
        let request = state
            .requests
            .get_mut(id)
            .filter(|request| request.kind() == kind)
            .ok_or_else(|| RemoteError::NotFound(id.clone()))?;

        request.status = request
            .status
            .apply(decision)
            .map_err(|source| RemoteError::InvalidTransition {
                id: id.clone(),
                source,
            })?;
        debug!(%id, %kind, status = %request.status, "request transitioned");

        if decision == ReviewDecision::Reject {
            return Ok(None);
        }

        let entity = request.to_approved_entity();
        upsert_entity(&mut state.entities, entity.clone());
        Ok(Some(entity))
    }
}

fn upsert_entity(entities: &mut Vec<ApprovedEntity>, entity: ApprovedEntity) {
    match entities.iter_mut().find(|existing| existing.id == entity.id) {
        Some(existing) => *existing = entity,
        None => entities.push(entity),
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn submit(
        &self,
        mut request: RegistrationRequest,
        caller: Option<RequesterId>,
    ) -> Result<RegistrationRequest, RemoteError> {
        let mut state = self.lock()?;
        if state.requests.contains_key(&request.id) {
            return Err(RemoteError::Conflict(request.id));
        }
        if request.status != RequestStatus::Pending {
            return Err(RemoteError::Refused(format!(
                "new requests must be pending, found {}",
                request.status
            )));
        }

        request.requester = caller;
        state.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn pending(
        &self,
        kind: StakeholderKind,
    ) -> Result<Vec<RegistrationRequest>, RemoteError> {
        let state = self.lock()?;
        Ok(state
            .requests
            .values()
            .filter(|request| request.kind() == kind && request.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn approve(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
    ) -> Result<ApprovedEntity, RemoteError> {
        self.transition(kind, id, ReviewDecision::Approve)?
            .ok_or_else(|| RemoteError::NotFound(id.clone()))
    }

    async fn reject(&self, kind: StakeholderKind, id: &RequestId) -> Result<(), RemoteError> {
        self.transition(kind, id, ReviewDecision::Reject).map(|_| ())
    }

    async fn approved_entities(
        &self,
        member_type: MemberType,
    ) -> Result<Vec<ApprovedEntity>, RemoteError> {
        let state = self.lock()?;
        Ok(state
            .entities
            .iter()
            .filter(|entity| entity.member_type() == member_type)
            .cloned()
            .collect())
    }

    async fn approved_locations(&self) -> Result<Vec<Location>, RemoteError> {
        let state = self.lock()?;
        Ok(state
            .entities
            .iter()
            .filter(|entity| entity.verified)
            .map(|entity| entity.location.clone())
            .collect())
    }
}
