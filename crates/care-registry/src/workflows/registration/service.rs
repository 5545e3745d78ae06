use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::approval::{ApprovalError, ApprovalStateMachine, TransitionOutcome};
use super::builder::{FormError, RegistrationForm};
use super::cache::QueryCache;
use super::directory::{DirectoryAggregator, MemberQuery};
use super::domain::{
    ApprovedEntity, LocationGroup, MemberType, RegistrationRequest, RequestId, RequesterId,
    StakeholderKind, UnifiedMember,
};
use super::gateway::{SubmissionError, SubmissionGateway};
use super::locations::LocationAggregator;
use super::pending::PendingQueueReader;
use super::store::RegistrationStore;

/// Facade composing the gateway, state machine, readers, and the shared query cache.
pub struct RegistrationPortal<S> {
    cache: Arc<QueryCache>,
    gateway: SubmissionGateway<S>,
    approvals: ApprovalStateMachine<S>,
    pending: PendingQueueReader<S>,
    directory: DirectoryAggregator<S>,
    locations: LocationAggregator<S>,
}

impl<S> RegistrationPortal<S>
where
    S: RegistrationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_cache(store, Arc::new(QueryCache::new()))
    }

    pub fn with_cache(store: Arc<S>, cache: Arc<QueryCache>) -> Self {
        Self {
            gateway: SubmissionGateway::new(store.clone(), cache.clone()),
            approvals: ApprovalStateMachine::new(store.clone(), cache.clone()),
            pending: PendingQueueReader::new(store.clone(), cache.clone()),
            directory: DirectoryAggregator::new(store.clone(), cache.clone()),
            locations: LocationAggregator::new(store, cache.clone()),
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Validate a form, build a fresh pending request, and submit it.
    pub async fn register(
        &self,
        form: RegistrationForm,
        caller: Option<RequesterId>,
    ) -> Result<RegistrationRequest, RegistrationError> {
        let kind = form.kind();
        let request = form.build(Utc::now())?;
        Ok(self.gateway.submit(kind, request, caller).await?)
    }

    pub async fn submit(
        &self,
        kind: StakeholderKind,
        request: RegistrationRequest,
        caller: Option<RequesterId>,
    ) -> Result<RegistrationRequest, RegistrationError> {
        Ok(self.gateway.submit(kind, request, caller).await?)
    }

    pub async fn approve(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
    ) -> Result<TransitionOutcome, RegistrationError> {
        Ok(self.approvals.approve(kind, id).await?)
    }

    pub async fn reject(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
    ) -> Result<TransitionOutcome, RegistrationError> {
        Ok(self.approvals.reject(kind, id).await?)
    }

    pub async fn list_pending(&self, kind: StakeholderKind) -> Vec<RegistrationRequest> {
        self.pending.list_pending(kind).await
    }

    pub async fn list_approved(&self, member_type: MemberType) -> Vec<ApprovedEntity> {
        self.directory.list_approved(member_type).await
    }

    pub async fn list_approved_members(&self) -> Vec<UnifiedMember> {
        self.directory.list_approved_members().await
    }

    pub async fn search_members(&self, query: &MemberQuery) -> Vec<UnifiedMember> {
        self.directory.search_members(query).await
    }

    pub async fn list_location_groups(&self) -> Vec<LocationGroup> {
        self.locations.list_location_groups().await
    }

    /// Pending counts per kind plus directory totals for the admin dashboard.
    pub async fn dashboard(&self) -> DashboardSummary {
        let pending = self
            .pending
            .pending_counts()
            .await
            .into_iter()
            .map(|(kind, count)| PendingCount { kind, count })
            .collect::<Vec<_>>();
        let total_pending = pending.iter().map(|entry| entry.count).sum();
        let (members, groups) = tokio::join!(
            self.directory.list_approved_members(),
            self.locations.list_location_groups()
        );

        DashboardSummary {
            pending,
            total_pending,
            approved_members: members.len(),
            location_groups: groups.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCount {
    pub kind: StakeholderKind,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub pending: Vec<PendingCount>,
    pub total_pending: usize,
    pub approved_members: usize,
    pub location_groups: usize,
}

/// Error raised by the registration portal.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Approval(#[from] ApprovalError),
}
