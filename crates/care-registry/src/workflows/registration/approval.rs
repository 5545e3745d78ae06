use std::sync::Arc;

use tracing::{info, warn};

use super::bindings::binding;
use super::cache::{InvalidationCause, InvalidationEvent, QueryCache, QueryKey};
use super::domain::{
    ApprovedEntity, IllegalTransition, RequestId, ReviewDecision, StakeholderKind,
};
use super::store::{RegistrationStore, RemoteError};

/// Result of a successful administrator decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub kind: StakeholderKind,
    pub id: RequestId,
    pub decision: ReviewDecision,
    /// Present only for approvals.
    pub entity: Option<ApprovedEntity>,
    pub invalidated: Vec<QueryKey>,
}

/// Drives `Pending -> Approved | Rejected` through the remote store.
///
/// Legality is enforced by the store, which serializes decisions per request; this
/// layer dispatches by kind, reports failures verbatim, and fans out invalidations.
pub struct ApprovalStateMachine<S> {
    store: Arc<S>,
    cache: Arc<QueryCache>,
}

impl<S> ApprovalStateMachine<S>
where
    S: RegistrationStore + 'static,
{
    pub fn new(store: Arc<S>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    pub async fn approve(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
    ) -> Result<TransitionOutcome, ApprovalError> {
        self.decide(kind, id, ReviewDecision::Approve).await
    }

    pub async fn reject(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
    ) -> Result<TransitionOutcome, ApprovalError> {
        self.decide(kind, id, ReviewDecision::Reject).await
    }

    pub async fn decide(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
        decision: ReviewDecision,
    ) -> Result<TransitionOutcome, ApprovalError> {
        let binding = binding(kind);
        let operation = binding.operation(decision);

        let result = match decision {
            ReviewDecision::Approve => self.store.approve(kind, id).await.map(Some),
            ReviewDecision::Reject => self.store.reject(kind, id).await.map(|_| None),
        };

        let entity = match result {
            Ok(entity) => entity,
            Err(err) => {
                warn!(operation, %id, error = %err, "review decision failed");
                // The cached queue is never patched; stale it so the next read reconciles.
                self.cache.apply(InvalidationEvent {
                    cause: InvalidationCause::TransitionFailed,
                    kind,
                    keys: vec![QueryKey::PendingQueue(kind)],
                });
                return Err(ApprovalError::from_remote(err));
            }
        };

        let invalidated = binding.decision_invalidates(decision);
        self.cache.apply(InvalidationEvent {
            cause: match decision {
                ReviewDecision::Approve => InvalidationCause::Approved,
                ReviewDecision::Reject => InvalidationCause::Rejected,
            },
            kind,
            keys: invalidated.clone(),
        });
        info!(operation, %id, "review decision recorded");

        Ok(TransitionOutcome {
            kind,
            id: id.clone(),
            decision,
            entity,
            invalidated,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error("registration {0} is not awaiting review")]
    UnknownRequest(RequestId),
    #[error("registration {id} cannot be reviewed: {source}")]
    InvalidTransition {
        id: RequestId,
        #[source]
        source: IllegalTransition,
    },
    #[error("review failed: {0}")]
    Remote(#[source] RemoteError),
}

impl ApprovalError {
    fn from_remote(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(id) => ApprovalError::UnknownRequest(id),
            RemoteError::InvalidTransition { id, source } => {
                ApprovalError::InvalidTransition { id, source }
            }
            other => ApprovalError::Remote(other),
        }
    }

    /// A lost race against another decision; the request was already processed.
    pub fn is_informational(&self) -> bool {
        matches!(self, ApprovalError::InvalidTransition { .. })
    }
}
