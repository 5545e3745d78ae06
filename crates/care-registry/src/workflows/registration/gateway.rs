use std::sync::Arc;

use tracing::{info, warn};

use super::bindings::binding;
use super::cache::{InvalidationCause, InvalidationEvent, QueryCache};
use super::domain::{RegistrationRequest, RequestStatus, RequesterId, StakeholderKind};
use super::store::{RegistrationStore, RemoteError};

/// Sends built requests to the remote store. No retries and no idempotency:
/// a resubmission under a fresh id is a new request.
pub struct SubmissionGateway<S> {
    store: Arc<S>,
    cache: Arc<QueryCache>,
}

impl<S> SubmissionGateway<S>
where
    S: RegistrationStore + 'static,
{
    pub fn new(store: Arc<S>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    pub async fn submit(
        &self,
        kind: StakeholderKind,
        request: RegistrationRequest,
        caller: Option<RequesterId>,
    ) -> Result<RegistrationRequest, SubmissionError> {
        let binding = binding(kind);
        if request.id.is_empty() {
            return Err(SubmissionError::MissingId);
        }
        if request.status != RequestStatus::Pending {
            return Err(SubmissionError::NotPending(request.status));
        }
        if request.kind() != kind || !binding.owns_id(request.id.as_str()) {
            return Err(SubmissionError::KindMismatch {
                expected: kind,
                id: request.id.to_string(),
            });
        }

        let stored = match self.store.submit(request, caller).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(operation = binding.submit_operation, error = %err, "registration submission failed");
                return Err(SubmissionError::Remote(err));
            }
        };

        self.cache.apply(InvalidationEvent {
            cause: InvalidationCause::Submitted,
            kind,
            keys: binding.submit_invalidates(),
        });
        info!(operation = binding.submit_operation, id = %stored.id, "registration submitted");

        Ok(stored)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("registration request has no id")]
    MissingId,
    #[error("only pending requests can be submitted, found {0}")]
    NotPending(RequestStatus),
    #[error("request {id} does not belong to the {expected} registration queue")]
    KindMismatch { expected: StakeholderKind, id: String },
    #[error("submission failed: {0}")]
    Remote(#[source] RemoteError),
}
