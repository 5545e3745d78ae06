use async_trait::async_trait;

use super::domain::{
    ApprovedEntity, IllegalTransition, Location, MemberType, RegistrationRequest, RequestId,
    RequesterId, StakeholderKind,
};

/// Remote data service contract. The store owns persistence, identity resolution,
/// and serialization of conflicting transitions on the same request.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Persist a new request, stamping `requester` from the caller identity.
    async fn submit(
        &self,
        request: RegistrationRequest,
        caller: Option<RequesterId>,
    ) -> Result<RegistrationRequest, RemoteError>;

    async fn pending(&self, kind: StakeholderKind)
        -> Result<Vec<RegistrationRequest>, RemoteError>;

    /// Transition `Pending -> Approved` and materialize the verified entity.
    async fn approve(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
    ) -> Result<ApprovedEntity, RemoteError>;

    /// Transition `Pending -> Rejected`.
    async fn reject(&self, kind: StakeholderKind, id: &RequestId) -> Result<(), RemoteError>;

    async fn approved_entities(
        &self,
        member_type: MemberType,
    ) -> Result<Vec<ApprovedEntity>, RemoteError>;

    /// Collapsed projection of every approved stakeholder's location.
    async fn approved_locations(&self) -> Result<Vec<Location>, RemoteError>;
}

/// Failure reported by the remote data service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("remote data service unavailable: {0}")]
    Unavailable(String),
    #[error("request {0} already exists")]
    Conflict(RequestId),
    #[error("request {0} not found")]
    NotFound(RequestId),
    #[error("request {id}: {source}")]
    InvalidTransition {
        id: RequestId,
        #[source]
        source: IllegalTransition,
    },
    #[error("remote data service refused the call: {0}")]
    Refused(String),
}

impl RemoteError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RemoteError::Unavailable(_))
    }
}
