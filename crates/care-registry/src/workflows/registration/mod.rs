//! Stakeholder registration intake, administrator review, and the public
//! directory views built from approved registrations.

pub mod approval;
pub mod bindings;
pub mod builder;
pub mod cache;
pub mod directory;
pub mod domain;
pub mod gateway;
pub mod locations;
pub mod memory;
pub mod pending;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use approval::{ApprovalError, ApprovalStateMachine, TransitionOutcome};
pub use bindings::{binding, bindings, KindBinding};
pub use builder::{next_request_id, FormError, RegistrationForm};
pub use cache::{CachedView, InvalidationCause, InvalidationEvent, QueryCache, QueryKey};
pub use directory::{DirectoryAggregator, MemberQuery};
pub use domain::{
    ApprovedEntity, Contact, CredentialRef, EntityDetails, IllegalTransition, KindDetails,
    Location, LocationGroup, MemberType, NgoDetails, ProfessionalDetails, RegistrationRequest,
    RequestId, RequestStatus, RequesterId, ReviewDecision, StakeholderKind, UnifiedMember,
    VendorDetails, AMBULANCE_ROLE,
};
pub use gateway::{SubmissionError, SubmissionGateway};
pub use locations::{group_locations, LocationAggregator};
pub use memory::InMemoryRegistrationStore;
pub use pending::PendingQueueReader;
pub use router::{registration_router, SubmitRegistrationBody, REQUESTER_HEADER};
pub use service::{DashboardSummary, PendingCount, RegistrationError, RegistrationPortal};
pub use store::{RegistrationStore, RemoteError};
