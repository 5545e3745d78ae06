use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Notify;

use crate::workflows::registration::builder::RegistrationForm;
use crate::workflows::registration::domain::{
    ApprovedEntity, Contact, CredentialRef, EntityDetails, KindDetails, Location, MemberType,
    NgoDetails, ProfessionalDetails, RegistrationRequest, RequestId, RequesterId,
    StakeholderKind, VendorDetails,
};
use crate::workflows::registration::memory::InMemoryRegistrationStore;
use crate::workflows::registration::service::RegistrationPortal;
use crate::workflows::registration::store::{RegistrationStore, RemoteError};

pub(super) fn location(city: &str, state: &str) -> Location {
    Location {
        city: city.to_string(),
        state: state.to_string(),
        country: "India".to_string(),
    }
}

pub(super) fn contact() -> Contact {
    Contact {
        email: "hello@care.example".to_string(),
        phone: "9876543210".to_string(),
        address: "4 Station Road".to_string(),
        website: "https://care.example".to_string(),
    }
}

pub(super) fn professional_form() -> RegistrationForm {
    RegistrationForm {
        name: "Dr. Meera Kulkarni".to_string(),
        contact: contact(),
        location: location("Pune", "Maharashtra"),
        details: KindDetails::Professional(ProfessionalDetails {
            role: "Physiotherapist".to_string(),
            experience: 8,
            credentials: vec![CredentialRef {
                name: "License".to_string(),
                storage_key: "credentials/meera/license.pdf".to_string(),
            }],
            specialties: vec!["Sports injury".to_string()],
        }),
    }
}

pub(super) fn vendor_form() -> RegistrationForm {
    RegistrationForm {
        name: "MedSupply Traders".to_string(),
        contact: contact(),
        location: location("Mumbai", "Maharashtra"),
        details: KindDetails::Vendor(VendorDetails {
            category: "Medical equipment".to_string(),
            products: vec!["Wheelchairs".to_string(), "Oxygen concentrators".to_string()],
        }),
    }
}

pub(super) fn ngo_form(name: &str, city: &str, state: &str) -> RegistrationForm {
    RegistrationForm {
        name: name.to_string(),
        contact: contact(),
        location: location(city, state),
        details: KindDetails::Ngo(NgoDetails {
            focus_area: "Maternal health".to_string(),
            registration_no: "MH/2019/0042".to_string(),
            services: vec!["Awareness camps".to_string()],
        }),
    }
}

pub(super) fn ambulance_form() -> RegistrationForm {
    RegistrationForm {
        name: "Lifeline Ambulance".to_string(),
        contact: contact(),
        location: location("Pune", "Maharashtra"),
        details: KindDetails::Ambulance,
    }
}

pub(super) fn request(form: RegistrationForm, id: &str) -> RegistrationRequest {
    form.build_with_id(RequestId::from(id))
        .expect("fixture form is valid")
}

pub(super) fn caller() -> Option<RequesterId> {
    Some(RequesterId("admin-test".to_string()))
}

pub(super) fn build_portal() -> (
    RegistrationPortal<InMemoryRegistrationStore>,
    Arc<InMemoryRegistrationStore>,
) {
    let store = Arc::new(InMemoryRegistrationStore::new());
    let portal = RegistrationPortal::new(store.clone());
    (portal, store)
}

pub(super) fn unverified_vendor(id: &str) -> ApprovedEntity {
    ApprovedEntity {
        id: RequestId::from(id),
        name: "Legacy Vendor".to_string(),
        contact: contact(),
        location: location("Nagpur", "Maharashtra"),
        verified: false,
        details: EntityDetails::Vendor(VendorDetails {
            category: "Pharmacy".to_string(),
            products: Vec::new(),
        }),
    }
}

/// Store wrapper counting remote reads so cache behavior can be asserted.
#[derive(Default)]
pub(super) struct CountingStore {
    pub(super) inner: InMemoryRegistrationStore,
    pub(super) pending_reads: AtomicUsize,
    pub(super) entity_reads: AtomicUsize,
    pub(super) location_reads: AtomicUsize,
}

impl CountingStore {
    pub(super) fn pending_reads(&self) -> usize {
        self.pending_reads.load(Ordering::SeqCst)
    }

    pub(super) fn entity_reads(&self) -> usize {
        self.entity_reads.load(Ordering::SeqCst)
    }

    pub(super) fn location_reads(&self) -> usize {
        self.location_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistrationStore for CountingStore {
    async fn submit(
        &self,
        request: RegistrationRequest,
        caller: Option<RequesterId>,
    ) -> Result<RegistrationRequest, RemoteError> {
        self.inner.submit(request, caller).await
    }

    async fn pending(
        &self,
        kind: StakeholderKind,
    ) -> Result<Vec<RegistrationRequest>, RemoteError> {
        self.pending_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.pending(kind).await
    }

    async fn approve(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
    ) -> Result<ApprovedEntity, RemoteError> {
        self.inner.approve(kind, id).await
    }

    async fn reject(&self, kind: StakeholderKind, id: &RequestId) -> Result<(), RemoteError> {
        self.inner.reject(kind, id).await
    }

    async fn approved_entities(
        &self,
        member_type: MemberType,
    ) -> Result<Vec<ApprovedEntity>, RemoteError> {
        self.entity_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.approved_entities(member_type).await
    }

    async fn approved_locations(&self) -> Result<Vec<Location>, RemoteError> {
        self.location_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.approved_locations().await
    }
}

/// Store whose next armed read takes its snapshot and then parks until released,
/// so a mutation can complete while that read is still in flight.
#[derive(Default)]
pub(super) struct GatedStore {
    pub(super) inner: InMemoryRegistrationStore,
    hold_pending: AtomicBool,
    hold_entities: AtomicBool,
    entered: Notify,
    gate: Notify,
}

impl GatedStore {
    pub(super) fn hold_next_pending_read(&self) {
        self.hold_pending.store(true, Ordering::SeqCst);
    }

    pub(super) fn hold_next_entity_read(&self) {
        self.hold_entities.store(true, Ordering::SeqCst);
    }

    /// Resolves once the held read has its snapshot.
    pub(super) async fn read_parked(&self) {
        self.entered.notified().await;
    }

    pub(super) fn release(&self) {
        self.gate.notify_one();
    }

    async fn park_if_held(&self, held: &AtomicBool) {
        if held.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.gate.notified().await;
        }
    }
}

#[async_trait]
impl RegistrationStore for GatedStore {
    async fn submit(
        &self,
        request: RegistrationRequest,
        caller: Option<RequesterId>,
    ) -> Result<RegistrationRequest, RemoteError> {
        self.inner.submit(request, caller).await
    }

    async fn pending(
        &self,
        kind: StakeholderKind,
    ) -> Result<Vec<RegistrationRequest>, RemoteError> {
        let snapshot = self.inner.pending(kind).await;
        self.park_if_held(&self.hold_pending).await;
        snapshot
    }

    async fn approve(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
    ) -> Result<ApprovedEntity, RemoteError> {
        self.inner.approve(kind, id).await
    }

    async fn reject(&self, kind: StakeholderKind, id: &RequestId) -> Result<(), RemoteError> {
        self.inner.reject(kind, id).await
    }

    async fn approved_entities(
        &self,
        member_type: MemberType,
    ) -> Result<Vec<ApprovedEntity>, RemoteError> {
        let snapshot = self.inner.approved_entities(member_type).await;
        self.park_if_held(&self.hold_entities).await;
        snapshot
    }

    async fn approved_locations(&self) -> Result<Vec<Location>, RemoteError> {
        self.inner.approved_locations().await
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl RegistrationStore for UnavailableStore {
    async fn submit(
        &self,
        _request: RegistrationRequest,
        _caller: Option<RequesterId>,
    ) -> Result<RegistrationRequest, RemoteError> {
        Err(RemoteError::Unavailable("service offline".to_string()))
    }

    async fn pending(
        &self,
        _kind: StakeholderKind,
    ) -> Result<Vec<RegistrationRequest>, RemoteError> {
        Err(RemoteError::Unavailable("service offline".to_string()))
    }

    async fn approve(
        &self,
        _kind: StakeholderKind,
        _id: &RequestId,
    ) -> Result<ApprovedEntity, RemoteError> {
        Err(RemoteError::Unavailable("service offline".to_string()))
    }

    async fn reject(&self, _kind: StakeholderKind, _id: &RequestId) -> Result<(), RemoteError> {
        Err(RemoteError::Unavailable("service offline".to_string()))
    }

    async fn approved_entities(
        &self,
        _member_type: MemberType,
    ) -> Result<Vec<ApprovedEntity>, RemoteError> {
        Err(RemoteError::Unavailable("service offline".to_string()))
    }

    async fn approved_locations(&self) -> Result<Vec<Location>, RemoteError> {
        Err(RemoteError::Unavailable("service offline".to_string()))
    }
}

/// Healthy store whose vendor directory is unreachable.
#[derive(Default)]
pub(super) struct VendorOutageStore {
    pub(super) inner: InMemoryRegistrationStore,
}

#[async_trait]
impl RegistrationStore for VendorOutageStore {
    async fn submit(
        &self,
        request: RegistrationRequest,
        caller: Option<RequesterId>,
    ) -> Result<RegistrationRequest, RemoteError> {
        self.inner.submit(request, caller).await
    }

    async fn pending(
        &self,
        kind: StakeholderKind,
    ) -> Result<Vec<RegistrationRequest>, RemoteError> {
        self.inner.pending(kind).await
    }

    async fn approve(
        &self,
        kind: StakeholderKind,
        id: &RequestId,
    ) -> Result<ApprovedEntity, RemoteError> {
        self.inner.approve(kind, id).await
    }

    async fn reject(&self, kind: StakeholderKind, id: &RequestId) -> Result<(), RemoteError> {
        self.inner.reject(kind, id).await
    }

    async fn approved_entities(
        &self,
        member_type: MemberType,
    ) -> Result<Vec<ApprovedEntity>, RemoteError> {
        if member_type == MemberType::Vendor {
            return Err(RemoteError::Unavailable("vendor index rebuilding".to_string()));
        }
        self.inner.approved_entities(member_type).await
    }

    async fn approved_locations(&self) -> Result<Vec<Location>, RemoteError> {
        self.inner.approved_locations().await
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
