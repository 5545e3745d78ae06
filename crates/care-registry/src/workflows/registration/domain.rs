use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted registrations.
///
/// Client-generated as `<kind-prefix>_<epoch-millis>`; opaque to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Authenticated caller identity attached by the remote store on submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterId(pub String);

/// The four registrant categories sharing the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeholderKind {
    Professional,
    Vendor,
    Ngo,
    Ambulance,
}

impl StakeholderKind {
    pub const ALL: [StakeholderKind; 4] = [
        StakeholderKind::Professional,
        StakeholderKind::Vendor,
        StakeholderKind::Ngo,
        StakeholderKind::Ambulance,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            StakeholderKind::Professional => "professional",
            StakeholderKind::Vendor => "vendor",
            StakeholderKind::Ngo => "ngo",
            StakeholderKind::Ambulance => "ambulance",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "professional" | "professionals" | "prof" => Some(Self::Professional),
            "vendor" | "vendors" => Some(Self::Vendor),
            "ngo" | "ngos" => Some(Self::Ngo),
            "ambulance" | "ambulances" => Some(Self::Ambulance),
            _ => None,
        }
    }
}

impl fmt::Display for StakeholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Directory-facing member categories. Ambulance operators surface as professionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Professional,
    Vendor,
    Ngo,
}

impl MemberType {
    pub const ALL: [MemberType; 3] = [MemberType::Professional, MemberType::Vendor, MemberType::Ngo];

    pub const fn label(self) -> &'static str {
        match self {
            MemberType::Professional => "professional",
            MemberType::Vendor => "vendor",
            MemberType::Ngo => "ngo",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "professional" | "professionals" => Some(Self::Professional),
            "vendor" | "vendors" => Some(Self::Vendor),
            "ngo" | "ngos" => Some(Self::Ngo),
            _ => None,
        }
    }
}

/// Lifecycle status of a registration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Apply an administrator decision. Terminal states absorb every decision.
    pub fn apply(self, decision: ReviewDecision) -> Result<RequestStatus, IllegalTransition> {
        match (self, decision) {
            (RequestStatus::Pending, ReviewDecision::Approve) => Ok(RequestStatus::Approved),
            (RequestStatus::Pending, ReviewDecision::Reject) => Ok(RequestStatus::Rejected),
            (from, decision) => Err(IllegalTransition { from, decision }),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Administrator decision driving a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewDecision::Approve => "approve",
            ReviewDecision::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {} a request that is already {from}", .decision.label())]
pub struct IllegalTransition {
    pub from: RequestStatus,
    pub decision: ReviewDecision,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub website: String,
}

/// Free-text location. Never normalized; grouping compares the literal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalDetails {
    pub role: String,
    pub experience: u32,
    #[serde(default)]
    pub credentials: Vec<CredentialRef>,
    #[serde(default)]
    pub specialties: Vec<String>,
}

/// Reference to an uploaded credential held by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRef {
    pub name: String,
    pub storage_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorDetails {
    pub category: String,
    #[serde(default)]
    pub products: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgoDetails {
    pub focus_area: String,
    pub registration_no: String,
    #[serde(default)]
    pub services: Vec<String>,
}

/// Kind-specific registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum KindDetails {
    Professional(ProfessionalDetails),
    Vendor(VendorDetails),
    Ngo(NgoDetails),
    Ambulance,
}

impl KindDetails {
    pub const fn kind(&self) -> StakeholderKind {
        match self {
            KindDetails::Professional(_) => StakeholderKind::Professional,
            KindDetails::Vendor(_) => StakeholderKind::Vendor,
            KindDetails::Ngo(_) => StakeholderKind::Ngo,
            KindDetails::Ambulance => StakeholderKind::Ambulance,
        }
    }
}

/// Normalized registration record as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub id: RequestId,
    pub status: RequestStatus,
    /// Placeholder at build time; the remote store fills it from the caller identity.
    pub requester: Option<RequesterId>,
    pub name: String,
    pub contact: Contact,
    pub location: Location,
    pub details: KindDetails,
}

impl RegistrationRequest {
    pub fn kind(&self) -> StakeholderKind {
        self.details.kind()
    }

    /// Build the directory record the remote store materializes on approval.
    pub fn to_approved_entity(&self) -> ApprovedEntity {
        let details = match &self.details {
            KindDetails::Professional(details) => EntityDetails::Professional(details.clone()),
            KindDetails::Vendor(details) => EntityDetails::Vendor(details.clone()),
            KindDetails::Ngo(details) => EntityDetails::Ngo(details.clone()),
            KindDetails::Ambulance => EntityDetails::Professional(ProfessionalDetails {
                role: AMBULANCE_ROLE.to_string(),
                ..ProfessionalDetails::default()
            }),
        };

        ApprovedEntity {
            id: self.id.clone(),
            name: self.name.clone(),
            contact: self.contact.clone(),
            location: self.location.clone(),
            verified: true,
            details,
        }
    }
}

/// Role assigned to the professional-like record created for an approved ambulance operator.
pub const AMBULANCE_ROLE: &str = "Ambulance";

/// Directory payload of an approved entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityDetails {
    Professional(ProfessionalDetails),
    Vendor(VendorDetails),
    Ngo(NgoDetails),
}

/// Entity visible in the public directories once its registration is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedEntity {
    pub id: RequestId,
    pub name: String,
    pub contact: Contact,
    pub location: Location,
    pub verified: bool,
    pub details: EntityDetails,
}

impl ApprovedEntity {
    pub const fn member_type(&self) -> MemberType {
        match self.details {
            EntityDetails::Professional(_) => MemberType::Professional,
            EntityDetails::Vendor(_) => MemberType::Vendor,
            EntityDetails::Ngo(_) => MemberType::Ngo,
        }
    }
}

/// Kind-tagged view of an approved entity for cross-kind browsing. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedMember {
    #[serde(rename = "memberType")]
    pub member_type: MemberType,
    pub data: ApprovedEntity,
}

/// Count of approved stakeholders sharing an identical city/state pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationGroup {
    pub city: String,
    pub state: String,
    pub country: String,
    pub count: usize,
}

impl LocationGroup {
    pub fn key(&self) -> String {
        location_key(&self.city, &self.state)
    }
}

pub(crate) fn location_key(city: &str, state: &str) -> String {
    format!("{city}, {state}")
}
