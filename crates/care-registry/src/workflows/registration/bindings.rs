use super::cache::QueryKey;
use super::domain::{MemberType, ReviewDecision, StakeholderKind};

/// Per-kind wiring for the generic submit/approve/reject operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindBinding {
    pub kind: StakeholderKind,
    pub id_prefix: &'static str,
    pub display_name: &'static str,
    pub submit_operation: &'static str,
    pub pending_operation: &'static str,
    pub approve_operation: &'static str,
    pub reject_operation: &'static str,
    /// Directory the approved entity is materialized into.
    pub directory: MemberType,
}

static BINDINGS: [KindBinding; 4] = [
    KindBinding {
        kind: StakeholderKind::Professional,
        id_prefix: "prof",
        display_name: "Healthcare professional",
        submit_operation: "submitProfessionalRegistration",
        pending_operation: "getProfessionalPendingRequests",
        approve_operation: "approveProfessional",
        reject_operation: "rejectProfessional",
        directory: MemberType::Professional,
    },
    KindBinding {
        kind: StakeholderKind::Vendor,
        id_prefix: "vendor",
        display_name: "Vendor",
        submit_operation: "submitVendorRegistration",
        pending_operation: "getVendorPendingRequests",
        approve_operation: "approveVendor",
        reject_operation: "rejectVendor",
        directory: MemberType::Vendor,
    },
    KindBinding {
        kind: StakeholderKind::Ngo,
        id_prefix: "ngo",
        display_name: "NGO",
        submit_operation: "submitNgoRegistration",
        pending_operation: "getNgoPendingRequests",
        approve_operation: "approveNgo",
        reject_operation: "rejectNgo",
        directory: MemberType::Ngo,
    },
    KindBinding {
        kind: StakeholderKind::Ambulance,
        id_prefix: "ambulance",
        display_name: "Ambulance service",
        submit_operation: "submitAmbulanceRegistration",
        pending_operation: "getAmbulancePendingRequests",
        approve_operation: "approveAmbulance",
        reject_operation: "rejectAmbulance",
        directory: MemberType::Professional,
    },
];

pub fn binding(kind: StakeholderKind) -> &'static KindBinding {
    match kind {
        StakeholderKind::Professional => &BINDINGS[0],
        StakeholderKind::Vendor => &BINDINGS[1],
        StakeholderKind::Ngo => &BINDINGS[2],
        StakeholderKind::Ambulance => &BINDINGS[3],
    }
}

pub fn bindings() -> &'static [KindBinding] {
    &BINDINGS
}

impl KindBinding {
    pub fn operation(&self, decision: ReviewDecision) -> &'static str {
        match decision {
            ReviewDecision::Approve => self.approve_operation,
            ReviewDecision::Reject => self.reject_operation,
        }
    }

    /// True when `id` carries this kind's `<prefix>_` marker.
    pub fn owns_id(&self, id: &str) -> bool {
        id.strip_prefix(self.id_prefix)
            .is_some_and(|rest| rest.starts_with('_') && rest.len() > 1)
    }

    /// Read views a successful submission makes stale.
    pub fn submit_invalidates(&self) -> Vec<QueryKey> {
        vec![QueryKey::PendingQueue(self.kind)]
    }

    /// Read views a successful decision makes stale.
    pub fn decision_invalidates(&self, decision: ReviewDecision) -> Vec<QueryKey> {
        match decision {
            ReviewDecision::Approve => vec![
                QueryKey::PendingQueue(self.kind),
                QueryKey::ApprovedList(self.directory),
                QueryKey::ApprovedMembers,
                QueryKey::LocationGroups,
            ],
            ReviewDecision::Reject => vec![QueryKey::PendingQueue(self.kind)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_binding() {
        for kind in StakeholderKind::ALL {
            assert_eq!(binding(kind).kind, kind);
        }
        assert_eq!(bindings().len(), StakeholderKind::ALL.len());
    }

    #[test]
    fn owns_id_requires_prefix_and_separator() {
        let vendor = binding(StakeholderKind::Vendor);
        assert!(vendor.owns_id("vendor_1000"));
        assert!(!vendor.owns_id("vendor_"));
        assert!(!vendor.owns_id("vendors_1000"));
        assert!(!vendor.owns_id("ngo_1000"));
    }

    #[test]
    fn ambulance_approval_refreshes_professional_directory() {
        let keys = binding(StakeholderKind::Ambulance).decision_invalidates(ReviewDecision::Approve);
        assert!(keys.contains(&QueryKey::ApprovedList(MemberType::Professional)));
        assert!(keys.contains(&QueryKey::ApprovedMembers));
    }

    #[test]
    fn rejection_only_refreshes_the_pending_queue() {
        let keys = binding(StakeholderKind::Ngo).decision_invalidates(ReviewDecision::Reject);
        assert_eq!(keys, vec![QueryKey::PendingQueue(StakeholderKind::Ngo)]);
    }
}
