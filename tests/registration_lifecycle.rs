use std::process::Command;
use std::sync::Arc;

use care_registry::workflows::registration::{
    Contact, InMemoryRegistrationStore, KindDetails, Location, MemberType, ProfessionalDetails,
    RegistrationForm, RegistrationPortal, RequestId, StakeholderKind, AMBULANCE_ROLE,
};

fn form(name: &str, city: &str, details: KindDetails) -> RegistrationForm {
    RegistrationForm {
        name: name.to_string(),
        contact: Contact {
            email: "desk@example.in".to_string(),
            phone: "9876543210".to_string(),
            address: String::new(),
            website: String::new(),
        },
        location: Location {
            city: city.to_string(),
            state: "Karnataka".to_string(),
            country: "India".to_string(),
        },
        details,
    }
}

#[tokio::test]
async fn ambulance_operator_is_listed_as_professional_after_approval() {
    let portal = RegistrationPortal::new(Arc::new(InMemoryRegistrationStore::new()));
    let request = form("City Lifeline", "Mysuru", KindDetails::Ambulance)
        .build_with_id(RequestId::from("ambulance_4100"))
        .expect("valid ambulance form");

    portal
        .submit(StakeholderKind::Ambulance, request, None)
        .await
        .expect("submitted");
    assert_eq!(portal.list_pending(StakeholderKind::Ambulance).await.len(), 1);

    let outcome = portal
        .approve(StakeholderKind::Ambulance, &RequestId::from("ambulance_4100"))
        .await
        .expect("approved");
    let entity = outcome.entity.expect("approval publishes an entity");
    assert_eq!(entity.member_type(), MemberType::Professional);

    let professionals = portal.list_approved(MemberType::Professional).await;
    assert_eq!(professionals.len(), 1);
    assert!(portal
        .list_pending(StakeholderKind::Ambulance)
        .await
        .is_empty());

    let members = portal.list_approved_members().await;
    assert_eq!(members.len(), 1);
    let payload = serde_json::to_value(&members[0]).expect("member serializes");
    assert_eq!(payload["memberType"], "professional");
    assert_eq!(payload["data"]["details"]["role"], AMBULANCE_ROLE);
}

#[tokio::test]
async fn rejected_professional_never_reaches_the_directory() {
    let portal = RegistrationPortal::new(Arc::new(InMemoryRegistrationStore::new()));
    let details = KindDetails::Professional(ProfessionalDetails {
        role: "Physiotherapist".to_string(),
        experience: 3,
        credentials: Vec::new(),
        specialties: Vec::new(),
    });
    let request = portal
        .register(form("Anil Kumar", "Bengaluru", details), None)
        .await
        .expect("registered");

    portal
        .reject(StakeholderKind::Professional, &request.id)
        .await
        .expect("rejected");

    assert!(portal.list_approved_members().await.is_empty());
    assert!(portal.list_location_groups().await.is_empty());
    assert_eq!(portal.dashboard().await.total_pending, 0);
}

#[test]
fn demo_command_walks_the_review_workflow() {
    let output = Command::new(env!("CARGO_BIN_EXE_care-portal"))
        .arg("demo")
        .output()
        .expect("demo binary runs");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Verified directory"));
    assert!(stdout.contains("Pune, Maharashtra: 3 listed"));
    assert!(stdout.contains("Dashboard: 0 pending | 4 verified members | 2 locations"));
}
