use care_registry::workflows::registration::{
    Contact, CredentialRef, InMemoryRegistrationStore, KindDetails, Location, NgoDetails,
    ProfessionalDetails, RegistrationError, RegistrationForm, RegistrationPortal,
    RegistrationRequest, RequesterId, StakeholderKind, VendorDetails,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Portal = RegistrationPortal<InMemoryRegistrationStore>;

pub(crate) fn sample_location(city: &str, state: &str) -> Location {
    Location {
        city: city.to_string(),
        state: state.to_string(),
        country: "India".to_string(),
    }
}

fn sample_contact(mailbox: &str, phone: &str) -> Contact {
    Contact {
        email: format!("{mailbox}@example.in"),
        phone: phone.to_string(),
        address: String::new(),
        website: String::new(),
    }
}

/// One representative registration per stakeholder kind.
pub(crate) fn sample_forms() -> Vec<RegistrationForm> {
    vec![
        RegistrationForm {
            name: "Dr. Kavya Rao".to_string(),
            contact: sample_contact("kavya.rao", "9820012345"),
            location: sample_location("Pune", "Maharashtra"),
            details: KindDetails::Professional(ProfessionalDetails {
                role: "Nurse".to_string(),
                experience: 6,
                credentials: vec![CredentialRef {
                    name: "Nursing council certificate".to_string(),
                    storage_key: "credentials/kavya-rao/council.pdf".to_string(),
                }],
                specialties: vec!["Home care".to_string(), "Geriatrics".to_string()],
            }),
        },
        RegistrationForm {
            name: "Sahyadri Medical Supplies".to_string(),
            contact: sample_contact("orders.sahyadri", "9822011111"),
            location: sample_location("Pune", "Maharashtra"),
            details: KindDetails::Vendor(VendorDetails {
                category: "Medical equipment".to_string(),
                products: vec!["Hospital beds".to_string(), "Oxygen cylinders".to_string()],
            }),
        },
        RegistrationForm {
            name: "Arogya Seva Trust".to_string(),
            contact: sample_contact("contact.arogya", "9833022222"),
            location: sample_location("Nashik", "Maharashtra"),
            details: KindDetails::Ngo(NgoDetails {
                focus_area: "Rural health camps".to_string(),
                registration_no: "MH/NSK/2017/311".to_string(),
                services: vec!["Screening camps".to_string(), "Blood donation".to_string()],
            }),
        },
        RegistrationForm {
            name: "Rapid Response Ambulance".to_string(),
            contact: sample_contact("dispatch.rapid", "9844033333"),
            location: sample_location("Mumbai", "Maharashtra"),
            details: KindDetails::Ambulance,
        },
    ]
}

/// Submit every sample form; the first two are approved so the directory is not empty.
pub(crate) async fn seed_demo_registrations(
    portal: &Portal,
) -> Result<Vec<RegistrationRequest>, RegistrationError> {
    let caller = Some(RequesterId("seed".to_string()));
    let mut submitted = Vec::new();
    for form in sample_forms() {
        submitted.push(portal.register(form, caller.clone()).await?);
    }

    for request in submitted
        .iter()
        .filter(|request| {
            matches!(
                request.kind(),
                StakeholderKind::Professional | StakeholderKind::Vendor
            )
        })
    {
        portal.approve(request.kind(), &request.id).await?;
    }

    Ok(submitted)
}
