use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bindings::binding;
use super::domain::{
    Contact, KindDetails, Location, RegistrationRequest, RequestId, RequestStatus,
    StakeholderKind,
};

/// Field values entered on a registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub contact: Contact,
    pub location: Location,
    pub details: KindDetails,
}

/// Presentational validation failure. The remote store remains the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("'{0}' is not a valid phone number")]
    InvalidPhone(String),
}

static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Issue `<kind-prefix>_<epoch-millis>`, bumping the millisecond when two
/// requests would otherwise share a stamp inside this process.
pub fn next_request_id(kind: StakeholderKind, now: DateTime<Utc>) -> RequestId {
    let candidate = now.timestamp_millis();
    let mut last = LAST_ISSUED_MILLIS.load(Ordering::Relaxed);
    let issued = loop {
        let next = candidate.max(last + 1);
        match LAST_ISSUED_MILLIS.compare_exchange_weak(
            last,
            next,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => break next,
            Err(actual) => last = actual,
        }
    };

    RequestId(format!("{}_{issued}", binding(kind).id_prefix))
}

impl RegistrationForm {
    pub fn kind(&self) -> StakeholderKind {
        self.details.kind()
    }

    pub fn validate(&self) -> Result<(), FormError> {
        require("name", &self.name)?;
        require("email", &self.contact.email)?;
        require("phone", &self.contact.phone)?;
        require("city", &self.location.city)?;
        require("state", &self.location.state)?;

        if !is_plausible_email(self.contact.email.trim()) {
            return Err(FormError::InvalidEmail(self.contact.email.clone()));
        }
        if !is_plausible_phone(&self.contact.phone) {
            return Err(FormError::InvalidPhone(self.contact.phone.clone()));
        }

        match &self.details {
            KindDetails::Professional(details) => require("role", &details.role),
            KindDetails::Vendor(details) => require("category", &details.category),
            KindDetails::Ngo(details) => {
                require("focus area", &details.focus_area)?;
                require("registration number", &details.registration_no)
            }
            KindDetails::Ambulance => Ok(()),
        }
    }

    /// Validate and build a pending request stamped at `now`.
    pub fn build(self, now: DateTime<Utc>) -> Result<RegistrationRequest, FormError> {
        self.validate()?;
        let id = next_request_id(self.kind(), now);
        Ok(self.into_request(id))
    }

    /// Build with a caller-chosen id, skipping the generator. Validation still runs.
    pub fn build_with_id(self, id: RequestId) -> Result<RegistrationRequest, FormError> {
        self.validate()?;
        Ok(self.into_request(id))
    }

    fn into_request(self, id: RequestId) -> RegistrationRequest {
        let RegistrationForm {
            name,
            contact,
            location,
            details,
        } = self;

        RegistrationRequest {
            id,
            status: RequestStatus::Pending,
            requester: None,
            name: name.trim().to_string(),
            contact,
            location,
            details,
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::MissingField(field))
    } else {
        Ok(())
    }
}

fn is_plausible_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

// Ten-digit national number, optionally prefixed with +91 or a trunk 0.
fn is_plausible_phone(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-'))
        .collect();
    let national = compact
        .strip_prefix("+91")
        .or_else(|| compact.strip_prefix('0'))
        .unwrap_or(&compact);

    national.len() == 10 && national.chars().all(|ch| ch.is_ascii_digit())
}
