use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::approval::{ApprovalError, TransitionOutcome};
use super::builder::RegistrationForm;
use super::directory::MemberQuery;
use super::domain::{
    ApprovedEntity, MemberType, RequestId, RequesterId, ReviewDecision, StakeholderKind,
};
use super::gateway::SubmissionError;
use super::service::{RegistrationError, RegistrationPortal};
use super::store::{RegistrationStore, RemoteError};

/// Header carrying the authenticated caller forwarded by the edge proxy.
pub const REQUESTER_HEADER: &str = "x-requester-id";

/// Registration body: form fields plus an optional caller-chosen id.
#[derive(Debug, Deserialize, Serialize)]
pub struct SubmitRegistrationBody {
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(flatten)]
    pub form: RegistrationForm,
}

#[derive(Debug, Serialize)]
struct TransitionView {
    id: RequestId,
    kind: StakeholderKind,
    decision: ReviewDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity: Option<ApprovedEntity>,
}

impl From<TransitionOutcome> for TransitionView {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            id: outcome.id,
            kind: outcome.kind,
            decision: outcome.decision,
            entity: outcome.entity,
        }
    }
}

/// Router exposing submission, review, and directory endpoints.
pub fn registration_router<S>(portal: Arc<RegistrationPortal<S>>) -> Router
where
    S: RegistrationStore + 'static,
{
    Router::new()
        .route("/api/v1/registrations/:kind", post(submit_handler::<S>))
        .route(
            "/api/v1/registrations/:kind/pending",
            get(pending_handler::<S>),
        )
        .route(
            "/api/v1/registrations/:kind/:request_id/approve",
            post(approve_handler::<S>),
        )
        .route(
            "/api/v1/registrations/:kind/:request_id/reject",
            post(reject_handler::<S>),
        )
        .route("/api/v1/directory/members", get(members_handler::<S>))
        .route("/api/v1/directory/locations", get(locations_handler::<S>))
        .route(
            "/api/v1/directory/by-type/:member_type",
            get(approved_list_handler::<S>),
        )
        .route("/api/v1/admin/dashboard", get(dashboard_handler::<S>))
        .with_state(portal)
}

pub(crate) async fn submit_handler<S>(
    State(portal): State<Arc<RegistrationPortal<S>>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<SubmitRegistrationBody>,
) -> Response
where
    S: RegistrationStore + 'static,
{
    let Some(kind) = StakeholderKind::parse(&kind) else {
        return unknown_segment("stakeholder kind", &kind);
    };
    if body.form.kind() != kind {
        let payload = json!({
            "error": format!("form describes a {} registration, not {kind}", body.form.kind()),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }

    let caller = requester_from(&headers);
    let result = match body.id {
        Some(id) => match body.form.build_with_id(id) {
            Ok(request) => portal.submit(kind, request, caller).await,
            Err(err) => Err(err.into()),
        },
        None => portal.register(body.form, caller).await,
    };

    match result {
        Ok(request) => (StatusCode::ACCEPTED, axum::Json(request)).into_response(),
        Err(err) => error_response(&err),
    }
}

pub(crate) async fn pending_handler<S>(
    State(portal): State<Arc<RegistrationPortal<S>>>,
    Path(kind): Path<String>,
) -> Response
where
    S: RegistrationStore + 'static,
{
    let Some(kind) = StakeholderKind::parse(&kind) else {
        return unknown_segment("stakeholder kind", &kind);
    };
    let requests = portal.list_pending(kind).await;
    (StatusCode::OK, axum::Json(requests)).into_response()
}

pub(crate) async fn approve_handler<S>(
    State(portal): State<Arc<RegistrationPortal<S>>>,
    Path((kind, request_id)): Path<(String, String)>,
) -> Response
where
    S: RegistrationStore + 'static,
{
    decide(portal, kind, request_id, ReviewDecision::Approve).await
}

pub(crate) async fn reject_handler<S>(
    State(portal): State<Arc<RegistrationPortal<S>>>,
    Path((kind, request_id)): Path<(String, String)>,
) -> Response
where
    S: RegistrationStore + 'static,
{
    decide(portal, kind, request_id, ReviewDecision::Reject).await
}

async fn decide<S>(
    portal: Arc<RegistrationPortal<S>>,
    kind: String,
    request_id: String,
    decision: ReviewDecision,
) -> Response
where
    S: RegistrationStore + 'static,
{
    let Some(kind) = StakeholderKind::parse(&kind) else {
        return unknown_segment("stakeholder kind", &kind);
    };
    let id = RequestId(request_id);
    let result = match decision {
        ReviewDecision::Approve => portal.approve(kind, &id).await,
        ReviewDecision::Reject => portal.reject(kind, &id).await,
    };

    match result {
        Ok(outcome) => (StatusCode::OK, axum::Json(TransitionView::from(outcome))).into_response(),
        Err(err) => error_response(&err),
    }
}

pub(crate) async fn members_handler<S>(
    State(portal): State<Arc<RegistrationPortal<S>>>,
    Query(query): Query<MemberQuery>,
) -> Response
where
    S: RegistrationStore + 'static,
{
    let members = portal.search_members(&query).await;
    (StatusCode::OK, axum::Json(members)).into_response()
}

pub(crate) async fn locations_handler<S>(
    State(portal): State<Arc<RegistrationPortal<S>>>,
) -> Response
where
    S: RegistrationStore + 'static,
{
    let groups = portal.list_location_groups().await;
    (StatusCode::OK, axum::Json(groups)).into_response()
}

pub(crate) async fn approved_list_handler<S>(
    State(portal): State<Arc<RegistrationPortal<S>>>,
    Path(member_type): Path<String>,
) -> Response
where
    S: RegistrationStore + 'static,
{
    let Some(member_type) = MemberType::parse(&member_type) else {
        return unknown_segment("member type", &member_type);
    };
    let entities = portal.list_approved(member_type).await;
    (StatusCode::OK, axum::Json(entities)).into_response()
}

pub(crate) async fn dashboard_handler<S>(
    State(portal): State<Arc<RegistrationPortal<S>>>,
) -> Response
where
    S: RegistrationStore + 'static,
{
    let summary = portal.dashboard().await;
    (StatusCode::OK, axum::Json(summary)).into_response()
}

fn requester_from(headers: &HeaderMap) -> Option<RequesterId> {
    headers
        .get(REQUESTER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| RequesterId(value.to_string()))
}

fn unknown_segment(label: &str, raw: &str) -> Response {
    let payload = json!({ "error": format!("unknown {label} '{raw}'") });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

pub(crate) fn status_for(err: &RegistrationError) -> StatusCode {
    match err {
        RegistrationError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistrationError::Submission(SubmissionError::Remote(RemoteError::Conflict(_))) => {
            StatusCode::CONFLICT
        }
        RegistrationError::Submission(SubmissionError::Remote(err)) => remote_status(err),
        RegistrationError::Submission(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistrationError::Approval(ApprovalError::UnknownRequest(_)) => StatusCode::NOT_FOUND,
        RegistrationError::Approval(ApprovalError::InvalidTransition { .. }) => {
            StatusCode::CONFLICT
        }
        RegistrationError::Approval(ApprovalError::Remote(err)) => remote_status(err),
    }
}

/// 503 while the data service is unreachable, 502 when it answered with a failure.
pub(crate) fn remote_status(err: &RemoteError) -> StatusCode {
    if err.is_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_GATEWAY
    }
}

fn error_response(err: &RegistrationError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (status_for(err), axum::Json(payload)).into_response()
}
