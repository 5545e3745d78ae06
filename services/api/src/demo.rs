use crate::infra::{sample_forms, sample_location, Portal};
use care_registry::error::AppError;
use care_registry::workflows::registration::{
    InMemoryRegistrationStore, InvalidationEvent, LocationGroup, RegistrationRequest,
    RequesterId, StakeholderKind, TransitionOutcome, UnifiedMember,
};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reject the NGO application instead of approving it.
    #[arg(long)]
    pub(crate) reject_ngo: bool,
    /// Print the public directory payload as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { reject_ngo, json } = args;

    println!("Care marketplace registration demo");
    let portal = Portal::new(Arc::new(InMemoryRegistrationStore::new()));
    let mut invalidations = portal.cache().subscribe();
    let caller = Some(RequesterId("demo-admin".to_string()));

    println!("\nIntake");
    let mut submitted = Vec::new();
    for mut form in sample_forms() {
        if form.kind() == StakeholderKind::Ngo {
            form.location = sample_location("Pune", "Maharashtra");
        }
        match portal.register(form, caller.clone()).await {
            Ok(request) => {
                print_submitted(&request);
                submitted.push(request);
            }
            Err(err) => println!("- Submission rejected: {err}"),
        }
    }

    println!("\nReview queue");
    for kind in StakeholderKind::ALL {
        let pending = portal.list_pending(kind).await;
        println!("- {}: {} pending", kind.label(), pending.len());
    }

    println!("\nDecisions");
    for request in &submitted {
        let kind = request.kind();
        let outcome = if kind == StakeholderKind::Ngo && reject_ngo {
            portal.reject(kind, &request.id).await
        } else {
            portal.approve(kind, &request.id).await
        };
        match outcome {
            Ok(outcome) => print_outcome(&outcome),
            Err(err) => println!("- {} {}: {err}", kind.label(), request.id),
        }
    }

    if let Some(request) = submitted.first() {
        if let Err(err) = portal.approve(request.kind(), &request.id).await {
            println!("- Repeat approval of {} refused: {err}", request.id);
        }
    }

    println!("\nCache invalidations");
    while let Ok(event) = invalidations.try_recv() {
        print_invalidation(&event);
    }

    let members = portal.list_approved_members().await;
    let groups = portal.list_location_groups().await;
    print_directory(&members, &groups);

    if json {
        match serde_json::to_string_pretty(&members) {
            Ok(payload) => println!("\nDirectory payload:\n{payload}"),
            Err(err) => println!("\nDirectory payload unavailable: {err}"),
        }
    }

    let dashboard = portal.dashboard().await;
    println!(
        "\nDashboard: {} pending | {} verified members | {} locations",
        dashboard.total_pending, dashboard.approved_members, dashboard.location_groups
    );

    Ok(())
}

fn print_submitted(request: &RegistrationRequest) {
    println!(
        "- {} submitted {} ({}, {})",
        request.kind().label(),
        request.id,
        request.name,
        request.status.label()
    );
}

fn print_outcome(outcome: &TransitionOutcome) {
    match &outcome.entity {
        Some(entity) => println!(
            "- {} {} approved -> listed as {} in {}, {}",
            outcome.kind.label(),
            outcome.id,
            entity.member_type().label(),
            entity.location.city,
            entity.location.state
        ),
        None => println!("- {} {} rejected", outcome.kind.label(), outcome.id),
    }
}

fn print_invalidation(event: &InvalidationEvent) {
    let keys = event
        .keys
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    println!("- {:?} {}: {}", event.cause, event.kind.label(), keys);
}

fn print_directory(members: &[UnifiedMember], groups: &[LocationGroup]) {
    println!("\nVerified directory");
    if members.is_empty() {
        println!("- no verified members");
    }
    for member in members {
        println!(
            "- [{}] {} ({})",
            member.member_type.label(),
            member.data.name,
            member.data.id
        );
    }

    println!("\nLocations");
    for group in groups {
        println!("- {}: {} listed", group.key(), group.count);
    }
}
