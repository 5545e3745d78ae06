use crate::cli::ServeArgs;
use crate::infra::{seed_demo_registrations, AppState, Portal};
use crate::routes::with_registration_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use care_registry::config::AppConfig;
use care_registry::error::AppError;
use care_registry::telemetry;
use care_registry::workflows::registration::InMemoryRegistrationStore;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(seed) = args.seed_demo.take() {
        config.registry.seed_demo_data = seed;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryRegistrationStore::new());
    let portal = Arc::new(Portal::new(store));
    if config.registry.seed_demo_data {
        let seeded = seed_demo_registrations(&portal).await?;
        info!(count = seeded.len(), "seeded sample registrations");
    }

    let app = with_registration_routes(portal)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "care registration portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
