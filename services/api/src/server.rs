use crate::cli::ServeArgs;
use crate::infra::{AppState, Platform};
use crate::routes::with_platform_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use propeval::config::AppConfig;
use propeval::error::AppError;
use propeval::evaluation::import::ImportLimits;
use propeval::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let platform = Platform::seeded(ImportLimits {
        max_rows: config.import.max_rows,
    })?;
    info!(
        property_type_id = platform.demo_property_type.id,
        "seeded demo questionnaire"
    );

    let app = with_platform_routes(
        Arc::clone(&platform.hierarchy),
        Arc::clone(&platform.import),
        Arc::clone(&platform.sessions),
        Arc::clone(&platform.auth),
    )
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "property evaluation platform ready");

    axum::serve(listener, app).await?;
    Ok(())
}
