use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryNotificationSink, InMemoryProjectStore};
use crate::routes::with_procurement_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tender_flow::config::AppConfig;
use tender_flow::error::AppError;
use tender_flow::telemetry;
use tender_flow::workflows::procurement::ProcurementService;
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

    let store = Arc::new(InMemoryProjectStore::default());
    let notifications = Arc::new(InMemoryNotificationSink::default());
    let service = Arc::new(ProcurementService::new(
        store,
        notifications,
        config.workflow.clone(),
    ));

    let app = with_procurement_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "procurement workflow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
