use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryCalculationRepository, InMemoryProfileRepository, InMemoryStatsAggregator,
};
use crate::routes::with_calculation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use greenwallet::config::AppConfig;
use greenwallet::error::AppError;
use greenwallet::records::CalculationService;
use greenwallet::telemetry;
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

    let calculation_service = Arc::new(CalculationService::new(
        Arc::new(InMemoryCalculationRepository::default()),
        Arc::new(InMemoryProfileRepository::default()),
        Arc::new(InMemoryStatsAggregator::default()),
        config.history,
    ));

    let app = with_calculation_routes(calculation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        history_limit = config.history.default_limit,
        "greenwallet calculation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
