use crate::cli::ServeArgs;
use crate::infra::{AppState, SeasonSources};
use crate::routes::with_season_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pitwall::config::AppConfig;
use pitwall::error::AppError;
use pitwall::telemetry;
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

    let sources = SeasonSources::from_config(&config.season);
    let season_service = Arc::new(sources.seeded_service()?);

    let app = with_season_routes(season_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        seeded_rng = config.season.rng_seed.is_some(),
        "season simulator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
