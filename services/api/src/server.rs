use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use bnpl_decision::config::AppConfig;
use bnpl_decision::decisions::webhook::WebhookQueue;
use bnpl_decision::decisions::{DecisionService, ScoringEngine};
use bnpl_decision::error::AppError;
use bnpl_decision::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{
    AppState, HttpTransactionSource, HttpWebhookTransport, InMemoryDecisionRepository,
    InMemoryWebhookStore,
};
use crate::routes::with_operational_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let source = HttpTransactionSource::new(config.upstream.bank_api_base.clone())
        .map_err(|err| AppError::Io(std::io::Error::other(err.to_string())))?;
    let repository = Arc::new(InMemoryDecisionRepository::default());
    let engine = ScoringEngine::with_window(config.analysis_window_days);
    let service = Arc::new(DecisionService::new(Arc::new(source), repository, engine));

    let webhook_store = Arc::new(InMemoryWebhookStore::default());
    let webhook_transport = Arc::new(
        HttpWebhookTransport::new()
            .map_err(|err| AppError::Io(std::io::Error::other(err.to_string())))?,
    );
    let webhooks = Arc::new(WebhookQueue::new(
        webhook_store,
        webhook_transport,
        config.upstream.ledger_webhook_url.clone(),
    ));

    let app = with_operational_routes(service, webhooks)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "bnpl decision service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
