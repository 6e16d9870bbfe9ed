use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

mod api;
mod audit;
mod config;
mod delivery;
mod device;
mod docs;
mod model;
mod reconcile;
mod routes;
mod sync;
#[cfg(test)]
mod test_support;

use audit::{AuditLog, FileAuditLog};
use config::Config;
use delivery::WebhookClient;
use delivery::backoff::{Backoff, RetryPolicy, TokioSleeper};
use device::gateway::GatewayConnector;
use reconcile::local_day::LocalDayKeyer;
use reconcile::{Reconciler, RowLabels};
use sync::SyncOrchestrator;

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn build_orchestrator(
    config: &Config,
    audit: Arc<dyn AuditLog>,
    cancel: CancellationToken,
) -> anyhow::Result<SyncOrchestrator> {
    let device = GatewayConnector::new(&config.device_url, config.device_timeout)
        .context("Failed to build device gateway client")?;
    let webhook =
        WebhookClient::new(config.webhook_timeout).context("Failed to build webhook client")?;

    let reconciler = Reconciler::new(LocalDayKeyer::new(config.time_zone), config.slot_strategy)
        .with_labels(RowLabels {
            device_name: config.device_name.clone(),
            event_point: config.event_point.clone(),
        });

    let backoff = Backoff::new(
        RetryPolicy {
            max_attempts: config.retry_attempts,
            delay: config.retry_delay,
        },
        Arc::new(TokioSleeper),
        cancel,
    );
    info!(
        attempts = backoff.policy().max_attempts,
        delay_secs = backoff.policy().delay.as_secs(),
        "Delivery retry policy"
    );

    Ok(SyncOrchestrator::new(
        Arc::new(device),
        Arc::new(webhook),
        audit,
        reconciler,
        backoff,
        config.webhook_url.clone(),
    ))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        strategy = %config.slot_strategy,
        mode = %config.report_mode,
        time_zone = %config.time_zone,
        "Server starting..."
    );

    let audit_log = FileAuditLog::new(&config.audit_log_path)
        .with_context(|| format!("Failed to open audit log {}", config.audit_log_path))?;
    let audit: Arc<dyn AuditLog> = Arc::new(audit_log);
    let cancel = CancellationToken::new();
    let orchestrator = Data::new(build_orchestrator(&config, audit.clone(), cancel.clone())?);

    // Cut pending retry waits short on Ctrl-C so shutdown isn't held up.
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Shutdown requested, cancelling pending retries");
            cancel.cancel();
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} so the JS/CSS assets match too
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(orchestrator.clone())
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?;

    info!(%server_addr, "Server listening");
    audit.append("Server started");

    server.run().await?;
    Ok(())
}
