use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tracing::info;

use domain::services::{AuditDiagnostics, AuditFailure};
use facility_monitor_api::{
    app::{create_app, AppState},
    config::Config,
    middleware,
};
use persistence::PgStores;

/// Drains failed audit appends into a running total and the time of the
/// most recent loss.
async fn drain_audit_failures(mut failures: mpsc::Receiver<AuditFailure>) {
    let mut total: u64 = 0;
    while let Some(failure) = failures.recv().await {
        total += 1;
        metrics::gauge!("audit_last_failure_timestamp_seconds").set(failure.at.timestamp() as f64);
        tracing::warn!(
            action = %failure.action,
            entity_type = %failure.entity_type,
            entity_id = ?failure.entity_id,
            actor_profile_id = ?failure.actor_profile_id,
            error = %failure.error,
            total,
            "Audit entry lost"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting Facility Monitor API v{}", env!("CARGO_PKG_VERSION"));

    let db_config: persistence::DatabaseConfig = (&config.database).into();
    let pool = persistence::create_pool(&db_config).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let (diagnostics, failures) = AuditDiagnostics::channel(config.audit.diagnostics_buffer);
    tokio::spawn(drain_audit_failures(failures));

    let addr = config.socket_addr().context("Invalid server.host")?;
    let state =
        AppState::new(config, PgStores::new(pool.clone()).into(), diagnostics)?.with_pool(pool);
    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
