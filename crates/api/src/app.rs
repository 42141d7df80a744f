use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::ports::{AlertStore, AuditStore, DirectoryStore, ReadingStore, TicketStore};
use domain::services::{
    AlertService, AuditDiagnostics, AuditRecorder, LocationService, TenantDirectory,
    TicketService, UserAdminService,
};
use persistence::PgStores;
use shared::jwt::{JwtConfig, JwtError};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{
    alerts, audit_logs, companies, devices, health, locations, onboarding, profile, sensor_data,
    tickets, users,
};

/// The store ports the services run on.
#[derive(Clone)]
pub struct Stores {
    pub directory: Arc<dyn DirectoryStore>,
    pub readings: Arc<dyn ReadingStore>,
    pub alerts: Arc<dyn AlertStore>,
    pub audit: Arc<dyn AuditStore>,
    pub tickets: Arc<dyn TicketStore>,
}

impl From<PgStores> for Stores {
    fn from(pg: PgStores) -> Self {
        Self {
            directory: pg.directory,
            readings: pg.readings,
            alerts: pg.alerts,
            audit: pg.audit,
            tickets: pg.tickets,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid session key configuration: {0}")]
    Jwt(#[from] JwtError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub directory: TenantDirectory,
    pub users: UserAdminService,
    pub locations: LocationService,
    pub alerts: AlertService,
    pub tickets: TicketService,
    pub audit: AuditRecorder,
    /// Present when running on Postgres; readiness reports pool gauges from it.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        config: Config,
        stores: Stores,
        diagnostics: AuditDiagnostics,
    ) -> Result<Self, StartupError> {
        let jwt = config.jwt_config()?;
        let role_policy = config.role_change_policy().map_err(StartupError::Config)?;

        let directory = TenantDirectory::new(stores.directory);
        let audit = AuditRecorder::new(stores.audit, diagnostics);

        Ok(Self {
            users: UserAdminService::new(directory.clone(), audit.clone(), role_policy),
            locations: LocationService::new(directory.clone(), audit.clone()),
            alerts: AlertService::new(
                directory.clone(),
                stores.alerts,
                stores.readings,
                audit.clone(),
                config.alert_policy(),
            ),
            tickets: TicketService::new(directory.clone(), stores.tickets, audit.clone()),
            directory,
            audit,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
            pool: None,
        })
    }

    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Session only: the caller may not have a profile yet.
    let session_routes = Router::new().route("/api/v1/onboarding", post(onboarding::onboard));

    // Device-submitted readings, authenticated by the ingest key.
    let ingest_routes = Router::new().route("/api/v1/sensor-data", post(sensor_data::submit));

    let actor_routes = Router::new()
        .route("/api/v1/profile", get(profile::get_profile))
        .route("/api/v1/companies", get(companies::list_companies))
        .route(
            "/api/v1/users",
            get(users::list_users).post(users::create_user),
        )
        .route("/api/v1/users/approve", post(users::change_user_status))
        .route("/api/v1/users/:user_id", patch(users::update_user))
        .route(
            "/api/v1/locations",
            get(locations::list_locations).post(locations::create_location),
        )
        .route(
            "/api/v1/locations/:location_id",
            get(locations::get_location)
                .patch(locations::update_location)
                .delete(locations::delete_location),
        )
        .route(
            "/api/v1/devices",
            get(devices::list_devices).post(devices::create_device),
        )
        .route(
            "/api/v1/devices/:device_id",
            get(devices::get_device)
                .patch(devices::update_device)
                .delete(devices::delete_device),
        )
        .route(
            "/api/v1/devices/:device_id/readings",
            get(devices::list_readings),
        )
        .route("/api/v1/alerts", get(alerts::list_alerts))
        .route("/api/v1/alerts/snooze", post(alerts::snooze_alert))
        .route("/api/v1/alerts/:alert_id/resolve", post(alerts::resolve_alert))
        .route(
            "/api/v1/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route("/api/v1/tickets/:ticket_id", patch(tickets::update_ticket))
        .route("/api/v1/audit-logs", get(audit_logs::list_audit_logs))
        .route("/api/v1/audit-logs/verify", get(audit_logs::verify_chain));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(ingest_routes)
        .merge(actor_routes)
        // Route layer so the matched path is known when labelling metrics
        .route_layer(middleware::from_fn(metrics_middleware))
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
