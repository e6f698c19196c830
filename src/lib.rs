#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::database::application_repo::ApplicationRepository;
use crate::adapters::database::connection_repo::ConnectionRepository;
use crate::adapters::database::conversation_repo::ConversationRepository;
use crate::adapters::database::listing_repo::ListingRepository;
use crate::adapters::database::message_repo::MessageRepository;
use crate::adapters::database::{self, DbPool};
use crate::api::ServiceContainer;
use crate::config::Config;
use crate::services::aggregate_service::AggregateService;
use crate::services::application_service::ApplicationService;
use crate::services::connection_service::ConnectionService;
use crate::services::conversation_service::ConversationService;
use crate::services::health_service::HealthService;
use crate::services::listing_service::ListingService;
use crate::services::message_service::MessageService;
use tokio::sync::watch;

/// Everything the binary needs to serve traffic once resources are connected.
#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
}

/// Wires repositories and services together. Performs no I/O of its own.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    pool: Option<DbPool>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, pool: None }
    }

    #[must_use]
    pub fn with_database(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// # Errors
    /// Returns an error if no database pool was supplied.
    pub fn build(self) -> anyhow::Result<App> {
        let pool = self.pool.ok_or_else(|| anyhow::anyhow!("database pool is required"))?;

        let listing_repo = ListingRepository::new();
        let application_repo = ApplicationRepository::new();
        let connection_repo = ConnectionRepository::new();
        let conversation_repo = ConversationRepository::new();
        let message_repo = MessageRepository::new();

        let services = ServiceContainer {
            listing_service: ListingService::new(pool.clone(), listing_repo.clone(), application_repo.clone()),
            application_service: ApplicationService::new(
                pool.clone(),
                listing_repo.clone(),
                application_repo.clone(),
                self.config.matching.clone(),
            ),
            connection_service: ConnectionService::new(pool.clone(), connection_repo),
            conversation_service: ConversationService::new(pool.clone(), conversation_repo.clone(), listing_repo),
            message_service: MessageService::new(
                pool.clone(),
                conversation_repo,
                message_repo.clone(),
                self.config.messaging.clone(),
            ),
            aggregate_service: AggregateService::new(pool.clone(), application_repo, message_repo),
        };

        let health_service = HealthService::new(pool, self.config.health.clone());

        Ok(App { services, health_service })
    }
}

/// Applies pending schema migrations.
///
/// # Errors
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    tracing::info!("Running database migrations");
    database::run_migrations(pool).await?;
    Ok(())
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received, draining connections");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through tracing so they reach the structured log.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        tracing::error!(panic.location = %location, panic.payload = %payload, "Panic occurred");
    }));
}
