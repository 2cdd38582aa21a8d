//! Application context - dependency injection container

use std::path::Path;
use std::sync::Arc;

use convene_core::{
    Clock, EventService, EventStore, RegistrationService, ReportingService, ReportingStore,
    StatusService, SystemClock, UserService, UserStore,
};
use convene_domain::{ConveneError, Result};
use convene_infra::{
    DbManager, SqliteEventRepository, SqliteReportingRepository, SqliteUserRepository,
    StatusSweepScheduler, StatusSweepSchedulerConfig,
};
use convene_shared::Config;

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventStore>,
    pub event_service: Arc<EventService>,
    pub user_service: Arc<UserService>,
    pub registration_service: Arc<RegistrationService>,
    pub reporting_service: Arc<ReportingService>,

    /// Background status sweep; `None` when disabled by configuration.
    pub status_scheduler: Option<Arc<StatusSweepScheduler>>,
}

/// Construct and start the status sweep scheduler (fail-fast).
fn create_status_scheduler(
    config: &Config,
    events: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
) -> Result<Arc<StatusSweepScheduler>> {
    let service = Arc::new(StatusService::new(events, clock));
    let scheduler_config = StatusSweepSchedulerConfig::from(&config.sweep);
    let mut scheduler = StatusSweepScheduler::new(service, scheduler_config);

    scheduler.start().map_err(|err| {
        tracing::error!(error = %err, "failed to start status sweep scheduler");
        ConveneError::Internal(format!("failed to start status sweep scheduler: {err}"))
    })?;

    Ok(Arc::new(scheduler))
}

impl AppContext {
    /// Create a new application context with default configuration
    pub async fn new() -> Result<Self> {
        Self::new_with_config(Config::default()).await
    }

    /// Create a new application context with custom configuration
    ///
    /// Tests use this to point the context at a temporary database and to
    /// disable the background sweep.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        // Initialize database and apply migrations
        let db = Arc::new(DbManager::new(
            Path::new(&config.database.path),
            config.database.pool_size,
        )?);
        db.run_migrations()?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // Repositories behind the core ports
        let users: Arc<dyn UserStore> = Arc::new(SqliteUserRepository::new(Arc::clone(&db)));
        let events: Arc<dyn EventStore> = Arc::new(SqliteEventRepository::new(Arc::clone(&db)));
        let reports: Arc<dyn ReportingStore> =
            Arc::new(SqliteReportingRepository::new(Arc::clone(&db)));

        // Services
        let event_service = Arc::new(EventService::new(
            Arc::clone(&events),
            Arc::clone(&users),
            Arc::clone(&clock),
        ));
        let user_service = Arc::new(UserService::new(Arc::clone(&users), Arc::clone(&clock)));
        let registration_service = Arc::new(RegistrationService::new(
            Arc::clone(&events),
            Arc::clone(&users),
            Arc::clone(&clock),
        ));
        let reporting_service =
            Arc::new(ReportingService::new(Arc::clone(&reports), Arc::clone(&clock)));

        // Background status sweep (fail-fast when enabled)
        let status_scheduler = if config.sweep.enabled {
            Some(create_status_scheduler(&config, Arc::clone(&events), Arc::clone(&clock))?)
        } else {
            tracing::info!("status sweep disabled by configuration");
            None
        };

        Ok(Self {
            config,
            db,
            users,
            events,
            event_service,
            user_service,
            registration_service,
            reporting_service,
            status_scheduler,
        })
    }

    /// Check health of all application components
    ///
    /// Aggregates per-component checks into one scored report; see
    /// [`HealthStatus::from_components`] for the scoring rule.
    pub async fn health_check(&self) -> HealthStatus {
        // The sweep may be disabled by config; that counts as healthy.
        let sweep = match &self.status_scheduler {
            Some(scheduler) if scheduler.is_running() => ComponentHealth::healthy("status_sweep"),
            Some(_) => ComponentHealth::unhealthy("status_sweep", "sweep task is not running"),
            None => ComponentHealth::healthy("status_sweep"),
        };

        HealthStatus::from_components(vec![self.check_database_health().await, sweep])
    }

    /// Check database health by running a trivial query off the async runtime.
    async fn check_database_health(&self) -> ComponentHealth {
        let db = Arc::clone(&self.db);
        match tokio::task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(())) => ComponentHealth::healthy("database"),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "database health check failed");
                ComponentHealth::unhealthy("database", format!("query failed: {err}"))
            }
            Err(err) => {
                tracing::error!(error = %err, "database health check task panicked");
                ComponentHealth::unhealthy("database", format!("task panic: {err}"))
            }
        }
    }

    /// Shutdown the application context gracefully
    ///
    /// Intentionally close to a no-op: the status sweep holds a
    /// `CancellationToken` and cancels itself on drop, and the connection
    /// pool closes when the last reference goes away. The method exists so
    /// the binary has one place to add explicit cleanup if a future
    /// component needs it.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutdown called on AppContext");

        if let Some(scheduler) = &self.status_scheduler {
            tracing::info!(
                component = "StatusSweepScheduler",
                running = scheduler.is_running(),
                cleanup_method = "Drop (CancellationToken)",
                "scheduler_cleanup"
            );
        }

        tracing::info!(
            component = "DbManager",
            cleanup_method = "connection pool auto-closes",
            "database_cleanup"
        );

        Ok(())
    }
}
