//! Credit Origination - API Server Binary
//!
//! Serves the HTTP API and runs the capacity-assessment listener in the same
//! process.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin lending-api
//!
//! APP__SERVER__PORT=8080 APP__DATABASE__URL=postgres://... cargo run --bin lending-api
//! ```
//!
//! See [`interface_api::config`] for every variable.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_lending::adapters::{QueueNotificationGateway, QueueReportsGateway};
use domain_lending::{
    ApplicationLifecycleService, AssessmentListener, CapacityAssessmentConsumer,
    CapacityAssessmentProducer, LifecyclePorts, MessageSender, StateMapping,
};
use infra_db::{
    create_pool, PostgresApplicationAdapter, PostgresLoanTypeAdapter, PostgresMessageQueue,
    PostgresStatusAdapter, MIGRATOR,
};
use infra_http::ApplicantDirectoryClient;
use interface_api::{config::AppConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;

    init_tracing(&config.logging.level, config.logging.json);

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        dispatch_mode = ?config.lending.dispatch_mode,
        "Starting credit origination API server"
    );

    let pool = create_pool(config.database_config())
        .await
        .context("database connection failed")?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        MIGRATOR.run(&pool).await.context("migrations failed")?;
    }

    let mapping = StateMapping::default();

    let queue = Arc::new(PostgresMessageQueue::new(pool.clone()));
    let sender: Arc<dyn MessageSender> = queue.clone();
    let applications = Arc::new(PostgresApplicationAdapter::new(pool.clone()));
    let loan_types = Arc::new(PostgresLoanTypeAdapter::new(pool.clone()));
    let statuses = Arc::new(PostgresStatusAdapter::new(pool.clone(), mapping.clone()));
    let applicants = Arc::new(
        ApplicantDirectoryClient::new(config.applicant_directory_config())
            .context("applicant directory client")?,
    );

    let producer = CapacityAssessmentProducer::new(
        sender.clone(),
        loan_types.clone(),
        statuses.clone(),
        config.queues.assessment_requests.clone(),
    );

    let ports = LifecyclePorts {
        applications: applications.clone(),
        loan_types,
        statuses: statuses.clone(),
        applicants,
        notifications: Arc::new(QueueNotificationGateway::new(
            sender.clone(),
            config.queues.notifications.clone(),
        )),
        reports: Arc::new(QueueReportsGateway::new(sender, config.queues.reports.clone())),
    };

    let service = ApplicationLifecycleService::new(
        ports,
        Arc::new(producer),
        mapping,
        config.service_config(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let listener_task = if config.listener.enabled {
        let consumer = CapacityAssessmentConsumer::new(service.clone(), statuses);
        let listener =
            AssessmentListener::new(queue, Arc::new(consumer), config.listener_config());
        Some(tokio::spawn(listener.run(shutdown_rx)))
    } else {
        tracing::info!("Assessment listener disabled");
        None
    };

    let app = create_router(AppState {
        service,
        readiness: applications,
    });

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("invalid server address")?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Workers finish the batch in hand before exiting
    shutdown_tx.send_replace(true);
    if let Some(task) = listener_task {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Assessment listener task failed");
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Installs the global subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
