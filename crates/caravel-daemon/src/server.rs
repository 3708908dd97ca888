//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::DaemonConfig;
use crate::constraints::ConstraintGate;
use crate::diff::AdHocDiffer;
use crate::error::{DaemonError, DaemonResult};
use crate::manifests::ManifestService;
use crate::scheduler::{CheckScheduler, InMemoryCheckQueue};
use crate::storage::InMemoryStorage;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Caravel daemon server
pub struct Server {
    config: DaemonConfig,
    manifests: Arc<ManifestService>,
    gate: Arc<ConstraintGate>,
    scheduler: Arc<CheckScheduler>,
    trigger_rx: mpsc::Receiver<()>,
}

impl Server {
    /// Create a new server with the given configuration.
    ///
    /// Storage, queue and differ are constructed once here and shared by
    /// reference with every component.
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let storage = Arc::new(InMemoryStorage::new());
        let queue = Arc::new(InMemoryCheckQueue::default());
        let differ = Arc::new(AdHocDiffer::new(storage.clone()));

        let manifests = Arc::new(ManifestService::new(
            storage.clone(),
            storage.clone(),
            differ,
        ));
        let gate = Arc::new(ConstraintGate::new(storage.clone()));

        let (scheduler, trigger_rx) =
            CheckScheduler::new(config.scheduler.clone(), storage, queue);

        Ok(Self {
            config,
            manifests,
            gate,
            scheduler,
            trigger_rx,
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(
            self.manifests.clone(),
            self.gate.clone(),
            self.scheduler.clone(),
        );

        let app = create_router(state, self.config.server.enable_cors);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Caravel daemon listening on {}", addr);
        tracing::info!(
            check_interval_ms = self.config.scheduler.check_interval_ms,
            "Check scheduler configured"
        );

        // Start the check scheduler in the background
        let scheduler = self.scheduler.clone();
        let trigger_rx = self.trigger_rx;
        tokio::spawn(async move {
            scheduler.start(trigger_rx).await;
        });

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Caravel daemon shutting down");

        self.scheduler.stop().await;

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
