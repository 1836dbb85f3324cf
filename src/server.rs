//! Server runtime
//!
//! [`ServerHandle`] owns the lifecycle of the REST API: metrics recorder,
//! listener, router and graceful shutdown. The CLI `serve` command is a thin
//! wrapper around it, and tests can start a server on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Mutex;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{error, info, warn};

use crate::application::BillingService;
use crate::config::AppConfig;
use crate::interfaces::{create_api_router, ApiState};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

static PROM_HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// The global recorder can only be installed once per process, so a second
/// start in the same process reuses the first handle.
pub fn prometheus_handle() -> AppResult<PrometheusHandle> {
    let mut slot = PROM_HANDLE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics recorder installed");
    *slot = Some(handle.clone());
    Ok(handle)
}

/// Handle to a running billing API server.
///
/// ```rust,no_run
/// use meter_billing::config::AppConfig;
/// use meter_billing::server::ServerHandle;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(AppConfig::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the listener is actually bound to.
    pub local_addr: SocketAddr,

    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Bind the listener and start serving. Port 0 picks a free port.
    pub async fn start(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let prometheus = prometheus_handle()?;
        let billing = BillingService::new(config.tariffs.clone());
        let router = create_api_router(ApiState::new(billing, prometheus));

        let addr = config.server.address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| AppError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "REST API server listening");
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();

        let api_task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                api_shutdown.wait().await;
                info!("REST API server received shutdown signal");
            });
            if let Err(e) = server.await {
                error!(error = %e, "REST API server error");
            }
        });

        Ok(Self {
            config,
            local_addr,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }

    /// Wait for the server to stop after shutdown has been triggered,
    /// bounded by `server.shutdown_timeout`.
    pub async fn wait(self) {
        let Self {
            shutdown, api_task, ..
        } = self;

        let abort = api_task.abort_handle();
        let drained = shutdown
            .drain_with_timeout(async move {
                if let Err(e) = api_task.await {
                    error!(error = %e, "REST API server task failed");
                }
            })
            .await;

        if !drained {
            warn!("Aborting REST API server with requests still in flight");
            abort.abort();
        }
        info!("Meter billing server stopped");
    }

    pub async fn shutdown(self) {
        info!("Shutting down meter billing server");
        self.trigger_shutdown();
        self.wait().await;
    }
}

/// Initialize tracing from the logging config. `RUST_LOG` wins over the
/// configured level when set. Logs go to stderr so CLI output stays clean.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ephemeral() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.server.shutdown_timeout = 5;
        config
    }

    #[tokio::test]
    async fn starts_and_stops_on_an_ephemeral_port() {
        let handle = ServerHandle::start(ephemeral()).await.unwrap();
        assert_ne!(handle.local_addr.port(), 0);
        assert!(handle.is_running());

        let stream = tokio::net::TcpStream::connect(handle.local_addr).await;
        assert!(stream.is_ok());
        drop(stream);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn recorder_handle_is_reused() {
        let first = prometheus_handle().unwrap();
        metrics::counter!("server_handle_reuse_total").increment(1);
        let second = prometheus_handle().unwrap();
        assert!(first.render().contains("server_handle_reuse_total"));
        assert!(second.render().contains("server_handle_reuse_total"));
    }

    #[tokio::test]
    async fn invalid_config_is_refused() {
        let mut config = ephemeral();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ServerHandle::start(config).await,
            Err(AppError::Config(_))
        ));
    }
}
