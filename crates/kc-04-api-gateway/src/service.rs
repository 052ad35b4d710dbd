//! API Gateway service - binds the listener and serves until shutdown.

use std::sync::Arc;

use axum::Router;
use kc_03_disposal::DisposalApi;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::domain::{GatewayConfig, GatewayError, GatewayResult};
use crate::router::{build_router, AppState};

pub struct ApiGatewayService {
    config: GatewayConfig,
    disposal: Arc<dyn DisposalApi>,
}

impl ApiGatewayService {
    pub fn new(config: GatewayConfig, disposal: Arc<dyn DisposalApi>) -> GatewayResult<Self> {
        config.validate()?;
        Ok(Self { config, disposal })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        build_router(AppState::new(Arc::clone(&self.disposal)), &self.config)
    }

    /// Bind the configured address and serve until `shutdown` turns `true`
    /// or its sender is dropped. In-flight requests are allowed to finish.
    pub async fn start(self, shutdown: watch::Receiver<bool>) -> GatewayResult<()> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Server(format!("bind {addr}: {e}")))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> GatewayResult<()> {
        let local = listener
            .local_addr()
            .map_err(|e| GatewayError::Server(e.to_string()))?;
        info!(addr = %local, "Starting HTTP server");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|stop| *stop).await;
            })
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
