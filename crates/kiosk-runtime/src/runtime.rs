//! # Kiosk Runtime
//!
//! ## Startup Sequence
//!
//! 1. Wire the container (the context drives the barrier `Locked`)
//! 2. Spawn the session reaper
//! 3. Spawn the event log tap when simulating
//! 4. Serve the terminal until the stop signal or a server failure
//!
//! ## Shutdown Sequence
//!
//! 1. Flip the shared watch channel so the server and reaper stop
//! 2. Wait for both
//! 3. Force the safe state one last time

use std::future::Future;

use kc_03_disposal::SessionReaper;
use kc_04_api_gateway::{ApiGatewayService, GatewayError};
use shared_bus::Subscription;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::KioskConfig;
use crate::container::{ContainerError, KioskContainer};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Task failed: {0}")]
    Task(String),
}

pub struct KioskRuntime {
    config: KioskConfig,
    container: KioskContainer,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl KioskRuntime {
    pub fn new(config: KioskConfig) -> Result<Self, RuntimeError> {
        let container = KioskContainer::build(&config)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            config,
            container,
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn container(&self) -> &KioskContainer {
        &self.container
    }

    /// Run until `stop` completes, then shut down in order.
    pub async fn run<F>(self, stop: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            simulate = self.config.hardware.simulate,
            "Starting kiosk"
        );

        let reaper = tokio::spawn(
            SessionReaper::new(self.container.context.clone()).run(self.shutdown_rx.clone()),
        );
        if let Some(bus) = &self.container.bus {
            tokio::spawn(log_events(bus.subscribe(), self.shutdown_rx.clone()));
        }

        let gateway = ApiGatewayService::new(self.config.http.clone(), self.container.machine.clone())?;
        let mut server = tokio::spawn(gateway.start(self.shutdown_rx.clone()));

        let finished = tokio::select! {
            _ = stop => {
                info!("Shutdown requested");
                None
            }
            result = &mut server => Some(result),
        };

        let _ = self.shutdown_tx.send(true);
        let served = match finished {
            Some(result) => result,
            None => server.await,
        };
        if let Err(e) = reaper.await {
            warn!(error = %e, "Reaper task ended abnormally");
        }

        self.container.context.shutdown();
        info!("Kiosk stopped");

        match served {
            Ok(result) => result.map_err(RuntimeError::from),
            Err(e) => Err(RuntimeError::Task(e.to_string())),
        }
    }
}

/// Log every event on the in-process bus, standing in for a dashboard.
async fn log_events(mut events: Subscription, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    let payload = event.to_payload().unwrap_or_default();
                    info!(
                        records = event.records.len(),
                        payload = %String::from_utf8_lossy(&payload),
                        "Disposal event published"
                    );
                }
                None => break,
            },
            _ = shutdown.changed() => break,
        }
    }
}
