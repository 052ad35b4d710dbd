//! # Kiosk Container
//!
//! Builds every port implementation and hands them to the disposal core.
//!
//! ```text
//!                 ┌─ real ─────────────────────────┬─ simulated ───────────────┐
//! TagSource       │ TagReader<PcscCardProbe>       │ TagReader<SimulatedCard…> │
//! WeightSource    │ ScaleSensor<SerialportOpener>  │ SimulatedScale            │
//! Actuator        │ SysfsGpioActuator              │ SimulatedActuator         │
//! EventPublisher  │ MqttEventPublisher             │ InMemoryEventBus          │
//! Users / Ledger  │ JsonFileStore                  │ JsonFileStore             │
//!                 └────────────────────────────────┴───────────────────────────┘
//! ```
//!
//! Without the `pcsc` feature the real tag source reports
//! `HardwareUnavailable` on every read.

use std::sync::Arc;

use kc_01_hardware::adapters::{
    SerialportOpener, SimulatedActuator, SimulatedCardProbe, SimulatedScale, SysfsGpioActuator,
};
use kc_01_hardware::{
    Actuator, HardwareError, ScaleSensor, TagReader, TagSource, WeightSource,
};
use kc_02_ledger::{JsonFileStore, LedgerError, WeightLedger};
use kc_03_disposal::{DisposalStateMachine, KioskContext, KioskPorts};
use shared_bus::{EventPublisher, InMemoryEventBus, MqttEventPublisher};
use shared_types::SystemTimeSource;
use thiserror::Error;
use tracing::info;

use crate::config::KioskConfig;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Device setup failed: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Ledger setup failed: {0}")]
    Ledger(#[from] LedgerError),
}

/// The wired kiosk.
pub struct KioskContainer {
    pub context: Arc<KioskContext>,
    pub machine: Arc<DisposalStateMachine>,
    pub store: Arc<JsonFileStore>,
    /// Present only when simulating; the in-process stand-in for the broker.
    pub bus: Option<Arc<InMemoryEventBus>>,
}

struct Devices {
    tags: Arc<dyn TagSource>,
    scale: Arc<dyn WeightSource>,
    actuator: Arc<dyn Actuator>,
}

impl KioskContainer {
    pub fn build(config: &KioskConfig) -> Result<Self, ContainerError> {
        let store = Arc::new(JsonFileStore::open(&config.storage.path)?);

        let (devices, publisher, bus) = if config.hardware.simulate {
            info!("Wiring simulated devices and in-process bus");
            let bus = Arc::new(InMemoryEventBus::new());
            let publisher: Arc<dyn EventPublisher> = bus.clone();
            (simulated_devices(config), publisher, Some(bus))
        } else {
            info!(
                scale = %config.scale.port,
                gpio = config.lock.gpio_pin,
                broker = %format!("{}:{}", config.mqtt.host, config.mqtt.port),
                "Wiring kiosk devices"
            );
            let publisher: Arc<dyn EventPublisher> =
                Arc::new(MqttEventPublisher::new(config.mqtt.clone()));
            (device_adapters(config)?, publisher, None)
        };

        let ports = KioskPorts {
            tags: devices.tags,
            scale: devices.scale,
            users: store.clone(),
            ledger: Arc::new(WeightLedger::new(store.clone())),
            publisher,
            clock: Arc::new(SystemTimeSource),
            actuator: devices.actuator,
        };
        let context = KioskContext::new(ports, config.session.clone());
        let machine = Arc::new(DisposalStateMachine::new(context.clone()));

        Ok(Self {
            context,
            machine,
            store,
            bus,
        })
    }
}

fn device_adapters(config: &KioskConfig) -> Result<Devices, ContainerError> {
    let actuator = SysfsGpioActuator::open(&config.lock)?;
    let scale = ScaleSensor::new(
        SerialportOpener::new(config.scale.clone()),
        config.scale.clone(),
    );
    Ok(Devices {
        tags: tag_reader(config),
        scale: Arc::new(scale),
        actuator: Arc::new(actuator),
    })
}

#[cfg(feature = "pcsc")]
fn tag_reader(config: &KioskConfig) -> Arc<dyn TagSource> {
    use kc_01_hardware::adapters::PcscCardProbe;
    Arc::new(TagReader::new(PcscCardProbe::new(), config.tag_reader.clone()))
}

#[cfg(not(feature = "pcsc"))]
fn tag_reader(config: &KioskConfig) -> Arc<dyn TagSource> {
    use kc_01_hardware::adapters::UnavailableCardProbe;
    tracing::warn!("Built without the pcsc feature, tag reads will fail");
    Arc::new(TagReader::new(UnavailableCardProbe, config.tag_reader.clone()))
}

fn simulated_devices(config: &KioskConfig) -> Devices {
    let probe = SimulatedCardProbe::new(config.hardware.simulated_tag.clone());
    Devices {
        tags: Arc::new(TagReader::new(probe, config.tag_reader.clone())),
        scale: Arc::new(SimulatedScale::new(config.hardware.simulated_weight)),
        actuator: Arc::new(SimulatedActuator::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{LockState, Uid};

    fn simulated_config(dir: &tempfile::TempDir) -> KioskConfig {
        let mut config = KioskConfig::default();
        config.hardware.simulate = true;
        config.hardware.simulated_tag = Some(Uid::parse("04 A2 19").unwrap());
        config.storage.path = dir.path().join("ledger.json");
        config
    }

    #[test]
    fn test_simulated_build_starts_locked() {
        let dir = tempfile::tempdir().unwrap();
        let container = KioskContainer::build(&simulated_config(&dir)).unwrap();

        let status = container.context.status();
        assert_eq!(status.lock, LockState::Locked);
        assert!(status.session.is_none());
        assert!(container.bus.is_some());
    }

    #[test]
    fn test_corrupt_ledger_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = simulated_config(&dir);
        std::fs::write(&config.storage.path, b"not json").unwrap();

        assert!(matches!(
            KioskContainer::build(&config),
            Err(ContainerError::Ledger(_))
        ));
    }
}
