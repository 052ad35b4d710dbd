//! # Scale Sensor
//!
//! One measurement opens the serial line, reads up to `attempts` lines,
//! averages the ones that parse and closes the line again.
//!
//! ```text
//! open ──→ read_line × attempts ──→ parse / clamp ──→ mean ──→ close
//!   │                                                   │
//!   └─ SerialUnavailable                  NoValidSample ┘ (zero valid reads)
//! ```
//!
//! A read error or timeout only costs the attempt it happened in.

use kiosk_telemetry::metrics::{SCALE_SAMPLES, SCALE_SAMPLE_DURATION};
use shared_types::Weight;
use tracing::{debug, info, warn};

use crate::domain::{parse_weight_line, ScaleConfig};
use crate::error::{HardwareError, HardwareResult};
use crate::ports::{SerialOpener, WeightSource};

/// Averaging weight sampler over a serial scale.
pub struct ScaleSensor<O> {
    opener: O,
    config: ScaleConfig,
}

impl<O: SerialOpener> ScaleSensor<O> {
    pub fn new(opener: O, config: ScaleConfig) -> Self {
        Self { opener, config }
    }

    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }
}

impl<O: SerialOpener> WeightSource for ScaleSensor<O> {
    fn sample(&self) -> HardwareResult<Weight> {
        let _timer = SCALE_SAMPLE_DURATION.start_timer();
        let attempts = self.config.attempts;

        let samples = {
            // Closed when this block ends, on every path.
            let mut line = self.opener.open()?;
            debug!(port = %self.opener.port_name(), "Scale line opened");

            let mut samples = Vec::with_capacity(attempts as usize);
            for attempt in 1..=attempts {
                match line.read_line() {
                    Ok(raw) => match parse_weight_line(&raw, &self.config.unit) {
                        Some(weight) => {
                            SCALE_SAMPLES.with_label_values(&["valid"]).inc();
                            samples.push(weight);
                        }
                        None => {
                            SCALE_SAMPLES.with_label_values(&["invalid"]).inc();
                            warn!(
                                attempt,
                                line = %String::from_utf8_lossy(&raw).trim(),
                                "Could not extract a weight from scale line"
                            );
                        }
                    },
                    Err(e) => {
                        SCALE_SAMPLES.with_label_values(&["io_error"]).inc();
                        warn!(attempt, error = %e, "Scale read failed");
                    }
                }
            }
            samples
        };

        let mean = Weight::mean(&samples).ok_or(HardwareError::NoValidSample { attempts })?;
        info!(weight = %mean, valid = samples.len(), "Scale measurement taken");
        Ok(mean)
    }
}
