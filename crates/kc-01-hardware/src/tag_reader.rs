//! # Tag Reader
//!
//! Polls a [`CardProbe`] until a card shows up or the wait times out.

use std::time::Instant;

use shared_types::Uid;
use tracing::{debug, info};

use crate::domain::TagReaderConfig;
use crate::error::{HardwareError, HardwareResult};
use crate::ports::{CardProbe, TagSource};

/// Blocking, retrying tag acquisition.
pub struct TagReader<P> {
    probe: P,
    config: TagReaderConfig,
}

impl<P: CardProbe> TagReader<P> {
    pub fn new(probe: P, config: TagReaderConfig) -> Self {
        Self { probe, config }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }
}

impl<P: CardProbe> TagSource for TagReader<P> {
    fn read_tag(&self) -> HardwareResult<Uid> {
        let started = Instant::now();
        let wait_timeout = self.config.wait_timeout();

        loop {
            match self.probe.probe() {
                Ok(Some(uid)) => {
                    info!(uid = %uid, "Tag read");
                    return Ok(uid);
                }
                Ok(None) => {}
                Err(HardwareError::CardRead { reason }) => {
                    debug!(%reason, "Card read failed, polling again");
                }
                Err(e) => return Err(e),
            }

            let waited = started.elapsed();
            if waited >= wait_timeout {
                return Err(HardwareError::TagNotPresented {
                    waited: wait_timeout,
                });
            }
            std::thread::sleep(self.config.poll_interval().min(wait_timeout - waited));
        }
    }
}
