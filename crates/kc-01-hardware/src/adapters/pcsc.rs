//! Proximity reader over PC/SC.
//!
//! Uses the first reader the daemon reports and asks the card for its UID
//! with the pseudo-APDU `FF CA 00 00 00`.

use pcsc::{Context, Error as PcscError, Protocols, Scope, ShareMode, MAX_BUFFER_SIZE};
use shared_types::Uid;
use tracing::warn;

use crate::error::{HardwareError, HardwareResult};
use crate::ports::CardProbe;

const GET_UID_APDU: [u8; 5] = [0xFF, 0xCA, 0x00, 0x00, 0x00];
const STATUS_OK: [u8; 2] = [0x90, 0x00];

/// PC/SC card probe.
#[derive(Debug, Default)]
pub struct PcscCardProbe;

impl PcscCardProbe {
    pub fn new() -> Self {
        Self
    }
}

impl CardProbe for PcscCardProbe {
    fn probe(&self) -> HardwareResult<Option<Uid>> {
        let unavailable = |e: PcscError| HardwareError::HardwareUnavailable {
            reason: e.to_string(),
        };

        let ctx = Context::establish(Scope::User).map_err(unavailable)?;
        let mut readers_buf = [0; 2048];
        let reader = ctx
            .list_readers(&mut readers_buf)
            .map_err(unavailable)?
            .next()
            .ok_or_else(|| HardwareError::HardwareUnavailable {
                reason: "no PC/SC reader attached".to_string(),
            })?;

        let card = match ctx.connect(reader, ShareMode::Shared, Protocols::ANY) {
            Ok(card) => card,
            Err(PcscError::NoSmartcard) | Err(PcscError::RemovedCard) => return Ok(None),
            Err(e) => {
                return Err(HardwareError::CardRead {
                    reason: e.to_string(),
                })
            }
        };

        let mut response_buf = [0; MAX_BUFFER_SIZE];
        let response = card
            .transmit(&GET_UID_APDU, &mut response_buf)
            .map_err(|e| HardwareError::CardRead {
                reason: e.to_string(),
            })?;

        match response.split_last_chunk::<2>() {
            Some((uid_bytes, status)) if *status == STATUS_OK => Ok(Uid::from_bytes(uid_bytes)),
            Some((_, status)) => {
                warn!(sw1 = status[0], sw2 = status[1], "GET UID rejected by card");
                Err(HardwareError::CardRead {
                    reason: format!("status {:02X} {:02X}", status[0], status[1]),
                })
            }
            None => Err(HardwareError::CardRead {
                reason: "short response".to_string(),
            }),
        }
    }
}
