//! # NoTouch Kiosk Test Suite
//!
//! Cross-crate tests that wire real adapters together, plus benchmarks.
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── kiosk_benchmarks.rs   # scale line parsing, ledger writes
//! └── src/
//!     ├── fixtures.rs           # DeviceKiosk: scale + reader + file ledger + bus
//!     └── integration/
//!         ├── flows.rs          # disposal flows end to end
//!         ├── concurrency.rs    # reaper, reset and parallel requests
//!         └── http.rs           # the terminal's view over HTTP
//! ```
//!
//! ```bash
//! cargo test -p kiosk-tests
//! cargo test -p kiosk-tests integration::concurrency
//! cargo bench -p kiosk-tests
//! ```

pub mod fixtures;
pub mod integration;
