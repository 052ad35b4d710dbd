//! Cross-crate integration tests.
//!
//! Every test here drives [`DeviceKiosk`](crate::fixtures::DeviceKiosk), so
//! scale lines go through the real parser and averaging, tags through the
//! real polling reader, and ledger writes land in a JSON file on disk.

pub mod concurrency;
pub mod flows;
pub mod http;
