//! # Shared Types Crate
//!
//! Domain entities consumed by every kiosk crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers and value objects that cross
//!   crate boundaries are defined here and nowhere else.
//! - **Exact arithmetic**: weights are fixed-point hundredths of a kilogram,
//!   so ledger deltas never drift the way binary floats do.
//! - **Injectable time**: every component reads the clock through
//!   [`TimeSource`], which lets tests move time forward deterministically.

pub mod entities;
pub mod errors;
pub mod time;
pub mod weight;

pub use entities::*;
pub use errors::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
pub use weight::Weight;
