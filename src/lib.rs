// src/lib.rs

#![no_std] // Specify no_std at the crate root

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod common;
pub mod controller;
pub mod session;

#[cfg(feature = "std")]
pub mod serial;

// Re-export key types for convenience
pub use common::{Command, DataPoint, MeasurementMode, ProtocolError, SpeedSetting};
pub use session::{InstrumentSession, SessionConfig};

#[cfg(feature = "std")]
pub use serial::{SerialPortInterface, SerialSession};
