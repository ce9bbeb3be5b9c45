// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod control;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod record;
pub mod timing;

#[cfg(test)]
pub(crate) mod mock;

// --- Re-export key types/traits/functions for easier access ---

// From command.rs
pub use command::{
    Command, CommandBuffer, CommandError, MeasurementMode, PointCount, ScanRange, SpeedSetting,
    WavelengthSetpoint,
};

// From control.rs (byte constants stay at common::control::*)
pub use control::ControlToken;

// From error.rs
pub use error::ProtocolError;

// From frame.rs
pub use frame::FrameFormat;

// From hal_traits.rs
pub use hal_traits::{ProtocolInstant, ProtocolSerial, ProtocolTimer};

// From record.rs
pub use record::{DataPoint, RecordError};

// From timing.rs (constants - users can access via common::timing::*)
