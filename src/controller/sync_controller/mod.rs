// src/controller/sync_controller/mod.rs

use crate::common::{
    error::ProtocolError,
    hal_traits::{ProtocolSerial, ProtocolTimer},
};
use core::fmt::Debug;

mod handshake;
mod io_helpers;
mod transfer;

pub use transfer::TransferOptions;

/// Blocking Protocol A engine. Owns the byte channel for its whole lifetime;
/// exactly one exchange is in flight at a time.
#[derive(Debug)]
pub struct SyncController<IF>
where
    IF: ProtocolSerial + ProtocolTimer,
    IF::Error: Debug,
{
    interface: IF,
}

impl<IF> SyncController<IF>
where
    IF: ProtocolSerial + ProtocolTimer,
    IF::Error: Debug,
{
    pub fn new(interface: IF) -> Self {
        SyncController { interface }
    }

    pub fn interface(&self) -> &IF {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    /// Hands the channel back to the caller.
    pub fn into_inner(self) -> IF {
        self.interface
    }

    /// Discards anything pending in the receive and transmit buffers.
    pub fn reset_buffers(&mut self) -> Result<(), ProtocolError<IF::Error>> {
        self.interface.clear_buffers().map_err(ProtocolError::Io)
    }
}
