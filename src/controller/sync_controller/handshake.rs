// src/controller/sync_controller/handshake.rs

use super::SyncController;
use crate::common::{
    command::Command,
    control::ControlToken,
    error::ProtocolError,
    hal_traits::{ProtocolSerial, ProtocolTimer},
};
use core::fmt::Debug;
use core::time::Duration;
use log::debug;

impl<IF> SyncController<IF>
where
    IF: ProtocolSerial + ProtocolTimer,
    IF::Error: Debug,
{
    /// Executes one Protocol A command exchange:
    /// `ENQ`, command + `NUL`, wait for `EOT`, `ACK`.
    ///
    /// The instrument does not answer the opening `ENQ` with an `ACK` in
    /// practice, so none is awaited before the command is sent. Success means
    /// the instrument took the command, not that it has finished executing it.
    pub fn execute_command(
        &mut self,
        command: &Command,
        timeout: Duration,
    ) -> Result<(), ProtocolError<IF::Error>> {
        // Format before touching the line so a bad command sends nothing.
        let command_buffer = command.format_into()?;
        debug!("sending command {}", command);

        self.write_token(ControlToken::Enq)?;
        self.write_bytes(&command_buffer)?;

        let deadline = self.deadline_after(timeout);
        self.read_until_token(ControlToken::Eot, deadline)?;

        self.write_token(ControlToken::Ack)
    }
}
