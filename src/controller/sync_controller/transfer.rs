// src/controller/sync_controller/transfer.rs

use super::io_helpers::{RecordBuffer, RecordEnd};
use super::SyncController;
use crate::common::{
    command::Command,
    control::ControlToken,
    error::ProtocolError,
    hal_traits::{ProtocolSerial, ProtocolTimer},
    record::DataPoint,
    timing,
};
use core::fmt::Debug;
use core::time::Duration;
use log::{debug, trace, warn};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Parameters of a stop-and-wait data transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    /// Records requested, and the most that will be accepted.
    pub max_points: u16,
    /// Pause between the opening `ENQ` and the transfer request.
    pub settle_delay: Duration,
    /// Deadline for the instrument to signal readiness with `ENQ`.
    pub ready_timeout: Duration,
    /// Deadline for each record, restarted after every `ACK`.
    pub record_timeout: Duration,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            max_points: timing::DEFAULT_MAX_POINTS,
            settle_delay: timing::DEFAULT_SETTLE_DELAY,
            ready_timeout: timing::DEFAULT_HANDSHAKE_TIMEOUT,
            record_timeout: timing::DEFAULT_RECORD_TIMEOUT,
        }
    }
}

impl<IF> SyncController<IF>
where
    IF: ProtocolSerial + ProtocolTimer,
    IF::Error: Debug,
{
    /// Retrieves stored measurement data, handing each point to `sink` as
    /// soon as it has been acknowledged. Returns the number of points read.
    ///
    /// Exchange: `ENQ`, settle delay, `f<nnnn>` + `NUL`, wait for `ENQ`, `ACK`,
    /// then per record: data + `NUL`, `ACK`. An `EOT` in place of a record ends
    /// the transfer early and is acknowledged too. At most
    /// `options.max_points` records are read.
    ///
    /// A malformed record aborts the transfer without acknowledging it.
    pub fn transfer_with<F>(
        &mut self,
        options: &TransferOptions,
        mut sink: F,
    ) -> Result<usize, ProtocolError<IF::Error>>
    where
        F: FnMut(DataPoint),
    {
        let request = Command::transfer_request(options.max_points)?.format_into()?;

        self.write_token(ControlToken::Enq)?;
        self.settle(options.settle_delay);
        debug!("requesting transfer of up to {} points", options.max_points);
        self.write_bytes(&request)?;

        let deadline = self.deadline_after(options.ready_timeout);
        self.read_until_token(ControlToken::Enq, deadline)?;
        self.write_token(ControlToken::Ack)?;

        let mut buffer = RecordBuffer::new();
        let mut received = 0usize;
        while received < usize::from(options.max_points) {
            let deadline = self.deadline_after(options.record_timeout);
            match self.read_record(&mut buffer, deadline) {
                Ok(RecordEnd::EndOfData) => {
                    trace!("<- EOT after {} records", received);
                    self.write_token(ControlToken::Ack)?;
                    break;
                }
                Ok(RecordEnd::Record) => {}
                Err(e) => {
                    warn!("transfer aborted at record {}: {}", received, e);
                    return Err(e);
                }
            }

            let point = DataPoint::parse_record(&buffer).map_err(|e| {
                warn!("transfer aborted at record {}: {}", received, e);
                ProtocolError::MalformedData(e)
            })?;
            sink(point);
            self.write_token(ControlToken::Ack)?;
            received += 1;
        }

        debug!("transfer finished with {} points", received);
        Ok(received)
    }

    /// Retrieves stored measurement data in instrument emission order.
    /// See [`SyncController::transfer_with`].
    #[cfg(feature = "alloc")]
    pub fn transfer(
        &mut self,
        options: &TransferOptions,
    ) -> Result<Vec<DataPoint>, ProtocolError<IF::Error>> {
        let mut points = Vec::with_capacity(usize::from(options.max_points));
        self.transfer_with(options, |point| points.push(point))?;
        Ok(points)
    }

    fn settle(&mut self, delay: Duration) {
        let ms = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        if ms > 0 {
            self.interface.delay_ms(ms);
        }
        let us = delay.subsec_micros() % 1000;
        if us > 0 {
            self.interface.delay_us(us);
        }
    }
}
