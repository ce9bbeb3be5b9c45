// src/controller/sync_controller/io_helpers.rs

use super::SyncController; // Access SyncController definition
use crate::common::{
    control::{ControlToken, EOT, NUL},
    error::ProtocolError,
    hal_traits::{ProtocolSerial, ProtocolTimer},
    record::{RecordError, MAX_RECORD_LEN},
    timing,
};
use core::fmt::Debug;
use core::time::Duration;
use log::{trace, warn};
use nb::Result as NbResult;

/// Buffer one transfer record is accumulated into.
pub(super) type RecordBuffer = heapless::Vec<u8, MAX_RECORD_LEN>;

/// How a call to `read_record` ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum RecordEnd {
    /// A `NUL`-terminated record is in the buffer.
    Record,
    /// `EOT` arrived before any record byte.
    EndOfData,
}

// Implementation block for I/O related helpers
impl<IF> SyncController<IF>
where
    IF: ProtocolSerial + ProtocolTimer,
    IF::Error: Debug,
{
    pub(super) fn deadline_after(&self, timeout: Duration) -> IF::Instant {
        self.interface.now() + timeout
    }

    /// Executes a non-blocking I/O operation (`f`) repeatedly until it
    /// stops returning `WouldBlock`, returning the final result or a timeout
    /// error once `deadline` has passed.
    pub(super) fn execute_blocking_io_with_timeout<FN, T>(
        &mut self,
        deadline: IF::Instant,
        mut f: FN,
    ) -> Result<T, ProtocolError<IF::Error>>
    where
        FN: FnMut(&mut IF) -> NbResult<T, IF::Error>,
    {
        loop {
            match f(&mut self.interface) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if self.interface.now() >= deadline {
                        return Err(ProtocolError::Timeout);
                    }
                    self.interface.delay_us(timing::POLL_INTERVAL_US);
                }
                Err(nb::Error::Other(e)) => return Err(ProtocolError::Io(e)),
            }
        }
    }

    /// Writes `bytes` and flushes, bounded by the time the line needs to send them.
    pub(super) fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ProtocolError<IF::Error>> {
        let deadline = self.deadline_after(timing::write_allowance(bytes.len()));

        for byte in bytes {
            self.execute_blocking_io_with_timeout(deadline, |iface| iface.write_byte(*byte))?;
        }
        self.execute_blocking_io_with_timeout(deadline, |iface| iface.flush())?;

        Ok(())
    }

    pub(super) fn write_token(&mut self, token: ControlToken) -> Result<(), ProtocolError<IF::Error>> {
        trace!("-> {}", token);
        self.write_bytes(&[token.as_byte()])
    }

    /// Reads and discards bytes until `token` arrives or `deadline` passes.
    ///
    /// The deadline holds even when the line never goes quiet.
    pub(super) fn read_until_token(
        &mut self,
        token: ControlToken,
        deadline: IF::Instant,
    ) -> Result<(), ProtocolError<IF::Error>> {
        let mut discarded = 0usize;
        loop {
            let byte = match self.execute_blocking_io_with_timeout(deadline, |iface| iface.read_byte()) {
                Ok(byte) => byte,
                Err(ProtocolError::Timeout) => {
                    warn!("timed out waiting for {} ({} other bytes seen)", token, discarded);
                    return Err(ProtocolError::Timeout);
                }
                Err(e) => return Err(e),
            };

            if byte == token.as_byte() {
                trace!("<- {} after {} discarded bytes", token, discarded);
                return Ok(());
            }
            trace!("discarding {:#04x} while waiting for {}", byte, token);
            discarded += 1;

            if self.interface.now() >= deadline {
                warn!("timed out waiting for {} ({} other bytes seen)", token, discarded);
                return Err(ProtocolError::Timeout);
            }
        }
    }

    /// Accumulates one transfer record into `buffer` until `NUL`.
    ///
    /// `EOT` before the first byte ends the data; `EOT` after it means the
    /// record was cut short.
    pub(super) fn read_record(
        &mut self,
        buffer: &mut RecordBuffer,
        deadline: IF::Instant,
    ) -> Result<RecordEnd, ProtocolError<IF::Error>> {
        buffer.clear();
        loop {
            let byte = self.execute_blocking_io_with_timeout(deadline, |iface| iface.read_byte())?;

            match byte {
                NUL => return Ok(RecordEnd::Record),
                EOT if buffer.is_empty() => return Ok(RecordEnd::EndOfData),
                EOT => return Err(RecordError::Truncated.into()),
                _ => buffer.push(byte).map_err(|_| RecordError::TooLong)?,
            }
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::control::{ACK, ENQ};
    use crate::common::mock::{MockCommError, MockInstant, MockInterface};

    #[test]
    fn test_execute_blocking_io_with_timeout() {
        let mut controller = SyncController::new(MockInterface::new());

        // Ok path after a few WouldBlock polls
        let mut calls = 0;
        let deadline = controller.deadline_after(Duration::from_millis(10));
        let result_ok: Result<i32, _> = controller.execute_blocking_io_with_timeout(deadline, |_| {
            calls += 1;
            if calls < 4 { Err(nb::Error::WouldBlock) } else { Ok(123) }
        });
        assert_eq!(result_ok.unwrap(), 123);
        assert_eq!(calls, 4);
        assert_eq!(controller.interface.current_time_us, 3 * u64::from(timing::POLL_INTERVAL_US));

        // Timeout path
        controller.interface.current_time_us = 0;
        let deadline = controller.deadline_after(Duration::from_millis(5));
        let result_timeout: Result<(), _> =
            controller.execute_blocking_io_with_timeout(deadline, |_| Err(nb::Error::WouldBlock));
        assert!(matches!(result_timeout, Err(ProtocolError::Timeout)));
        assert!(controller.interface.current_time_us >= 5_000);
        assert!(controller.interface.current_time_us < 5_000 + 2 * u64::from(timing::POLL_INTERVAL_US));

        // IO error path
        let deadline = controller.deadline_after(Duration::from_millis(5));
        let result_io_err: Result<(), _> =
            controller.execute_blocking_io_with_timeout(deadline, |_| Err(nb::Error::Other(MockCommError)));
        assert!(matches!(result_io_err, Err(ProtocolError::Io(MockCommError))));
    }

    #[test]
    fn test_write_bytes() {
        let mut controller = SyncController::new(MockInterface::new());
        controller.write_bytes(b"a\0").unwrap();
        controller.write_token(ControlToken::Ack).unwrap();
        assert_eq!(controller.interface.write_log, [b'a', NUL, ACK]);

        controller.interface.fail_writes = true;
        assert!(matches!(controller.write_bytes(b"x"), Err(ProtocolError::Io(MockCommError))));
    }

    #[test]
    fn test_read_until_token_skips_noise() {
        let mut mock_if = MockInterface::new();
        mock_if.stage_read_data(&[b'x', ACK, 0x7F, EOT, b'y']);
        let mut controller = SyncController::new(mock_if);
        let deadline = controller.deadline_after(Duration::from_secs(1));

        controller.read_until_token(ControlToken::Eot, deadline).unwrap();
        assert_eq!(controller.interface.unread(), 1);
    }

    #[test]
    fn test_read_until_token_times_out() {
        let mut mock_if = MockInterface::new();
        mock_if.stage_read_data(&[ENQ, ENQ]);
        let mut controller = SyncController::new(mock_if);
        let deadline = controller.deadline_after(Duration::from_millis(50));

        let result = controller.read_until_token(ControlToken::Eot, deadline);
        assert!(matches!(result, Err(ProtocolError::Timeout)));
        assert!(controller.interface.now() >= MockInstant(50_000));
    }

    #[test]
    fn test_read_until_token_deadline_holds_under_continuous_noise() {
        let byte_us = timing::BYTE_DURATION.as_micros() as u64;
        let mut mock_if = MockInterface::new();
        mock_if.stream_noise(b'x', byte_us);
        let mut controller = SyncController::new(mock_if);
        let deadline = controller.deadline_after(Duration::from_millis(50));

        let result = controller.read_until_token(ControlToken::Eot, deadline);
        assert!(matches!(result, Err(ProtocolError::Timeout)));
        // Stops within one byte time past the deadline
        assert!(controller.interface.now() >= MockInstant(50_000));
        assert!(controller.interface.now() < MockInstant(50_000 + byte_us));
        assert!(controller.interface.reads < 50);
    }

    #[test]
    fn test_read_record() {
        let mut mock_if = MockInterface::new();
        mock_if.stage_read_data(b"500.0 0.123\0");
        mock_if.stage_read_data(&[EOT]);
        let mut controller = SyncController::new(mock_if);
        let mut buffer = RecordBuffer::new();
        let deadline = controller.deadline_after(Duration::from_secs(1));

        assert_eq!(controller.read_record(&mut buffer, deadline).unwrap(), RecordEnd::Record);
        assert_eq!(buffer.as_slice(), b"500.0 0.123");
        assert_eq!(controller.read_record(&mut buffer, deadline).unwrap(), RecordEnd::EndOfData);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_read_record_truncated_by_eot() {
        let mut mock_if = MockInterface::new();
        mock_if.stage_read_data(b"500.0");
        mock_if.stage_read_data(&[EOT]);
        let mut controller = SyncController::new(mock_if);
        let mut buffer = RecordBuffer::new();
        let deadline = controller.deadline_after(Duration::from_secs(1));

        assert!(matches!(
            controller.read_record(&mut buffer, deadline),
            Err(ProtocolError::MalformedData(RecordError::Truncated))
        ));
    }

    #[test]
    fn test_read_record_overflow() {
        let mut mock_if = MockInterface::new();
        mock_if.stage_read_data(&[b'1'; MAX_RECORD_LEN + 1]);
        let mut controller = SyncController::new(mock_if);
        let mut buffer = RecordBuffer::new();
        let deadline = controller.deadline_after(Duration::from_secs(1));

        assert!(matches!(
            controller.read_record(&mut buffer, deadline),
            Err(ProtocolError::MalformedData(RecordError::TooLong))
        ));
    }

    #[test]
    fn test_read_record_timeout_mid_record() {
        let mut mock_if = MockInterface::new();
        mock_if.stage_read_data(b"500.0 0.1");
        let mut controller = SyncController::new(mock_if);
        let mut buffer = RecordBuffer::new();
        let deadline = controller.deadline_after(Duration::from_millis(20));

        assert!(matches!(
            controller.read_record(&mut buffer, deadline),
            Err(ProtocolError::Timeout)
        ));
    }
}
