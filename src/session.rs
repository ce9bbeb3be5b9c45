// src/session.rs

//! Instrument session: owns the channel exclusively from open to close.

use crate::common::{
    command::{Command, MeasurementMode, SpeedSetting},
    error::ProtocolError,
    hal_traits::{ProtocolSerial, ProtocolTimer},
    record::DataPoint,
    timing,
};
use crate::controller::{SyncController, TransferOptions};
use core::fmt::Debug;
use core::time::Duration;
use log::{debug, warn};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Timeouts and transfer parameters of a session. Line settings are fixed
/// (see [`FrameFormat::Protocol7O1`](crate::common::FrameFormat)) and not part
/// of the configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Serial port I/O timeout.
    pub read_timeout: Duration,
    /// Deadline for `EOT` after a command and for `ENQ` after a transfer request.
    pub handshake_timeout: Duration,
    /// Deadline for each transfer record.
    pub record_timeout: Duration,
    /// Pause between the transfer `ENQ` and the transfer request.
    pub settle_delay: Duration,
    /// Records requested by [`InstrumentSession::transfer`].
    pub max_points: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            read_timeout: timing::DEFAULT_READ_TIMEOUT,
            handshake_timeout: timing::DEFAULT_HANDSHAKE_TIMEOUT,
            record_timeout: timing::DEFAULT_RECORD_TIMEOUT,
            settle_delay: timing::DEFAULT_SETTLE_DELAY,
            max_points: timing::DEFAULT_MAX_POINTS,
        }
    }
}

impl SessionConfig {
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_record_timeout(mut self, timeout: Duration) -> Self {
        self.record_timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_max_points(mut self, max_points: u16) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            max_points: self.max_points,
            settle_delay: self.settle_delay,
            ready_timeout: self.handshake_timeout,
            record_timeout: self.record_timeout,
        }
    }
}

/// A session with one instrument.
///
/// Buffers are reset when the session starts and again when it closes; the
/// channel is dropped on close. Closing happens on [`close`](Self::close) or
/// when the session goes out of scope, whichever comes first. Operations after
/// close fail with [`ProtocolError::ChannelClosed`].
///
/// A session cannot be shared; moving it hands the channel over.
#[derive(Debug)]
pub struct InstrumentSession<IF>
where
    IF: ProtocolSerial + ProtocolTimer,
    IF::Error: Debug,
{
    controller: Option<SyncController<IF>>,
    config: SessionConfig,
}

impl<IF> InstrumentSession<IF>
where
    IF: ProtocolSerial + ProtocolTimer,
    IF::Error: Debug,
{
    /// Starts a session on an already-configured channel and resets its buffers.
    pub fn new(interface: IF, config: SessionConfig) -> Result<Self, ProtocolError<IF::Error>> {
        let mut controller = SyncController::new(interface);
        controller
            .reset_buffers()
            .map_err(|e| match e {
                ProtocolError::Io(e) => ProtocolError::Configuration(e),
                other => other,
            })?;
        Ok(Self { controller: Some(controller), config })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.controller.is_some()
    }

    fn controller(&mut self) -> Result<&mut SyncController<IF>, ProtocolError<IF::Error>> {
        self.controller.as_mut().ok_or(ProtocolError::ChannelClosed)
    }

    fn dispatch(&mut self, command: Command) -> Result<(), ProtocolError<IF::Error>> {
        let timeout = self.config.handshake_timeout;
        self.controller()?.execute_command(&command, timeout)
    }

    /// `[Measure]`: performs a wavelength scan.
    pub fn measure(&mut self) -> Result<(), ProtocolError<IF::Error>> {
        self.dispatch(Command::measure())
    }

    /// `[Scanning range]`: long end first, both in 190..=1100 nm, at least 10 nm apart.
    ///
    /// Bounds are whole nanometres; fractional ends cannot be expressed.
    pub fn set_scan_range(&mut self, long_wave: u16, short_wave: u16) -> Result<(), ProtocolError<IF::Error>> {
        self.controller()?;
        self.dispatch(Command::scan_range(long_wave, short_wave)?)
    }

    /// `[Scanning speed]`
    pub fn set_speed(&mut self, speed: SpeedSetting) -> Result<(), ProtocolError<IF::Error>> {
        self.dispatch(Command::speed(speed))
    }

    /// `[Measurement mode]`
    pub fn set_mode(&mut self, mode: MeasurementMode) -> Result<(), ProtocolError<IF::Error>> {
        self.dispatch(Command::mode(mode))
    }

    /// `[Wavelength setting]`: 190.0..=1100.0 nm, one decimal.
    pub fn set_wavelength(&mut self, nm: f64) -> Result<(), ProtocolError<IF::Error>> {
        self.controller()?;
        self.dispatch(Command::wavelength(nm)?)
    }

    /// `[Transfer file data]`: streams stored data points to `sink`.
    pub fn transfer_with<F>(&mut self, sink: F) -> Result<usize, ProtocolError<IF::Error>>
    where
        F: FnMut(DataPoint),
    {
        let options = self.config.transfer_options();
        self.controller()?.transfer_with(&options, sink)
    }

    /// `[Transfer file data]`: retrieves stored data points in emission order.
    #[cfg(feature = "alloc")]
    pub fn transfer(&mut self) -> Result<Vec<DataPoint>, ProtocolError<IF::Error>> {
        let options = self.config.transfer_options();
        self.controller()?.transfer(&options)
    }

    /// Resets both buffers and releases the channel. Calling it again is a no-op.
    ///
    /// The channel is released even when the buffer reset fails.
    pub fn close(&mut self) -> Result<(), ProtocolError<IF::Error>> {
        match self.controller.take() {
            Some(mut controller) => {
                let result = controller.reset_buffers();
                drop(controller);
                debug!("instrument session closed");
                result
            }
            None => Ok(()),
        }
    }
}

impl<IF> Drop for InstrumentSession<IF>
where
    IF: ProtocolSerial + ProtocolTimer,
    IF::Error: Debug,
{
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("buffer reset failed while closing session: {:?}", e);
        }
    }
}
