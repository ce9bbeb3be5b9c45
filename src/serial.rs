// src/serial.rs

//! Host serial port channel, backed by the `serialport` crate.

use crate::common::{
    frame::{FrameFormat, Parity},
    hal_traits::{ProtocolSerial, ProtocolTimer},
    error::ProtocolError,
};
use crate::session::{InstrumentSession, SessionConfig};
use log::debug;
use serialport::{ClearBuffer, DataBits, SerialPort, StopBits};
use std::boxed::Box;
use std::io::{self, Read, Write};
use std::string::{String, ToString};
use std::time::{Duration, Instant};

/// A session over a host serial port.
pub type SerialSession = InstrumentSession<SerialPortInterface>;

/// [`ProtocolSerial`] + [`ProtocolTimer`] over an open `serialport` handle.
///
/// Reads are polled: `read_byte` reports `WouldBlock` while the receive
/// buffer is empty, so waits are bounded by the caller's deadline rather
/// than the port timeout.
pub struct SerialPortInterface {
    port: Box<dyn SerialPort>,
    port_name: String,
}

impl core::fmt::Debug for SerialPortInterface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerialPortInterface")
            .field("port_name", &self.port_name)
            .finish_non_exhaustive()
    }
}

impl SerialPortInterface {
    /// Opens `port_name` with the fixed line settings of `frame`.
    pub fn open(port_name: &str, frame: FrameFormat, timeout: Duration) -> serialport::Result<Self> {
        let data_bits = match frame.data_bits() {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        };
        let parity = match frame.parity() {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        };
        let stop_bits = match frame.stop_bits() {
            2 => StopBits::Two,
            _ => StopBits::One,
        };

        let port = serialport::new(port_name, frame.baud_rate())
            .data_bits(data_bits)
            .parity(parity)
            .stop_bits(stop_bits)
            .timeout(timeout)
            .open()?;

        debug!(
            "serial port '{}' opened at {} baud ({:?})",
            port_name,
            frame.baud_rate(),
            frame
        );
        Ok(Self { port, port_name: port_name.to_string() })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl ProtocolSerial for SerialPortInterface {
    type Error = serialport::Error;

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        if self.port.bytes_to_read()? == 0 {
            return Err(nb::Error::WouldBlock);
        }
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Ok(byte[0]),
            Ok(_) => Err(nb::Error::WouldBlock),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(e.into())),
        }
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        match self.port.write(&[byte]) {
            Ok(1) => Ok(()),
            Ok(_) => Err(nb::Error::WouldBlock),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(e.into())),
        }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.port.flush().map_err(|e| nb::Error::Other(e.into()))
    }

    fn clear_buffers(&mut self) -> Result<(), Self::Error> {
        self.port.clear(ClearBuffer::All)
    }
}

impl ProtocolTimer for SerialPortInterface {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

impl InstrumentSession<SerialPortInterface> {
    /// Opens `port_name` at 9600-7-O-1 with `timeout` as the port I/O timeout
    /// and otherwise default settings.
    pub fn open(port_name: &str, timeout: Duration) -> Result<Self, ProtocolError<serialport::Error>> {
        Self::open_with_config(port_name, SessionConfig::default().with_read_timeout(timeout))
    }

    pub fn open_with_config(
        port_name: &str,
        config: SessionConfig,
    ) -> Result<Self, ProtocolError<serialport::Error>> {
        let interface = SerialPortInterface::open(port_name, FrameFormat::Protocol7O1, config.read_timeout)
            .map_err(ProtocolError::Configuration)?;
        InstrumentSession::new(interface, config)
    }
}
