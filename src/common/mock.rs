// src/common/mock.rs

//! Scripted in-memory channel with a simulated clock, for unit tests.

use super::hal_traits::{ProtocolSerial, ProtocolTimer};
use core::time::Duration;
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MockInstant(pub u64);

impl core::ops::Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

impl core::ops::Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockCommError;

/// Bytes staged for reading become visible only once `after_writes` bytes
/// have been written, so replies follow the request that triggers them.
#[derive(Debug)]
pub(crate) struct MockInterface {
    pub current_time_us: u64,
    read_queue: VecDeque<(usize, u8)>,
    pub write_log: Vec<u8>,
    /// Time at which each byte in `write_log` was written.
    pub write_times: Vec<u64>,
    pub delays_ms: Vec<u32>,
    pub fail_writes: bool,
    pub fail_clear: bool,
    /// Shared so tests can observe cleanup after the owner is dropped.
    pub clear_count: Rc<Cell<usize>>,
    pub dropped: Rc<Cell<bool>>,
    /// Byte returned whenever nothing staged is readable, with the time each one takes.
    line_noise: Option<(u8, u64)>,
    pub reads: usize,
}

impl MockInterface {
    pub fn new() -> Self {
        MockInterface {
            current_time_us: 0,
            read_queue: VecDeque::new(),
            write_log: Vec::new(),
            write_times: Vec::new(),
            delays_ms: Vec::new(),
            fail_writes: false,
            fail_clear: false,
            clear_count: Rc::new(Cell::new(0)),
            dropped: Rc::new(Cell::new(false)),
            line_noise: None,
            reads: 0,
        }
    }

    /// Stages bytes readable immediately.
    pub fn stage_read_data(&mut self, data: &[u8]) {
        self.stage_after(0, data);
    }

    /// Stages bytes readable once `after_writes` bytes have been written.
    pub fn stage_after(&mut self, after_writes: usize, data: &[u8]) {
        self.read_queue.extend(data.iter().map(|b| (after_writes, *b)));
    }

    /// Makes the line deliver `byte` endlessly, one every `byte_time_us`.
    pub fn stream_noise(&mut self, byte: u8, byte_time_us: u64) {
        self.line_noise = Some((byte, byte_time_us));
    }

    pub fn unread(&self) -> usize {
        self.read_queue.len()
    }

    fn advance_time(&mut self, us: u64) {
        self.current_time_us = self.current_time_us.saturating_add(us);
    }
}

impl Drop for MockInterface {
    fn drop(&mut self) {
        self.dropped.set(true);
    }
}

impl ProtocolTimer for MockInterface {
    type Instant = MockInstant;
    fn now(&self) -> Self::Instant {
        MockInstant(self.current_time_us)
    }
    fn delay_us(&mut self, us: u32) {
        self.advance_time(u64::from(us));
    }
    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
        self.advance_time(u64::from(ms) * 1000);
    }
}

impl ProtocolSerial for MockInterface {
    type Error = MockCommError;

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        match self.read_queue.front() {
            Some(&(gate, byte)) if self.write_log.len() >= gate => {
                self.read_queue.pop_front();
                self.reads += 1;
                Ok(byte)
            }
            _ => match self.line_noise {
                Some((byte, byte_time_us)) => {
                    self.advance_time(byte_time_us);
                    self.reads += 1;
                    Ok(byte)
                }
                None => Err(nb::Error::WouldBlock),
            },
        }
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        if self.fail_writes {
            return Err(nb::Error::Other(MockCommError));
        }
        self.write_log.push(byte);
        self.write_times.push(self.current_time_us);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), Self::Error> {
        if self.fail_clear {
            return Err(MockCommError);
        }
        self.clear_count.set(self.clear_count.get() + 1);
        Ok(())
    }
}
