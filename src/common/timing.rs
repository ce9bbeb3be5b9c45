// src/common/timing.rs

use super::frame::FrameFormat;
use core::time::Duration;

// Nominal values. The instrument manual gives no tolerances for Protocol A,
// so the defaults below are generous and every one is overridable through
// `SessionConfig`.

// === Line Timing at 9600 Baud (7O1) ===
// 1 start bit + 7 data bits + 1 parity bit + 1 stop bit = 10 bits per byte
// Time per byte = 10 / 9600 s = 1.0416... ms

/// Time one byte of `frame` occupies on the line, rounded to the microsecond.
pub const fn byte_duration(frame: FrameFormat) -> Duration {
    let bits = frame.bits_per_byte() as u64;
    let baud = frame.baud_rate() as u64;
    Duration::from_micros((bits * 1_000_000 + baud / 2) / baud)
}

/// Nominal duration of a single byte (10 bits total) at 9600 baud.
pub const BYTE_DURATION: Duration = byte_duration(FrameFormat::Protocol7O1);

/// Slack added on top of the nominal transmit time of a write.
pub const WRITE_MARGIN: Duration = Duration::from_millis(20);

/// Interval between polls of a channel that reported `WouldBlock`.
pub const POLL_INTERVAL_US: u32 = 100;

// === Session Defaults ===

/// Serial port I/O timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Deadline for the instrument to answer a command with EOT, or a transfer
/// request with ENQ.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for each transfer data record to arrive in full.
pub const DEFAULT_RECORD_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause between the transfer ENQ and the transfer request. Without it the
/// instrument drops the request.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Point count requested by a default transfer: one full 190..1100 nm scan.
pub const DEFAULT_MAX_POINTS: u16 = 1001;

/// Time allowed to write `len` bytes at line speed.
pub fn write_allowance(len: usize) -> Duration {
    BYTE_DURATION * len as u32 + WRITE_MARGIN
}
