// src/common/control.rs

//! Single-byte control tokens of the Protocol A vocabulary.

use core::fmt;

/// Enquiry: opens a command exchange, and signals device readiness during transfer.
pub const ENQ: u8 = 0x05;
/// End of transmission: device acknowledges a command, or ends a data transfer.
pub const EOT: u8 = 0x04;
/// Escape. Part of the vocabulary; not emitted by this library.
pub const ESC: u8 = 0x1B;
/// Acknowledge.
pub const ACK: u8 = 0x06;
/// Negative acknowledge. Part of the vocabulary; not emitted by this library.
pub const NAK: u8 = 0x15;
/// Terminates commands and transfer data records.
pub const NUL: u8 = 0x00;

/// A Protocol A control token.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum ControlToken {
    Enq = ENQ,
    Eot = EOT,
    Esc = ESC,
    Ack = ACK,
    Nak = NAK,
    Nul = NUL,
}

impl ControlToken {
    pub const ALL: [ControlToken; 6] = [
        ControlToken::Enq,
        ControlToken::Eot,
        ControlToken::Esc,
        ControlToken::Ack,
        ControlToken::Nak,
        ControlToken::Nul,
    ];

    #[inline]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Maps a received byte back to its token, if it is one.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            ENQ => Some(ControlToken::Enq),
            EOT => Some(ControlToken::Eot),
            ESC => Some(ControlToken::Esc),
            ACK => Some(ControlToken::Ack),
            NAK => Some(ControlToken::Nak),
            NUL => Some(ControlToken::Nul),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ControlToken::Enq => "ENQ",
            ControlToken::Eot => "EOT",
            ControlToken::Esc => "ESC",
            ControlToken::Ack => "ACK",
            ControlToken::Nak => "NAK",
            ControlToken::Nul => "NUL",
        }
    }
}

impl From<ControlToken> for u8 {
    fn from(token: ControlToken) -> Self {
        token.as_byte()
    }
}

impl fmt::Display for ControlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
