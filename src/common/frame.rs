// src/common/frame.rs

/// Serial frame formats used by the instrument.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameFormat {
    /// Protocol A line settings: 9600 baud, 7 data bits, Odd parity, 1 stop bit.
    Protocol7O1,
}

/// Parity setting of a frame format.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl FrameFormat {
    pub const fn baud_rate(self) -> u32 {
        match self {
            FrameFormat::Protocol7O1 => 9600,
        }
    }

    pub const fn data_bits(self) -> u8 {
        match self {
            FrameFormat::Protocol7O1 => 7,
        }
    }

    pub const fn parity(self) -> Parity {
        match self {
            FrameFormat::Protocol7O1 => Parity::Odd,
        }
    }

    pub const fn stop_bits(self) -> u8 {
        match self {
            FrameFormat::Protocol7O1 => 1,
        }
    }

    /// Start bit + data bits + parity bit + stop bits.
    pub const fn bits_per_byte(self) -> u32 {
        let parity = match self.parity() {
            Parity::None => 0,
            Parity::Odd | Parity::Even => 1,
        };
        1 + self.data_bits() as u32 + parity + self.stop_bits() as u32
    }
}
