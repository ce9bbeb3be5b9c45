//! Protocol A command definitions.
//!
//! Each instrument operation maps to one opcode byte followed by an ASCII
//! argument. On the wire every command is terminated by `NUL`.

use core::fmt::{self, Write};

use arrayvec::ArrayVec;

use super::control::NUL;

/// Shortest wavelength the instrument accepts, in nm.
pub const WAVELENGTH_MIN_NM: u16 = 190;
/// Longest wavelength the instrument accepts, in nm.
pub const WAVELENGTH_MAX_NM: u16 = 1100;
/// Minimum distance between the long and short end of a scan range, in nm.
pub const MIN_SCAN_SPAN_NM: u16 = 10;
/// Largest point count the 4-digit transfer request can carry.
pub const MAX_REQUEST_POINTS: u16 = 9999;

/// Longest encoded command, including the `NUL` terminator (`h1100,1090\0` is 11).
pub const MAX_COMMAND_LEN: usize = 16;

/// Wire bytes of a formatted command, `NUL` terminator included.
pub type CommandBuffer = ArrayVec<u8, MAX_COMMAND_LEN>;

/// Reasons a command could not be built. Raised before any byte is written.
#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("scan range {long},{short} nm outside 190..=1100 nm")]
    ScanRangeOutOfBounds { long: u16, short: u16 },

    #[error("scan range {long},{short} nm narrower than 10 nm")]
    ScanSpanTooNarrow { long: u16, short: u16 },

    #[error("wavelength {0} nm outside 190.0..=1100.0 nm")]
    WavelengthOutOfRange(f64),

    #[error("point count {0} outside 1..=9999")]
    PointCountOutOfRange(u16),

    #[error("encoded command exceeds 16 bytes")]
    BufferOverflow,
}

/// Scanning range, long end first. Only constructible through [`ScanRange::new`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ScanRange {
    long_wave: u16,
    short_wave: u16,
}

impl ScanRange {
    /// Both ends must lie in 190..=1100 nm and be at least 10 nm apart.
    pub fn new(long_wave: u16, short_wave: u16) -> Result<Self, CommandError> {
        let in_bounds = |nm: u16| (WAVELENGTH_MIN_NM..=WAVELENGTH_MAX_NM).contains(&nm);
        if !in_bounds(long_wave) || !in_bounds(short_wave) {
            return Err(CommandError::ScanRangeOutOfBounds { long: long_wave, short: short_wave });
        }
        if i32::from(long_wave) - i32::from(short_wave) < i32::from(MIN_SCAN_SPAN_NM) {
            return Err(CommandError::ScanSpanTooNarrow { long: long_wave, short: short_wave });
        }
        Ok(Self { long_wave, short_wave })
    }

    #[inline]
    pub const fn long_wave(&self) -> u16 {
        self.long_wave
    }

    #[inline]
    pub const fn short_wave(&self) -> u16 {
        self.short_wave
    }
}

/// Scanning speed.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpeedSetting {
    Fast,
    #[default]
    Medium,
    Slow,
    VerySlow,
}

impl SpeedSetting {
    pub const fn code(self) -> u8 {
        match self {
            SpeedSetting::Fast => 1,
            SpeedSetting::Medium => 2,
            SpeedSetting::Slow => 3,
            SpeedSetting::VerySlow => 4,
        }
    }

    /// Resolves a speed by name, case-insensitively. Unknown names give `Medium`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("fast") {
            SpeedSetting::Fast
        } else if name.eq_ignore_ascii_case("slow") {
            SpeedSetting::Slow
        } else if name.eq_ignore_ascii_case("very slow") || name.eq_ignore_ascii_case("very_slow") {
            SpeedSetting::VerySlow
        } else {
            SpeedSetting::Medium
        }
    }
}

impl From<&str> for SpeedSetting {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

/// Photometric measurement mode.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MeasurementMode {
    TransmittancePct,
    #[default]
    Absorbance,
    Energy,
}

impl MeasurementMode {
    pub const fn code(self) -> u8 {
        match self {
            MeasurementMode::TransmittancePct => 1,
            MeasurementMode::Absorbance => 2,
            MeasurementMode::Energy => 3,
        }
    }

    /// Resolves a mode by its panel name (`t%`, `abs`, `energy`), case-insensitively.
    /// Unknown names give `Absorbance`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("t%") {
            MeasurementMode::TransmittancePct
        } else if name.eq_ignore_ascii_case("energy") {
            MeasurementMode::Energy
        } else {
            MeasurementMode::Absorbance
        }
    }
}

impl From<&str> for MeasurementMode {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

/// Fixed wavelength, held in tenths of a nanometre.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WavelengthSetpoint(u16);

impl WavelengthSetpoint {
    /// Accepts 190.0..=1100.0 nm. Precision beyond one decimal is rounded away.
    pub fn new(nm: f64) -> Result<Self, CommandError> {
        let min = f64::from(WAVELENGTH_MIN_NM);
        let max = f64::from(WAVELENGTH_MAX_NM);
        // NaN fails both comparisons
        if !(nm >= min && nm <= max) {
            return Err(CommandError::WavelengthOutOfRange(nm));
        }
        // Positive after the range check, so truncating `+ 0.5` rounds.
        Ok(Self((nm * 10.0 + 0.5) as u16))
    }

    #[inline]
    pub const fn tenths(&self) -> u16 {
        self.0
    }

    pub fn nm(&self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

/// Number of records requested by a transfer, 1..=9999.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PointCount(u16);

impl PointCount {
    pub fn new(count: u16) -> Result<Self, CommandError> {
        if (1..=MAX_REQUEST_POINTS).contains(&count) {
            Ok(Self(count))
        } else {
            Err(CommandError::PointCountOutOfRange(count))
        }
    }

    #[inline]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// A Protocol A command. Arguments are validated when the variant's payload
/// is built, so every `Command` value is encodable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    /// Measure (`a`) - performs a wavelength scan.
    Measure,
    /// Scanning range (`h<long>,<short>`).
    ScanRange(ScanRange),
    /// Scanning speed (`j<1..4>`).
    Speed(SpeedSetting),
    /// Measurement mode (`v<1..3>`).
    Mode(MeasurementMode),
    /// Wavelength setting (`w<digits>`), decimal point removed.
    Wavelength(WavelengthSetpoint),
    /// Transfer file data (`f<nnnn>`), zero-padded point count.
    TransferRequest(PointCount),
}

impl Command {
    pub fn measure() -> Self {
        Command::Measure
    }

    pub fn scan_range(long_wave: u16, short_wave: u16) -> Result<Self, CommandError> {
        ScanRange::new(long_wave, short_wave).map(Command::ScanRange)
    }

    pub fn speed(speed: SpeedSetting) -> Self {
        Command::Speed(speed)
    }

    pub fn mode(mode: MeasurementMode) -> Self {
        Command::Mode(mode)
    }

    pub fn wavelength(nm: f64) -> Result<Self, CommandError> {
        WavelengthSetpoint::new(nm).map(Command::Wavelength)
    }

    pub fn transfer_request(max_points: u16) -> Result<Self, CommandError> {
        PointCount::new(max_points).map(Command::TransferRequest)
    }

    /// The opcode byte that leads the command on the wire.
    pub const fn opcode(&self) -> u8 {
        match self {
            Command::Measure => b'a',
            Command::ScanRange(_) => b'h',
            Command::Speed(_) => b'j',
            Command::Mode(_) => b'v',
            Command::Wavelength(_) => b'w',
            Command::TransferRequest(_) => b'f',
        }
    }

    fn write_argument<W: Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Command::Measure => Ok(()),
            Command::ScanRange(range) => write!(out, "{},{}", range.long_wave, range.short_wave),
            Command::Speed(speed) => write!(out, "{}", speed.code()),
            Command::Mode(mode) => write!(out, "{}", mode.code()),
            Command::Wavelength(setpoint) => write!(out, "{}", setpoint.tenths()),
            Command::TransferRequest(count) => write!(out, "{:04}", count.get()),
        }
    }

    /// Formats the command into its wire bytes, `NUL` terminator included.
    pub fn format_into(&self) -> Result<CommandBuffer, CommandError> {
        let mut text = arrayvec::ArrayString::<MAX_COMMAND_LEN>::new();
        write!(text, "{}", self).map_err(|_| CommandError::BufferOverflow)?;

        let mut buffer = CommandBuffer::new();
        buffer
            .try_extend_from_slice(text.as_bytes())
            .map_err(|_| CommandError::BufferOverflow)?;
        buffer.try_push(NUL).map_err(|_| CommandError::BufferOverflow)?;
        Ok(buffer)
    }
}

/// Writes the command text without the `NUL` terminator, e.g. `h700,400`.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(char::from(self.opcode()))?;
        self.write_argument(f)
    }
}
