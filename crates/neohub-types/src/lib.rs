//! Shared value types for NeoHub client components.
//!
//! This crate provides the small closed vocabularies of the hub protocol
//! (schedule formats, weekdays, temperature units, DST regions) and the
//! validated argument types (PIN codes, ZigBee channels) used by
//! neohub-core and the CLI. Parsing caller input yields [`UsageError`];
//! decoding hub data yields [`ProtocolDataError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller-side contract violations, raised before any network I/O.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UsageError {
    #[error("Invalid ZigBee channel {0} (allowed: 11, 14, 15, 19, 20, 24, 25)")]
    InvalidChannel(i64),

    #[error("Invalid PIN {0}: must be between 0 and 9999")]
    InvalidPin(i64),

    #[error("Zone reference has no name")]
    MissingZoneName,

    #[error("Invalid DST region '{0}' (allowed: UK, EU, NZ)")]
    InvalidDstRegion(String),

    #[error("Invalid schedule format '{0}'")]
    InvalidScheduleFormat(String),

    #[error("Invalid temperature unit '{0}' (allowed: C, F)")]
    InvalidTemperatureUnit(String),

    #[error("Invalid temperature {0}")]
    InvalidTemperature(f64),
}

/// A decoded hub field that violates the expected domain contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolDataError {
    #[error("Unrecognized schedule format code {0}")]
    UnrecognizedScheduleFormat(i64),

    #[error("Invalid weekday '{0}'")]
    InvalidWeekday(String),

    #[error("Invalid temperature unit '{0}'")]
    InvalidTemperatureUnit(String),

    #[error("Invalid duration in {field}: '{value}'")]
    InvalidDuration { field: &'static str, value: String },

    #[error("Invalid timestamp in {field}: '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

impl ProtocolDataError {
    pub fn invalid_field(field: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

// ============================================================================
// Schedule format
// ============================================================================

/// Timer/schedule layout used by the hub.
///
/// Integer codes on the wire are 0, 1, 2 and 4; code 3 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleFormat {
    /// Non programmable (time clocks cannot be non programmable)
    #[serde(rename = "NONPROGRAMMABLE")]
    NonProgrammable,
    /// Same schedule every day of the week
    #[serde(rename = "24HOURSFIXED")]
    Fixed24Hours,
    /// Weekdays and weekend
    #[serde(rename = "5DAY/2DAY")]
    FiveTwoDay,
    /// Every day different
    #[serde(rename = "7DAY")]
    SevenDay,
}

impl ScheduleFormat {
    pub const ALL: [ScheduleFormat; 4] = [
        ScheduleFormat::NonProgrammable,
        ScheduleFormat::Fixed24Hours,
        ScheduleFormat::FiveTwoDay,
        ScheduleFormat::SevenDay,
    ];

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            ScheduleFormat::NonProgrammable => 0,
            ScheduleFormat::Fixed24Hours => 1,
            ScheduleFormat::FiveTwoDay => 2,
            ScheduleFormat::SevenDay => 4,
        }
    }

    /// Decode the integer code reported by `GET_SYSTEM`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolDataError::UnrecognizedScheduleFormat`] for any code
    /// outside {0, 1, 2, 4}.
    pub fn from_code(code: i64) -> Result<Self, ProtocolDataError> {
        match code {
            0 => Ok(ScheduleFormat::NonProgrammable),
            1 => Ok(ScheduleFormat::Fixed24Hours),
            2 => Ok(ScheduleFormat::FiveTwoDay),
            4 => Ok(ScheduleFormat::SevenDay),
            other => Err(ProtocolDataError::UnrecognizedScheduleFormat(other)),
        }
    }

    /// Label the hub expects in `SET_FORMAT`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ScheduleFormat::NonProgrammable => "NONPROGRAMMABLE",
            ScheduleFormat::Fixed24Hours => "24HOURSFIXED",
            ScheduleFormat::FiveTwoDay => "5DAY/2DAY",
            ScheduleFormat::SevenDay => "7DAY",
        }
    }
}

impl fmt::Display for ScheduleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScheduleFormat {
    type Err = UsageError;

    /// Accepts wire labels, variant-style names and integer codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "NONPROGRAMMABLE" | "NON_PROGRAMMABLE" | "0" => Ok(ScheduleFormat::NonProgrammable),
            "24HOURSFIXED" | "FIXED_24H" | "FIXED24H" | "1" => Ok(ScheduleFormat::Fixed24Hours),
            "5DAY/2DAY" | "FIVE_TWO_DAY" | "5_2" | "2" => Ok(ScheduleFormat::FiveTwoDay),
            "7DAY" | "SEVEN_DAY" | "4" => Ok(ScheduleFormat::SevenDay),
            _ => Err(UsageError::InvalidScheduleFormat(s.to_string())),
        }
    }
}

// ============================================================================
// Weekday
// ============================================================================

/// Day of week reported in a zone's `DATE` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = ProtocolDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" => Ok(Weekday::Monday),
            "tuesday" => Ok(Weekday::Tuesday),
            "wednesday" => Ok(Weekday::Wednesday),
            "thursday" => Ok(Weekday::Thursday),
            "friday" => Ok(Weekday::Friday),
            "saturday" => Ok(Weekday::Saturday),
            "sunday" => Ok(Weekday::Sunday),
            _ => Err(ProtocolDataError::InvalidWeekday(s.to_string())),
        }
    }
}

// ============================================================================
// Temperature unit
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }

    /// Decode the hub's `CORF` field.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolDataError::InvalidTemperatureUnit`] for anything but
    /// `"C"` or `"F"`.
    pub fn from_wire(value: &str) -> Result<Self, ProtocolDataError> {
        match value.trim() {
            "C" => Ok(TemperatureUnit::Celsius),
            "F" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(ProtocolDataError::InvalidTemperatureUnit(other.to_string())),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(UsageError::InvalidTemperatureUnit(s.to_string())),
        }
    }
}

// ============================================================================
// DST region
// ============================================================================

/// Region whose rules the hub uses for automatic daylight saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DstRegion {
    #[serde(rename = "UK")]
    Uk,
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "NZ")]
    Nz,
}

impl DstRegion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DstRegion::Uk => "UK",
            DstRegion::Eu => "EU",
            DstRegion::Nz => "NZ",
        }
    }
}

impl fmt::Display for DstRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DstRegion {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UK" => Ok(DstRegion::Uk),
            "EU" => Ok(DstRegion::Eu),
            "NZ" => Ok(DstRegion::Nz),
            _ => Err(UsageError::InvalidDstRegion(s.to_string())),
        }
    }
}

// ============================================================================
// Validated arguments
// ============================================================================

/// Four digit thermostat lock code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin(u16);

impl Pin {
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidPin`] unless `value` is in `0..=9999`.
    pub fn new(value: i64) -> Result<Self, UsageError> {
        u16::try_from(value)
            .ok()
            .filter(|v| *v <= 9999)
            .map(Pin)
            .ok_or(UsageError::InvalidPin(value))
    }

    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Digits, most significant first, zero padded to four places.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // rest % 10 is a single digit
    pub fn digits(self) -> [u8; 4] {
        let mut digits = [0u8; 4];
        let mut rest = self.0;
        for slot in digits.iter_mut().rev() {
            *slot = (rest % 10) as u8;
            rest /= 10;
        }
        digits
    }
}

/// ZigBee channel accepted by `SET_CHANNEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ZigbeeChannel(u8);

impl ZigbeeChannel {
    pub const ALLOWED: [u8; 7] = [11, 14, 15, 19, 20, 24, 25];

    /// # Errors
    ///
    /// Returns [`UsageError::InvalidChannel`] for channels outside [`Self::ALLOWED`].
    pub fn new(channel: i64) -> Result<Self, UsageError> {
        u8::try_from(channel)
            .ok()
            .filter(|c| Self::ALLOWED.contains(c))
            .map(ZigbeeChannel)
            .ok_or(UsageError::InvalidChannel(channel))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}
