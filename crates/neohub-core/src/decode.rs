//! Field-level coercions shared by the hub record decoders.
//!
//! The hub is loose about scalar types: temperatures arrive as numbers or
//! numeric strings, flags as booleans, integers or strings. [`Scalar`]
//! accepts all of them so each decoder can coerce with a field-named error.

use std::time::Duration;

use chrono::{NaiveTime, Timelike};
use neohub_types::ProtocolDataError;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub(crate) fn to_f64(&self, field: &str) -> Result<f64, ProtocolDataError> {
        match self {
            // Hub integers are small; f64 is exact for them
            #[allow(clippy::cast_precision_loss)]
            Scalar::Int(i) => Ok(*i as f64),
            Scalar::Float(f) => Ok(*f),
            Scalar::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ProtocolDataError::invalid_field(field, format!("'{s}' is not a number"))),
            Scalar::Bool(b) => Err(ProtocolDataError::invalid_field(
                field,
                format!("expected a number, got {b}"),
            )),
        }
    }

    pub(crate) fn to_i64(&self, field: &str) -> Result<i64, ProtocolDataError> {
        match self {
            Scalar::Bool(b) => Ok(i64::from(*b)),
            Scalar::Int(i) => Ok(*i),
            Scalar::Text(s) if s.trim().is_empty() => Ok(0),
            Scalar::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ProtocolDataError::invalid_field(field, format!("'{s}' is not an integer"))),
            Scalar::Float(f) => Err(ProtocolDataError::invalid_field(
                field,
                format!("expected an integer, got {f}"),
            )),
        }
    }
}

pub(crate) fn opt_f64(value: Option<&Scalar>, field: &str) -> Result<Option<f64>, ProtocolDataError> {
    value.map(|v| v.to_f64(field)).transpose()
}

/// Parse an "HH:MM" hold period. Both parts may go up to 99.
pub(crate) fn parse_hold_time(field: &'static str, value: &str) -> Result<Duration, ProtocolDataError> {
    let invalid = || ProtocolDataError::InvalidDuration {
        field,
        value: value.to_string(),
    };

    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    let hours: u64 = hours.parse().map_err(|_| invalid())?;
    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    if hours > 99 || minutes > 99 {
        return Err(invalid());
    }

    Ok(Duration::from_secs((hours * 60 + minutes) * 60))
}

/// Parse a strict "%H:%M" clock reading into time since midnight.
pub(crate) fn parse_clock(field: &'static str, value: &str) -> Result<Duration, ProtocolDataError> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        ProtocolDataError::InvalidDuration {
            field,
            value: value.to_string(),
        }
    })?;
    Ok(Duration::from_secs(u64::from(time.num_seconds_from_midnight())))
}

/// Render a duration the way the hub writes it: "HH:MM".
pub(crate) fn format_hh_mm(duration: Duration) -> String {
    let minutes = duration.as_secs() / 60;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub(crate) fn serialize_hh_mm<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_hh_mm(*duration))
}

/// Read an optional field, treating an explicit `null` like an absent one.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
