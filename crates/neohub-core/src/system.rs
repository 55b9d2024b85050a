//! Decoded `GET_SYSTEM` reply.

use chrono::{DateTime, Utc};
use neohub_rpc::Reply;
use neohub_types::{ProtocolDataError, ScheduleFormat, TemperatureUnit};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode::Scalar;

/// Hub-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    pub dst_auto: bool,
    pub dst_on: bool,
    pub timer_format: ScheduleFormat,
    /// Format time clocks keep while the hub is set to non programmable
    pub alt_timer_format: ScheduleFormat,
    pub ntp_enabled: bool,
    pub hub_type: i64,
    pub hub_version: i64,
    pub temperature_unit: TemperatureUnit,
    /// Offset from UTC in hours
    pub timezone: f64,
    pub utc_time: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RawSystem {
    dst_auto: bool,
    dst_on: bool,
    format: i64,
    alt_timer_format: i64,
    ntp_on: Scalar,
    hub_type: i64,
    hub_version: i64,
    corf: String,
    time_zone: Scalar,
    utc: i64,
}

impl SystemInfo {
    /// Decode a `GET_SYSTEM` reply.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolDataError`] if a field is missing, has the wrong
    /// type, or holds a value outside its domain.
    pub fn from_reply(reply: &Reply) -> Result<Self, ProtocolDataError> {
        let raw = RawSystem::deserialize(Value::Object(reply.clone()))
            .map_err(|e| ProtocolDataError::invalid_field("GET_SYSTEM", e))?;

        let ntp_enabled = match raw.ntp_on {
            Scalar::Text(state) => state == "Running",
            Scalar::Bool(on) => on,
            other => {
                return Err(ProtocolDataError::invalid_field(
                    "NTP_ON",
                    format!("unexpected value {other:?}"),
                ));
            }
        };

        let utc_time = DateTime::from_timestamp(raw.utc, 0).ok_or_else(|| {
            ProtocolDataError::InvalidTimestamp {
                field: "UTC",
                value: raw.utc.to_string(),
            }
        })?;

        Ok(Self {
            dst_auto: raw.dst_auto,
            dst_on: raw.dst_on,
            timer_format: ScheduleFormat::from_code(raw.format)?,
            alt_timer_format: ScheduleFormat::from_code(raw.alt_timer_format)?,
            ntp_enabled,
            hub_type: raw.hub_type,
            hub_version: raw.hub_version,
            temperature_unit: TemperatureUnit::from_wire(&raw.corf)?,
            timezone: raw.time_zone.to_f64("TIME_ZONE")?,
            utc_time,
        })
    }
}
