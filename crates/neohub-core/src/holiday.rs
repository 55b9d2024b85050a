use chrono::NaiveDateTime;
use neohub_rpc::Reply;
use neohub_types::ProtocolDataError;
use serde::Serialize;
use serde_json::Value;

/// Layout of the `start`/`end` strings in `GET_HOLIDAY`, e.g. "Fri Jul  3 12:00:00 2020".
const HOLIDAY_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Scheduled holiday period, as reported by `GET_HOLIDAY`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolidayWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// Devices with the holiday set up, passed through untouched
    pub ids: Vec<Value>,
}

impl HolidayWindow {
    /// Decode a `GET_HOLIDAY` reply. Empty or null times mean no holiday.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolDataError::InvalidTimestamp`] if a time is present
    /// but not in the hub's layout.
    pub fn from_reply(reply: &Reply) -> Result<Self, ProtocolDataError> {
        let ids = match reply.get("ids") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(ids)) => ids.clone(),
            Some(other) => vec![other.clone()],
        };

        Ok(Self {
            start: parse_holiday_time("start", reply.get("start"))?,
            end: parse_holiday_time("end", reply.get("end"))?,
            ids,
        })
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

fn parse_holiday_time(
    field: &'static str,
    value: Option<&Value>,
) -> Result<Option<NaiveDateTime>, ProtocolDataError> {
    let invalid = |value: String| ProtocolDataError::InvalidTimestamp { field, value };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            // Day of month is space padded; collapse runs of whitespace
            let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if normalized.is_empty() {
                return Ok(None);
            }
            NaiveDateTime::parse_from_str(&normalized, HOLIDAY_TIME_FORMAT)
                .map(Some)
                .map_err(|_| invalid(text.clone()))
        }
        Some(other) => Err(invalid(other.to_string())),
    }
}
