//! Typed facade over the hub's command set.
//!
//! Every operation maps to one verb. Operations with a known success reply
//! return `Ok(true)` when the hub answers with exactly that reply and
//! `Ok(false)` otherwise, including when the hub cannot be reached. Caller
//! mistakes are reported as [`Error::Usage`] before anything is sent.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use neohub_rpc::{HubAddress, Message, Reply, RequestEngine, RequestOptions};
use neohub_types::{
    DstRegion, Pin, ProtocolDataError, ScheduleFormat, TemperatureUnit, UsageError, ZigbeeChannel,
};
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tracing::warn;

use crate::config::HubConfig;
use crate::error::{Error, Result};
use crate::holiday::HolidayWindow;
use crate::live_data::LiveData;
use crate::system::SystemInfo;
use crate::zone::{ZoneControl, ZoneRef, zone_name, zone_names};

/// First firmware that understands `RESET`.
pub const RESET_MIN_FIRMWARE: i64 = 2027;

/// First firmware that accepts half-degree set points.
pub const HALF_DEGREE_MIN_FIRMWARE: i64 = 2135;

/// Layout of `HOLIDAY` start and end arguments.
const HOLIDAY_ARG_FORMAT: &str = "%H%M%S%d%m%Y";

/// Handle to one hub.
///
/// Cloning is cheap; clones share the memoized temperature step.
#[derive(Debug, Clone)]
pub struct NeoHub {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    engine: RequestEngine,
    temperature_step: OnceCell<f64>,
}

impl NeoHub {
    #[must_use]
    pub fn new(address: HubAddress, options: RequestOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                engine: RequestEngine::new(address, options),
                temperature_step: OnceCell::new(),
            }),
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::Config`] if the config holds invalid request options.
    pub fn from_config(config: &HubConfig) -> Result<Self> {
        Ok(Self::new(config.address(), config.options()?))
    }

    #[must_use]
    pub fn engine(&self) -> &RequestEngine {
        &self.inner.engine
    }

    async fn request(&self, message: Message) -> Result<Reply> {
        Ok(self.inner.engine.request(&message).await?)
    }

    async fn command(&self, message: Message, expected: Value) -> bool {
        self.inner.engine.command(&message, &expected).await
    }

    async fn command_result(&self, message: Message, result: &str) -> bool {
        self.command(message, json!({ "result": result })).await
    }

    // ------------------------------------------------------------------
    // Hub
    // ------------------------------------------------------------------

    /// Firmware version number.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the version is not an integer.
    pub async fn firmware(&self) -> Result<i64> {
        let reply = self.request(Message::bare("FIRMWARE")).await?;
        let version = match reply.get("firmware version") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        version.ok_or_else(|| {
            ProtocolDataError::invalid_field(
                "firmware version",
                format!("expected an integer in {}", Value::Object(reply)),
            )
            .into()
        })
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the reply does not decode.
    pub async fn get_system(&self) -> Result<SystemInfo> {
        let reply = self.request(Message::bare("GET_SYSTEM")).await?;
        Ok(SystemInfo::from_reply(&reply)?)
    }

    /// Set point granularity: 0.5 on firmware 2135 and later, else 1.0.
    ///
    /// Only the first successful lookup talks to the hub; failures are not
    /// cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the firmware lookup fails.
    pub async fn target_temperature_step(&self) -> Result<f64> {
        self.inner
            .temperature_step
            .get_or_try_init(|| async {
                let firmware = self.firmware().await?;
                Ok::<_, Error>(if firmware >= HALF_DEGREE_MIN_FIRMWARE {
                    0.5
                } else {
                    1.0
                })
            })
            .await
            .copied()
    }

    /// Restart the hub. Firmware before 2027 cannot, and nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the firmware lookup fails.
    pub async fn reset(&self) -> Result<bool> {
        let firmware = self.firmware().await?;
        if firmware < RESET_MIN_FIRMWARE {
            warn!("Firmware {firmware} does not support RESET (needs {RESET_MIN_FIRMWARE})");
            return Ok(false);
        }
        Ok(self
            .command(Message::bare("RESET"), json!({ "Restarting": 1 }))
            .await)
    }

    /// Change the ZigBee channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] for channels other than 11, 14, 15, 19, 20, 24, 25.
    pub async fn set_channel(&self, channel: i64) -> Result<bool> {
        let channel = ZigbeeChannel::new(channel)?;
        Ok(self
            .command_result(
                Message::new("SET_CHANNEL", channel.get()),
                "Trying to change channel",
            )
            .await)
    }

    pub async fn set_temp_format(&self, unit: TemperatureUnit) -> bool {
        let expected = format!("Temperature format set to {unit}");
        self.command_result(Message::new("SET_TEMP_FORMAT", unit.as_str()), &expected)
            .await
    }

    pub async fn set_format(&self, format: ScheduleFormat) -> bool {
        self.command_result(Message::new("SET_FORMAT", format.label()), "Format was set")
            .await
    }

    /// Away mode puts thermostats into frost protection and switches time
    /// clocks off.
    pub async fn set_away(&self, state: bool) -> bool {
        let (verb, result) = if state {
            ("AWAY_ON", "away on")
        } else {
            ("AWAY_OFF", "away off")
        };
        self.command_result(Message::bare(verb), result).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn set_holiday(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Reply> {
        let start = start.format(HOLIDAY_ARG_FORMAT).to_string();
        let end = end.format(HOLIDAY_ARG_FORMAT).to_string();
        self.request(Message::new("HOLIDAY", json!([start, end])))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the reply does not decode.
    pub async fn get_holiday(&self) -> Result<HolidayWindow> {
        let reply = self.request(Message::bare("GET_HOLIDAY")).await?;
        Ok(HolidayWindow::from_reply(&reply)?)
    }

    pub async fn cancel_holiday(&self) -> bool {
        self.command_result(Message::bare("CANCEL_HOLIDAY"), "holiday cancelled")
            .await
    }

    /// Zone names and their ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or an id is not an integer.
    pub async fn get_zones(&self) -> Result<BTreeMap<String, i64>> {
        let reply = self.request(Message::bare("GET_ZONES")).await?;
        integer_map(reply)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_devices(&self) -> Result<Reply> {
        self.request(Message::bare("GET_DEVICES")).await
    }

    /// Devices in `zone`, or `None` when the hub reports an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply has no list for
    /// the zone.
    pub async fn get_device_list(&self, zone: &str) -> Result<Option<Vec<Value>>> {
        let mut reply = self
            .request(Message::new("GET_DEVICE_LIST", zone))
            .await?;
        if reply.contains_key("error") {
            return Ok(None);
        }
        match reply.remove(zone) {
            Some(Value::Array(devices)) => Ok(Some(devices)),
            _ => Err(ProtocolDataError::invalid_field(zone, "no device list in reply").into()),
        }
    }

    /// Serial numbers of attached devices.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn devices_sn(&self) -> Result<Reply> {
        self.request(Message::bare("DEVICES_SN")).await
    }

    pub async fn set_ntp(&self, state: bool) -> bool {
        let (verb, result) = if state {
            ("NTP_ON", "ntp client started")
        } else {
            ("NTP_OFF", "ntp client stopped")
        };
        self.command_result(Message::bare(verb), result).await
    }

    /// Set the hub date, defaulting to today.
    pub async fn set_date(&self, date: Option<NaiveDate>) -> bool {
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let payload = json!([date.year(), date.month(), date.day()]);
        self.command_result(Message::new("SET_DATE", payload), "Date is set")
            .await
    }

    /// Set the hub clock to the minute, defaulting to now.
    pub async fn set_time(&self, time: Option<NaiveTime>) -> bool {
        let time = time.unwrap_or_else(|| Local::now().time());
        let payload = json!([time.hour(), time.minute()]);
        self.command_result(Message::new("SET_TIME", payload), "time set")
            .await
    }

    /// Set date then time. The time is only sent if the date was accepted.
    pub async fn set_datetime(&self, datetime: Option<NaiveDateTime>) -> bool {
        let datetime = datetime.unwrap_or_else(|| Local::now().naive_local());
        self.set_date(Some(datetime.date())).await && self.set_time(Some(datetime.time())).await
    }

    pub async fn manual_dst(&self, state: bool) -> bool {
        self.command_result(Message::new("MANUAL_DST", i32::from(state)), "Updated time")
            .await
    }

    /// Automatic daylight saving. Turning it on without a region sends 0 and
    /// leaves the hub's current region in place.
    pub async fn set_dst(&self, state: bool, region: Option<DstRegion>) -> bool {
        let payload = region.map_or(json!(0), |r| json!(r.as_str()));
        let (verb, result) = if state {
            ("DST_ON", "dst on")
        } else {
            ("DST_OFF", "dst off")
        };
        self.command_result(Message::new(verb, payload), result)
            .await
    }

    /// Flash the hub's LED.
    pub async fn identify(&self) -> bool {
        self.command_result(Message::bare("IDENTIFY"), "flashing led")
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or a device does not decode.
    pub async fn get_live_data(&self) -> Result<LiveData> {
        let reply = self.request(Message::bare("GET_LIVE_DATA")).await?;
        let control = ZoneControl::new(self.clone());
        Ok(LiveData::from_reply(reply, &control)?)
    }

    /// Open the network for a new device, which joins as zone `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] if `name` is blank.
    pub async fn permit_join(&self, name: &str, timeout_s: u32) -> Result<bool> {
        let name = zone_name(name)?;
        Ok(self
            .command_result(
                Message::new("PERMIT_JOIN", json!([timeout_s, name])),
                "network allows joining",
            )
            .await)
    }

    // ------------------------------------------------------------------
    // Zones
    // ------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`Error::Usage`] for a PIN outside `0..=9999` or a blank zone name.
    pub async fn set_lock<Z: ZoneRef>(&self, pin: i64, zones: &[Z]) -> Result<bool> {
        let digits = Pin::new(pin)?.digits();
        let names = zone_names(zones)?;
        Ok(self
            .command_result(Message::new("LOCK", json!([digits, names])), "locked")
            .await)
    }

    /// # Errors
    ///
    /// Returns [`Error::Usage`] for a blank zone name.
    pub async fn unlock<Z: ZoneRef>(&self, zones: &[Z]) -> Result<bool> {
        let names = zone_names(zones)?;
        Ok(self
            .command_result(Message::new("UNLOCK", names), "unlocked")
            .await)
    }

    /// # Errors
    ///
    /// Returns [`Error::Usage`] for a blank zone name.
    pub async fn set_frost<Z: ZoneRef>(&self, state: bool, zones: &[Z]) -> Result<bool> {
        let names = zone_names(zones)?;
        let (verb, result) = if state {
            ("FROST_ON", "frost on")
        } else {
            ("FROST_OFF", "frost off")
        };
        Ok(self.command_result(Message::new(verb, names), result).await)
    }

    /// # Errors
    ///
    /// Returns [`Error::Usage`] for a non-finite temperature or a blank zone name.
    pub async fn set_target_temperature<Z: ZoneRef>(
        &self,
        temperature: f64,
        zones: &[Z],
    ) -> Result<bool> {
        let temperature = temperature_value(temperature)?;
        let names = zone_names(zones)?;
        Ok(self
            .command_result(
                Message::new("SET_TEMP", json!([temperature, names])),
                "temperature was set",
            )
            .await)
    }

    /// # Errors
    ///
    /// Returns [`Error::Usage`] for a blank zone name.
    pub async fn set_diff<Z: ZoneRef>(&self, switching_differential: i64, zones: &[Z]) -> Result<bool> {
        let names = zone_names(zones)?;
        Ok(self
            .command_result(
                Message::new("SET_DIFF", json!([switching_differential, names])),
                "switching differential was set",
            )
            .await)
    }

    /// Minutes each zone needs to raise its temperature by one degree.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank zone name, a failed request, or a
    /// non-integer rate.
    pub async fn rate_of_change<Z: ZoneRef>(&self, zones: &[Z]) -> Result<BTreeMap<String, i64>> {
        let names = zone_names(zones)?;
        let reply = self.request(Message::new("VIEW_ROC", names)).await?;
        integer_map(reply)
    }

    /// # Errors
    ///
    /// Returns [`Error::Usage`] for a blank zone name.
    pub async fn set_timer<Z: ZoneRef>(&self, state: bool, zones: &[Z]) -> Result<bool> {
        let names = zone_names(zones)?;
        let (verb, result) = if state {
            ("TIMER_ON", "timers on")
        } else {
            ("TIMER_OFF", "timers off")
        };
        Ok(self.command_result(Message::new(verb, names), result).await)
    }

    /// Hold time clocks on or off for `minutes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] for a blank zone name.
    pub async fn set_timer_hold<Z: ZoneRef>(
        &self,
        state: bool,
        minutes: u32,
        zones: &[Z],
    ) -> Result<bool> {
        let names = zone_names(zones)?;
        let (verb, result) = if state {
            ("TIMER_HOLD_ON", "timer hold on")
        } else {
            ("TIMER_HOLD_OFF", "timer hold off")
        };
        Ok(self
            .command_result(Message::new(verb, json!([minutes, names])), result)
            .await)
    }

    /// Flash a device's red LED.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] for a blank zone name.
    pub async fn identify_zone<Z: ZoneRef + ?Sized>(&self, zone: &Z) -> Result<bool> {
        let name = zone_name(zone)?;
        Ok(self
            .command_result(Message::new("IDENTIFY_DEV", name), "Device identifying")
            .await)
    }

    /// # Errors
    ///
    /// Returns [`Error::Usage`] if either name is blank.
    pub async fn rename_zone<Z: ZoneRef + ?Sized>(&self, zone: &Z, new_name: &str) -> Result<bool> {
        let old_name = zone_name(zone)?;
        let new_name = zone_name(new_name)?;
        Ok(self
            .command_result(
                Message::new("ZONE_TITLE", json!([old_name, new_name])),
                "zone renamed",
            )
            .await)
    }

    /// # Errors
    ///
    /// Returns [`Error::Usage`] for a blank zone name.
    pub async fn remove_zone<Z: ZoneRef + ?Sized>(&self, zone: &Z) -> Result<bool> {
        let name = zone_name(zone)?;
        Ok(self
            .command_result(Message::new("REMOVE_ZONE", name), "zone removed")
            .await)
    }
}

/// Whole temperatures go out as JSON integers, others as floats.
fn temperature_value(temperature: f64) -> std::result::Result<Value, UsageError> {
    if !temperature.is_finite() {
        return Err(UsageError::InvalidTemperature(temperature));
    }
    if temperature.fract() == 0.0 {
        #[allow(clippy::cast_possible_truncation)]
        let whole = temperature as i64;
        Ok(json!(whole))
    } else {
        Ok(json!(temperature))
    }
}

fn integer_map(reply: Reply) -> Result<BTreeMap<String, i64>> {
    reply
        .into_iter()
        .map(|(key, value)| match value.as_i64() {
            Some(n) => Ok((key, n)),
            None => {
                let reason = format!("expected an integer, got {value}");
                Err(Error::from(ProtocolDataError::invalid_field(key, reason)))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_value_whole_is_integer() {
        assert_eq!(temperature_value(21.0).unwrap(), json!(21));
        assert_eq!(temperature_value(-3.0).unwrap(), json!(-3));
    }

    #[test]
    fn test_temperature_value_fraction_is_float() {
        assert_eq!(temperature_value(21.5).unwrap(), json!(21.5));
    }

    #[test]
    fn test_temperature_value_rejects_non_finite() {
        assert!(matches!(
            temperature_value(f64::NAN),
            Err(UsageError::InvalidTemperature(_))
        ));
        assert!(temperature_value(f64::INFINITY).is_err());
    }

    #[test]
    fn test_integer_map() {
        let reply = json!({"Kitchen": 1, "Lounge": 2}).as_object().cloned().unwrap();
        let map = integer_map(reply).unwrap();
        assert_eq!(map.get("Kitchen"), Some(&1));
        assert_eq!(map.len(), 2);

        let bad = json!({"Kitchen": "one"}).as_object().cloned().unwrap();
        assert!(matches!(integer_map(bad), Err(Error::Protocol(_))));
    }
}
