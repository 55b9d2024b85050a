//! Zones: the per-device snapshot from `GET_LIVE_DATA` and the ways callers
//! name a zone when sending zone-scoped commands.

use std::time::Duration;

use neohub_types::{ProtocolDataError, UsageError, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::decode::{self, Scalar, opt_f64};
use crate::error::Result;
use crate::neohub::NeoHub;

/// Anything that names a zone.
///
/// Zone-scoped commands address zones by name, so a plain string, a
/// [`ZoneName`] and a decoded [`ZoneSnapshot`] are interchangeable.
pub trait ZoneRef {
    fn zone_name(&self) -> &str;
}

impl ZoneRef for str {
    fn zone_name(&self) -> &str {
        self
    }
}

impl ZoneRef for String {
    fn zone_name(&self) -> &str {
        self
    }
}

impl<T: ZoneRef + ?Sized> ZoneRef for &T {
    fn zone_name(&self) -> &str {
        (**self).zone_name()
    }
}

/// A bare zone name with no live data attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneName(pub String);

impl ZoneRef for ZoneName {
    fn zone_name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneName {
    fn from(name: &str) -> Self {
        ZoneName(name.to_string())
    }
}

/// Resolve zone references to wire names.
///
/// An empty list is allowed; a blank name is not.
pub(crate) fn zone_names<Z: ZoneRef>(zones: &[Z]) -> std::result::Result<Vec<String>, UsageError> {
    zones.iter().map(zone_name).collect()
}

pub(crate) fn zone_name<Z: ZoneRef + ?Sized>(zone: &Z) -> std::result::Result<String, UsageError> {
    let name = zone.zone_name();
    if name.trim().is_empty() {
        return Err(UsageError::MissingZoneName);
    }
    Ok(name.to_string())
}

/// Zone-scoped command access for snapshots.
///
/// Holds the hub a snapshot was read from but only exposes commands that
/// target a single zone; hub-wide operations are not reachable through it.
#[derive(Debug, Clone)]
pub struct ZoneControl {
    hub: NeoHub,
}

impl ZoneControl {
    #[must_use]
    pub fn new(hub: NeoHub) -> Self {
        Self { hub }
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn identify<Z: ZoneRef + ?Sized>(&self, zone: &Z) -> Result<bool> {
        self.hub.identify_zone(zone).await
    }

    /// # Errors
    ///
    /// Returns a usage error if either name is blank.
    pub async fn rename<Z: ZoneRef + ?Sized>(&self, zone: &Z, new_name: &str) -> Result<bool> {
        self.hub.rename_zone(zone, new_name).await
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn remove<Z: ZoneRef + ?Sized>(&self, zone: &Z) -> Result<bool> {
        self.hub.remove_zone(zone).await
    }

    /// # Errors
    ///
    /// Returns a usage error if `pin` is outside `0..=9999`.
    pub async fn set_lock<Z: ZoneRef>(&self, zone: Z, pin: i64) -> Result<bool> {
        self.hub.set_lock(pin, &[zone]).await
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn unlock<Z: ZoneRef>(&self, zone: Z) -> Result<bool> {
        self.hub.unlock(&[zone]).await
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn set_frost<Z: ZoneRef>(&self, zone: Z, state: bool) -> Result<bool> {
        self.hub.set_frost(state, &[zone]).await
    }

    /// # Errors
    ///
    /// Returns a usage error if `temperature` is not finite.
    pub async fn set_target_temperature<Z: ZoneRef>(
        &self,
        zone: Z,
        temperature: f64,
    ) -> Result<bool> {
        self.hub.set_target_temperature(temperature, &[zone]).await
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn set_diff<Z: ZoneRef>(
        &self,
        zone: Z,
        switching_differential: i64,
    ) -> Result<bool> {
        self.hub.set_diff(switching_differential, &[zone]).await
    }

    /// Minutes to raise the zone's temperature by one degree.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply has no entry for
    /// the zone.
    pub async fn rate_of_change<Z: ZoneRef>(&self, zone: Z) -> Result<i64> {
        let name = zone_name(&zone)?;
        let mut rates = self.hub.rate_of_change(&[zone]).await?;
        rates.remove(&name).ok_or_else(|| {
            ProtocolDataError::invalid_field(name, "missing from VIEW_ROC reply").into()
        })
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn set_timer<Z: ZoneRef>(&self, zone: Z, state: bool) -> Result<bool> {
        self.hub.set_timer(state, &[zone]).await
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn set_timer_hold<Z: ZoneRef>(
        &self,
        zone: Z,
        state: bool,
        minutes: u32,
    ) -> Result<bool> {
        self.hub.set_timer_hold(state, minutes, &[zone]).await
    }
}

/// One device from `GET_LIVE_DATA`.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneSnapshot {
    pub name: String,
    pub target_temperature: Option<f64>,
    pub temperature: Option<f64>,

    pub active_level: Option<i64>,
    pub active_profile: Option<i64>,
    pub available_modes: Vec<String>,
    pub away: bool,
    pub cool_mode: bool,
    pub cool_on: bool,
    pub cool_temp: Option<f64>,
    pub current_floor_temperature: Option<f64>,
    pub device_id: Option<i64>,
    pub fan_control: Option<String>,
    pub fan_speed: Option<String>,
    pub floor_limit: bool,
    pub hc_mode: Option<String>,
    pub heat_mode: bool,
    pub heat_on: bool,
    pub hold_cool: Option<f64>,
    pub hold_off: bool,
    pub hold_on: bool,
    pub hold_temp: Option<f64>,
    #[serde(serialize_with = "decode::serialize_hh_mm")]
    pub hold_time: Duration,
    pub holiday: bool,
    pub lock: bool,
    pub low_battery: bool,
    pub manual_off: bool,
    pub modelock: bool,
    pub modulation_level: Option<i64>,
    pub offline: bool,
    pub pin_number: i64,
    pub preheat_active: i64,
    pub prg_temp: Option<f64>,
    pub prg_timer: bool,
    pub relative_humidity: Option<i64>,
    pub standby: bool,
    #[serde(serialize_with = "decode::serialize_hh_mm")]
    pub switch_delay_left: Duration,
    pub temporary_set_flag: bool,
    /// Device clock, as time since midnight
    #[serde(serialize_with = "decode::serialize_hh_mm")]
    pub time: Duration,
    pub timer_on: bool,
    pub weekday: Option<Weekday>,
    pub window_open: bool,
    pub write_count: Option<i64>,

    pub thermostat: bool,
    pub timeclock: bool,

    #[serde(skip)]
    hub: ZoneControl,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
struct RawZone {
    zone_name: Option<String>,
    set_temp: Option<Scalar>,
    actual_temp: Option<Scalar>,

    active_level: Option<i64>,
    active_profile: Option<i64>,
    #[serde(deserialize_with = "decode::null_as_default")]
    available_modes: Vec<String>,
    #[serde(deserialize_with = "decode::null_as_default")]
    away: bool,
    #[serde(deserialize_with = "decode::null_as_default")]
    cool_mode: bool,
    #[serde(deserialize_with = "decode::null_as_default")]
    cool_on: bool,
    cool_temp: Option<Scalar>,
    current_floor_temperature: Option<Scalar>,
    date: Option<String>,
    device_id: Option<i64>,
    fan_control: Option<String>,
    fan_speed: Option<String>,
    #[serde(deserialize_with = "decode::null_as_default")]
    floor_limit: bool,
    hc_mode: Option<String>,
    #[serde(deserialize_with = "decode::null_as_default")]
    heat_mode: bool,
    #[serde(deserialize_with = "decode::null_as_default")]
    heat_on: bool,
    hold_cool: Option<Scalar>,
    #[serde(deserialize_with = "decode::null_as_default")]
    hold_off: bool,
    #[serde(deserialize_with = "decode::null_as_default")]
    hold_on: bool,
    hold_temp: Option<Scalar>,
    hold_time: Option<String>,
    #[serde(deserialize_with = "decode::null_as_default")]
    holiday: bool,
    #[serde(deserialize_with = "decode::null_as_default")]
    lock: bool,
    #[serde(deserialize_with = "decode::null_as_default")]
    low_battery: bool,
    #[serde(deserialize_with = "decode::null_as_default")]
    manual_off: bool,
    #[serde(deserialize_with = "decode::null_as_default")]
    modelock: bool,
    modulation_level: Option<i64>,
    #[serde(deserialize_with = "decode::null_as_default")]
    offline: bool,
    pin_number: Option<Scalar>,
    preheat_active: Option<Scalar>,
    prg_temp: Option<Scalar>,
    #[serde(deserialize_with = "decode::null_as_default")]
    prg_timer: bool,
    relative_humidity: Option<i64>,
    #[serde(deserialize_with = "decode::null_as_default")]
    standby: bool,
    switch_delay_left: Option<String>,
    #[serde(deserialize_with = "decode::null_as_default")]
    temporary_set_flag: bool,
    time: Option<String>,
    #[serde(deserialize_with = "decode::null_as_default")]
    timer_on: bool,
    #[serde(deserialize_with = "decode::null_as_default")]
    window_open: bool,
    write_count: Option<i64>,

    thermostat: Option<bool>,
    timeclock: Option<bool>,
}

impl ZoneSnapshot {
    /// Decode one entry of the live-data `devices` list.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolDataError`] if `ZONE_NAME` is missing or a field
    /// cannot be coerced to its type.
    pub fn from_record(
        record: &Map<String, Value>,
        hub: ZoneControl,
    ) -> std::result::Result<Self, ProtocolDataError> {
        let raw = RawZone::deserialize(Value::Object(record.clone()))
            .map_err(|e| ProtocolDataError::invalid_field("device", e))?;

        let name = raw
            .zone_name
            .ok_or_else(|| ProtocolDataError::invalid_field("ZONE_NAME", "missing"))?;

        let hold_time = raw
            .hold_time
            .as_deref()
            .map(|v| decode::parse_hold_time("HOLD_TIME", v))
            .transpose()?
            .unwrap_or_default();
        let switch_delay_left = raw
            .switch_delay_left
            .as_deref()
            .map(|v| decode::parse_clock("SWITCH_DELAY_LEFT", v))
            .transpose()?
            .unwrap_or_default();
        let time = raw
            .time
            .as_deref()
            .map(|v| decode::parse_clock("TIME", v))
            .transpose()?
            .unwrap_or_default();
        let weekday = raw.date.as_deref().map(str::parse::<Weekday>).transpose()?;

        Ok(Self {
            name,
            target_temperature: opt_f64(raw.set_temp.as_ref(), "SET_TEMP")?,
            temperature: opt_f64(raw.actual_temp.as_ref(), "ACTUAL_TEMP")?,
            active_level: raw.active_level,
            active_profile: raw.active_profile,
            available_modes: raw.available_modes,
            away: raw.away,
            cool_mode: raw.cool_mode,
            cool_on: raw.cool_on,
            cool_temp: opt_f64(raw.cool_temp.as_ref(), "COOL_TEMP")?,
            current_floor_temperature: opt_f64(
                raw.current_floor_temperature.as_ref(),
                "CURRENT_FLOOR_TEMPERATURE",
            )?,
            device_id: raw.device_id,
            fan_control: raw.fan_control,
            fan_speed: raw.fan_speed,
            floor_limit: raw.floor_limit,
            hc_mode: raw.hc_mode,
            heat_mode: raw.heat_mode,
            heat_on: raw.heat_on,
            hold_cool: opt_f64(raw.hold_cool.as_ref(), "HOLD_COOL")?,
            hold_off: raw.hold_off,
            hold_on: raw.hold_on,
            hold_temp: opt_f64(raw.hold_temp.as_ref(), "HOLD_TEMP")?,
            hold_time,
            holiday: raw.holiday,
            lock: raw.lock,
            low_battery: raw.low_battery,
            manual_off: raw.manual_off,
            modelock: raw.modelock,
            modulation_level: raw.modulation_level,
            offline: raw.offline,
            pin_number: raw
                .pin_number
                .map(|v| v.to_i64("PIN_NUMBER"))
                .transpose()?
                .unwrap_or_default(),
            preheat_active: raw
                .preheat_active
                .map(|v| v.to_i64("PREHEAT_ACTIVE"))
                .transpose()?
                .unwrap_or_default(),
            prg_temp: opt_f64(raw.prg_temp.as_ref(), "PRG_TEMP")?,
            prg_timer: raw.prg_timer,
            relative_humidity: raw.relative_humidity,
            standby: raw.standby,
            switch_delay_left,
            temporary_set_flag: raw.temporary_set_flag,
            time,
            timer_on: raw.timer_on,
            weekday,
            window_open: raw.window_open,
            write_count: raw.write_count,
            thermostat: raw.thermostat.unwrap_or(false),
            timeclock: raw.timeclock.unwrap_or(false),
            hub,
        })
    }

    /// Flash the device's red LED.
    ///
    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn identify(&self) -> Result<bool> {
        self.hub.identify(self).await
    }

    /// Rename the zone, updating this snapshot when the hub confirms.
    ///
    /// # Errors
    ///
    /// Returns a usage error if either name is blank.
    pub async fn rename(&mut self, new_name: &str) -> Result<bool> {
        let renamed = self.hub.rename(&*self, new_name).await?;
        if renamed {
            self.name = new_name.to_string();
        }
        Ok(renamed)
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn remove(&self) -> Result<bool> {
        self.hub.remove(self).await
    }

    /// # Errors
    ///
    /// Returns a usage error if `pin` is outside `0..=9999`.
    pub async fn set_lock(&self, pin: i64) -> Result<bool> {
        self.hub.set_lock(self, pin).await
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn unlock(&self) -> Result<bool> {
        self.hub.unlock(self).await
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn set_frost(&self, state: bool) -> Result<bool> {
        self.hub.set_frost(self, state).await
    }

    /// # Errors
    ///
    /// Returns a usage error if `temperature` is not finite.
    pub async fn set_target_temperature(&self, temperature: f64) -> Result<bool> {
        self.hub.set_target_temperature(self, temperature).await
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn set_diff(&self, switching_differential: i64) -> Result<bool> {
        self.hub.set_diff(self, switching_differential).await
    }

    /// Minutes to raise the temperature by one degree.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply has no entry for
    /// this zone.
    pub async fn rate_of_change(&self) -> Result<i64> {
        self.hub.rate_of_change(self).await
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn set_timer(&self, state: bool) -> Result<bool> {
        self.hub.set_timer(self, state).await
    }

    /// # Errors
    ///
    /// Returns a usage error if the zone name is blank.
    pub async fn set_timer_hold(&self, state: bool, minutes: u32) -> Result<bool> {
        self.hub.set_timer_hold(self, state, minutes).await
    }
}

impl ZoneRef for ZoneSnapshot {
    fn zone_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_names_accepts_mixed_refs() {
        let owned = String::from("Lounge");
        let named = ZoneName::from("Hall");
        let refs: [&dyn ZoneRef; 3] = [&"Kitchen", &owned, &named];
        let names: Vec<&str> = refs.iter().map(|z| z.zone_name()).collect();
        assert_eq!(names, vec!["Kitchen", "Lounge", "Hall"]);
    }

    #[test]
    fn test_zone_names_rejects_blank() {
        assert_eq!(
            zone_names(&["Kitchen", "  "]),
            Err(UsageError::MissingZoneName)
        );
    }

    #[test]
    fn test_zone_names_allows_empty_list() {
        let none: [&str; 0] = [];
        assert_eq!(zone_names(&none), Ok(Vec::new()));
    }
}
