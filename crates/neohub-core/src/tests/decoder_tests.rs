//! Tests for decoding hub replies into domain records

use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use neohub_types::{ProtocolDataError, ScheduleFormat, TemperatureUnit, Weekday};
use serde_json::json;

use super::fixtures::{
    holiday_json, live_data_json, offline_control, reply, system_json, thermostat_json,
    timeclock_json,
};
use crate::{HolidayWindow, LiveData, SystemInfo, ZoneSnapshot};

fn zone(value: serde_json::Value) -> Result<ZoneSnapshot, ProtocolDataError> {
    ZoneSnapshot::from_record(&reply(value), offline_control())
}

// ============================================================================
// System
// ============================================================================

#[test]
fn test_system_decodes() {
    let system = SystemInfo::from_reply(&reply(system_json())).unwrap();

    assert!(system.dst_auto);
    assert!(!system.dst_on);
    assert_eq!(system.timer_format, ScheduleFormat::FiveTwoDay);
    assert_eq!(system.alt_timer_format, ScheduleFormat::SevenDay);
    assert!(system.ntp_enabled);
    assert_eq!(system.hub_type, 2);
    assert_eq!(system.hub_version, 2134);
    assert_eq!(system.temperature_unit, TemperatureUnit::Celsius);
    assert_eq!(system.timezone, 1.0);
    assert_eq!(
        system.utc_time,
        Utc.timestamp_opt(1_600_000_000, 0).unwrap()
    );
}

#[test]
fn test_system_ntp_stopped() {
    let mut value = system_json();
    value["NTP_ON"] = json!("Stopped");
    let system = SystemInfo::from_reply(&reply(value)).unwrap();
    assert!(!system.ntp_enabled);
}

#[test]
fn test_system_rejects_reserved_format_code() {
    let mut value = system_json();
    value["FORMAT"] = json!(3);
    assert_eq!(
        SystemInfo::from_reply(&reply(value)),
        Err(ProtocolDataError::UnrecognizedScheduleFormat(3))
    );
}

#[test]
fn test_system_rejects_unknown_unit() {
    let mut value = system_json();
    value["CORF"] = json!("K");
    assert!(matches!(
        SystemInfo::from_reply(&reply(value)),
        Err(ProtocolDataError::InvalidTemperatureUnit(_))
    ));
}

#[test]
fn test_system_missing_field() {
    let mut value = system_json();
    value.as_object_mut().unwrap().remove("HUB_TYPE");
    assert!(matches!(
        SystemInfo::from_reply(&reply(value)),
        Err(ProtocolDataError::InvalidField { .. })
    ));
}

// ============================================================================
// Zones
// ============================================================================

#[test]
fn test_thermostat_decodes() {
    let kitchen = zone(thermostat_json("Kitchen")).unwrap();

    assert_eq!(kitchen.name, "Kitchen");
    assert_eq!(kitchen.target_temperature, Some(21.5));
    assert_eq!(kitchen.temperature, Some(20.4));
    assert_eq!(kitchen.hold_time, Duration::from_secs(90 * 60));
    assert_eq!(kitchen.switch_delay_left, Duration::ZERO);
    assert_eq!(kitchen.time, Duration::from_secs(13 * 3600 + 5 * 60));
    assert_eq!(kitchen.weekday, Some(Weekday::Wednesday));
    assert_eq!(kitchen.pin_number, 42);
    assert_eq!(kitchen.preheat_active, 0);
    assert_eq!(kitchen.current_floor_temperature, Some(127.0));
    assert_eq!(kitchen.available_modes, vec!["heat", "cool"]);
    assert_eq!(kitchen.write_count, Some(12));
    assert!(kitchen.heat_on);
    assert!(kitchen.thermostat);
    assert!(!kitchen.timeclock);
}

#[test]
fn test_timeclock_defaults_absent_fields() {
    let water = zone(timeclock_json("Hot Water")).unwrap();

    assert!(water.timeclock);
    assert!(!water.thermostat);
    assert!(water.timer_on);
    assert_eq!(water.pin_number, 0);
    assert_eq!(water.target_temperature, None);
    assert_eq!(water.temperature, None);
    assert_eq!(water.write_count, None);
    assert!(water.available_modes.is_empty());
}

#[test]
fn test_null_flags_read_as_false() {
    let mut value = thermostat_json("Kitchen");
    value["AWAY"] = json!(null);
    value["HEAT_ON"] = json!(null);
    value["AVAILABLE_MODES"] = json!(null);
    value["THERMOSTAT"] = json!(null);
    value["TIMECLOCK"] = json!(true);

    let kitchen = zone(value).unwrap();

    assert!(!kitchen.away);
    assert!(!kitchen.heat_on);
    assert!(!kitchen.thermostat);
    assert!(kitchen.timeclock);
    assert!(kitchen.available_modes.is_empty());
}

#[test]
fn test_live_data_survives_null_flag() {
    let mut value = live_data_json();
    value["devices"][0]["AWAY"] = json!(null);

    let live = LiveData::from_reply(reply(value), &offline_control()).unwrap();

    assert!(!live.thermostats[0].away);
}

#[test]
fn test_numeric_temperatures_accepted() {
    let mut value = thermostat_json("Kitchen");
    value["SET_TEMP"] = json!(19);
    value["ACTUAL_TEMP"] = json!(18.5);
    let kitchen = zone(value).unwrap();
    assert_eq!(kitchen.target_temperature, Some(19.0));
    assert_eq!(kitchen.temperature, Some(18.5));
}

#[test]
fn test_hold_time_up_to_99_99() {
    let mut value = thermostat_json("Kitchen");
    value["HOLD_TIME"] = json!("99:99");
    let kitchen = zone(value).unwrap();
    assert_eq!(kitchen.hold_time, Duration::from_secs((99 * 60 + 99) * 60));
}

#[test]
fn test_clock_fields_are_strict() {
    let mut value = thermostat_json("Kitchen");
    value["TIME"] = json!("24:10");
    assert!(matches!(
        zone(value),
        Err(ProtocolDataError::InvalidDuration { field: "TIME", .. })
    ));

    let mut value = thermostat_json("Kitchen");
    value["SWITCH_DELAY_LEFT"] = json!("soon");
    assert!(matches!(
        zone(value),
        Err(ProtocolDataError::InvalidDuration {
            field: "SWITCH_DELAY_LEFT",
            ..
        })
    ));
}

#[test]
fn test_invalid_weekday() {
    let mut value = thermostat_json("Kitchen");
    value["DATE"] = json!("Caturday");
    assert_eq!(
        zone(value).unwrap_err(),
        ProtocolDataError::InvalidWeekday("Caturday".to_string())
    );
}

#[test]
fn test_non_numeric_pin() {
    let mut value = thermostat_json("Kitchen");
    value["PIN_NUMBER"] = json!("12a4");
    assert!(matches!(
        zone(value),
        Err(ProtocolDataError::InvalidField { ref field, .. }) if field == "PIN_NUMBER"
    ));
}

#[test]
fn test_missing_zone_name() {
    let mut value = thermostat_json("Kitchen");
    value.as_object_mut().unwrap().remove("ZONE_NAME");
    assert!(matches!(
        zone(value),
        Err(ProtocolDataError::InvalidField { ref field, .. }) if field == "ZONE_NAME"
    ));
}

#[test]
fn test_zone_serializes_durations_as_hh_mm() {
    let kitchen = zone(thermostat_json("Kitchen")).unwrap();
    let value = serde_json::to_value(&kitchen).unwrap();
    assert_eq!(value["hold_time"], "01:30");
    assert_eq!(value["time"], "13:05");
    assert_eq!(value["weekday"], "wednesday");
    assert!(value.get("hub").is_none());
}

// ============================================================================
// Live data
// ============================================================================

#[test]
fn test_live_data_splits_devices() {
    let live = LiveData::from_reply(reply(live_data_json()), &offline_control()).unwrap();

    let thermostats: Vec<_> = live.thermostats.iter().map(|z| z.name.as_str()).collect();
    let timeclocks: Vec<_> = live.timeclocks.iter().map(|z| z.name.as_str()).collect();
    assert_eq!(thermostats, vec!["Kitchen", "Lounge"]);
    assert_eq!(timeclocks, vec!["Hot Water"]);

    // neither flag set
    assert!(live.zone("Repeater").is_none());
    assert!(live.zone("Hot Water").is_some());
    assert_eq!(live.zones().count(), 3);
}

#[test]
fn test_live_data_hub_fields_exclude_devices() {
    let live = LiveData::from_reply(reply(live_data_json()), &offline_control()).unwrap();
    assert!(!live.hub.contains_key("devices"));
    assert_eq!(live.hub.get("HUB_AWAY"), Some(&json!(false)));
}

#[test]
fn test_live_data_both_flags_is_thermostat() {
    let mut device = thermostat_json("Combo");
    device["TIMECLOCK"] = json!(true);
    let value = json!({ "HUB_AWAY": false, "devices": [device] });

    let live = LiveData::from_reply(reply(value), &offline_control()).unwrap();
    assert_eq!(live.thermostats.len(), 1);
    assert!(live.timeclocks.is_empty());
}

#[test]
fn test_live_data_requires_device_list() {
    let value = json!({ "HUB_AWAY": false });
    assert!(matches!(
        LiveData::from_reply(reply(value), &offline_control()),
        Err(ProtocolDataError::InvalidField { .. })
    ));
}

#[test]
fn test_live_data_bad_device_fails_whole_reply() {
    let mut broken = thermostat_json("Broken");
    broken["HOLD_TIME"] = json!("forever");
    let value = json!({ "devices": [thermostat_json("Kitchen"), broken] });
    assert!(LiveData::from_reply(reply(value), &offline_control()).is_err());
}

// ============================================================================
// Holiday
// ============================================================================

#[test]
fn test_holiday_decodes() {
    let window = HolidayWindow::from_reply(&reply(holiday_json())).unwrap();

    assert_eq!(
        window.start,
        NaiveDate::from_ymd_opt(2020, 7, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
    );
    assert_eq!(
        window.end,
        NaiveDate::from_ymd_opt(2020, 7, 12)
            .unwrap()
            .and_hms_opt(9, 30, 0)
    );
    assert_eq!(window.ids, vec![json!(1), json!(2)]);
    assert!(window.is_scheduled());
}

#[test]
fn test_holiday_empty_start_with_end() {
    let window =
        HolidayWindow::from_reply(&reply(json!({"start": "", "end": "Sun Jul 12 09:30:00 2020"})))
            .unwrap();
    assert_eq!(window.start, None);
    assert!(window.end.is_some());
}
