//! Test fixtures and helpers

use std::time::Duration;

use neohub_rpc::testing::{FakeHub, FakeReply};
use neohub_rpc::{HubAddress, Reply, RequestOptions};
use serde_json::{Value, json};

use crate::NeoHub;
use crate::zone::ZoneControl;

/// Short enough to keep failing tests quick, long enough for loopback.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(500);

pub fn hub_for(fake: &FakeHub) -> NeoHub {
    NeoHub::new(
        fake.address(),
        RequestOptions::default().with_timeout(TEST_TIMEOUT),
    )
}

/// A hub handle that is never contacted.
pub fn offline_control() -> ZoneControl {
    ZoneControl::new(NeoHub::new(
        HubAddress::new("127.0.0.1", 9),
        RequestOptions::default(),
    ))
}

pub fn reply(value: Value) -> Reply {
    value.as_object().cloned().expect("fixture must be an object")
}

/// The single verb of a recorded request.
pub fn verb(request: &Value) -> &str {
    request
        .as_object()
        .and_then(|obj| obj.keys().next())
        .map_or("", String::as_str)
}

/// Serve a fixed reply per verb; unknown verbs get an error object.
pub async fn fake_hub(routes: Vec<(&'static str, Value)>) -> FakeHub {
    FakeHub::start(move |request| {
        let verb = verb(request);
        routes
            .iter()
            .find(|(name, _)| *name == verb)
            .map_or_else(
                || FakeReply::json(json!({ "error": format!("unknown verb {verb}") })),
                |(_, value)| FakeReply::json(value.clone()),
            )
    })
    .await
    .expect("bind fake hub")
}

pub fn firmware_reply(version: i64) -> Value {
    json!({ "HUB_VERSION": 2, "firmware version": version.to_string() })
}

pub fn system_json() -> Value {
    json!({
        "ALT_TIMER_FORMAT": 4,
        "CORF": "C",
        "DEVICE_ID": "NeoHub",
        "DST_AUTO": true,
        "DST_ON": false,
        "FORMAT": 2,
        "HUB_TYPE": 2,
        "HUB_VERSION": 2134,
        "NTP_ON": "Running",
        "PARTITION": "1",
        "TIMESTAMP": 0,
        "TIME_ZONE": 1.0,
        "UTC": 1_600_000_000
    })
}

pub fn thermostat_json(name: &str) -> Value {
    json!({
        "ACTIVE_LEVEL": 0,
        "ACTIVE_PROFILE": 0,
        "ACTUAL_TEMP": "20.4",
        "AVAILABLE_MODES": ["heat", "cool"],
        "AWAY": false,
        "COOL_MODE": false,
        "COOL_ON": false,
        "COOL_TEMP": 0,
        "CURRENT_FLOOR_TEMPERATURE": 127,
        "DATE": "Wednesday",
        "DEVICE_ID": 1,
        "FAN_CONTROL": "Manual",
        "FAN_SPEED": "Off",
        "FLOOR_LIMIT": false,
        "HC_MODE": "HEATING",
        "HEAT_MODE": true,
        "HEAT_ON": true,
        "HOLD_COOL": 0,
        "HOLD_OFF": false,
        "HOLD_ON": false,
        "HOLD_TEMP": 21,
        "HOLD_TIME": "01:30",
        "HOLIDAY": false,
        "LOCK": false,
        "LOW_BATTERY": false,
        "MANUAL_OFF": false,
        "MODELOCK": false,
        "MODULATION_LEVEL": 0,
        "OFFLINE": false,
        "PIN_NUMBER": "0042",
        "PREHEAT_ACTIVE": false,
        "PRG_TEMP": 0,
        "PRG_TIMER": false,
        "RECENT_TEMPS": ["20.4", "20.3"],
        "RELATIVE_HUMIDITY": 0,
        "SET_TEMP": "21.5",
        "STANDBY": false,
        "SWITCH_DELAY_LEFT": "00:00",
        "TEMPORARY_SET_FLAG": false,
        "THERMOSTAT": true,
        "TIME": "13:05",
        "TIMER_ON": false,
        "WINDOW_OPEN": false,
        "WRITE_COUNT": 12,
        "ZONE_NAME": name
    })
}

pub fn timeclock_json(name: &str) -> Value {
    json!({
        "DATE": "wednesday",
        "DEVICE_ID": 3,
        "HOLD_TIME": "00:00",
        "PIN_NUMBER": "",
        "PREHEAT_ACTIVE": 0,
        "SWITCH_DELAY_LEFT": "00:00",
        "TIME": "13:05",
        "TIMECLOCK": true,
        "TIMER_ON": true,
        "ZONE_NAME": name
    })
}

pub fn live_data_json() -> Value {
    json!({
        "CLOSE_DELAY": 0,
        "COOL_INPUT": false,
        "HOLIDAY_END": 0,
        "HUB_AWAY": false,
        "HUB_HOLIDAY": false,
        "HUB_TIME": 1_600_000_000,
        "OPEN_DELAY": 0,
        "TIMESTAMP_DEVICE_LISTS": 1_599_000_000,
        "devices": [
            thermostat_json("Kitchen"),
            timeclock_json("Hot Water"),
            thermostat_json("Lounge"),
            { "ZONE_NAME": "Repeater", "DEVICE_ID": 9 }
        ]
    })
}

pub fn holiday_json() -> Value {
    json!({
        "start": "Fri Jul  3 12:00:00 2020\n",
        "end": "Sun Jul 12 09:30:00 2020\n",
        "ids": [1, 2]
    })
}
