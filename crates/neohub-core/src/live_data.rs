use neohub_rpc::Reply;
use neohub_types::ProtocolDataError;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::zone::{ZoneControl, ZoneSnapshot};

/// Decoded `GET_LIVE_DATA` reply, with devices split by kind.
#[derive(Debug, Clone, Serialize)]
pub struct LiveData {
    /// Hub-level fields, everything except `devices`
    pub hub: Reply,
    pub thermostats: Vec<ZoneSnapshot>,
    pub timeclocks: Vec<ZoneSnapshot>,
}

impl LiveData {
    /// Split the device list into thermostats and time clocks.
    ///
    /// A device flagged as both counts as a thermostat. Devices flagged as
    /// neither are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolDataError`] if `devices` is missing or not a list,
    /// or if any device fails to decode.
    pub fn from_reply(mut reply: Reply, hub: &ZoneControl) -> Result<Self, ProtocolDataError> {
        let devices = match reply.remove("devices") {
            Some(Value::Array(devices)) => devices,
            Some(other) => {
                return Err(ProtocolDataError::invalid_field(
                    "devices",
                    format!("expected a list, got {other}"),
                ));
            }
            None => return Err(ProtocolDataError::invalid_field("devices", "missing")),
        };

        let mut thermostats = Vec::new();
        let mut timeclocks = Vec::new();

        for device in devices {
            let Value::Object(record) = device else {
                return Err(ProtocolDataError::invalid_field(
                    "devices",
                    format!("expected an object, got {device}"),
                ));
            };

            let zone = ZoneSnapshot::from_record(&record, hub.clone())?;
            if zone.thermostat {
                thermostats.push(zone);
            } else if zone.timeclock {
                timeclocks.push(zone);
            } else {
                debug!("Skipping device '{}': neither thermostat nor time clock", zone.name);
            }
        }

        Ok(Self {
            hub: reply,
            thermostats,
            timeclocks,
        })
    }

    /// Every decoded zone, thermostats first.
    pub fn zones(&self) -> impl Iterator<Item = &ZoneSnapshot> {
        self.thermostats.iter().chain(&self.timeclocks)
    }

    #[must_use]
    pub fn zone(&self, name: &str) -> Option<&ZoneSnapshot> {
        self.zones().find(|zone| zone.name == name)
    }
}
