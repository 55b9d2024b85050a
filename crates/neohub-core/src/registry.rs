//! Static command table for the command-line front end.
//!
//! Each facade operation is listed once with its parameters, help text and
//! an invoker. [`dispatch`] checks the argument count, coerces every string
//! argument to its declared kind, and only then talks to the hub, so a bad
//! argument never costs a round trip.

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use neohub_types::{DstRegion, ScheduleFormat, TemperatureUnit};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::Error;
use crate::neohub::NeoHub;

/// Join window used by `permit_join` when no timeout is given.
pub const DEFAULT_JOIN_TIMEOUT_SECS: u32 = 120;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Unknown command '{0}' (run 'help' for a list)")]
    UnknownCommand(String),

    #[error("'{command}' takes {expected}, got {got}")]
    ArgumentCount {
        command: &'static str,
        expected: String,
        got: usize,
    },

    #[error("Invalid {param} for '{command}': {reason}")]
    InvalidArgument {
        command: &'static str,
        param: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Hub(#[from] Error),
}

/// How a string argument is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    Str,
    /// on/off, true/false, yes/no, 1/0
    Bool,
    ScheduleFormat,
    TemperatureUnit,
    DstRegion,
    /// `YYYY-MM-DD`
    Date,
    /// `HH:MM`
    Time,
    /// `YYYY-MM-DDTHH:MM[:SS]`, a space may replace the `T`
    DateTime,
    /// One or more zone names; always the last parameter
    Zones,
}

impl ParamKind {
    fn describe(self) -> &'static str {
        match self {
            ParamKind::Int => "integer",
            ParamKind::Float => "number",
            ParamKind::Str => "text",
            ParamKind::Bool => "on|off",
            ParamKind::ScheduleFormat => "NONPROGRAMMABLE|24HOURSFIXED|5DAY/2DAY|7DAY",
            ParamKind::TemperatureUnit => "C|F",
            ParamKind::DstRegion => "UK|EU|NZ",
            ParamKind::Date => "YYYY-MM-DD",
            ParamKind::Time => "HH:MM",
            ParamKind::DateTime => "YYYY-MM-DDTHH:MM",
            ParamKind::Zones => "zone names",
        }
    }

    fn coerce(self, raw: &str) -> Result<ArgValue, String> {
        let value = match self {
            ParamKind::Int => ArgValue::Int(
                raw.trim()
                    .parse()
                    .map_err(|_| format!("'{raw}' is not an integer"))?,
            ),
            ParamKind::Float => {
                let value: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("'{raw}' is not a number"))?;
                if !value.is_finite() {
                    return Err(format!("'{raw}' is not a finite number"));
                }
                ArgValue::Float(value)
            }
            ParamKind::Str => ArgValue::Str(raw.to_string()),
            ParamKind::Bool => ArgValue::Bool(parse_bool(raw)?),
            ParamKind::ScheduleFormat => {
                ArgValue::ScheduleFormat(raw.parse().map_err(|e| format!("{e}"))?)
            }
            ParamKind::TemperatureUnit => {
                ArgValue::TemperatureUnit(raw.parse().map_err(|e| format!("{e}"))?)
            }
            ParamKind::DstRegion => ArgValue::DstRegion(raw.parse().map_err(|e| format!("{e}"))?),
            ParamKind::Date => ArgValue::Date(
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| format!("'{raw}' is not a YYYY-MM-DD date"))?,
            ),
            ParamKind::Time => ArgValue::Time(
                NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                    .map_err(|_| format!("'{raw}' is not an HH:MM time"))?,
            ),
            ParamKind::DateTime => ArgValue::DateTime(parse_datetime(raw)?),
            ParamKind::Zones => ArgValue::Zones(vec![raw.to_string()]),
        };
        Ok(value)
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("'{raw}' is not on/off")),
    }
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
        .ok_or_else(|| format!("'{raw}' is not a YYYY-MM-DDTHH:MM date and time"))
}

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub optional: bool,
}

impl Param {
    const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            optional: false,
        }
    }

    const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            optional: true,
        }
    }

    const fn zones() -> Self {
        Self::required("zones", ParamKind::Zones)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.optional) {
            (ParamKind::Zones, _) => write!(f, "<{}>...", self.name),
            (_, true) => write!(f, "[{}]", self.name),
            (_, false) => write!(f, "<{}>", self.name),
        }
    }
}

/// A coerced argument.
#[derive(Debug, Clone, PartialEq)]
enum ArgValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    ScheduleFormat(ScheduleFormat),
    TemperatureUnit(TemperatureUnit),
    DstRegion(DstRegion),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Zones(Vec<String>),
}

/// Arguments of one invocation, already coerced to their declared kinds.
#[derive(Debug, Clone)]
pub struct Args {
    command: &'static str,
    values: HashMap<&'static str, ArgValue>,
}

impl Args {
    fn value(&self, name: &'static str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    fn mismatch(&self, name: &'static str, reason: impl Into<String>) -> DispatchError {
        DispatchError::InvalidArgument {
            command: self.command,
            param: name,
            reason: reason.into(),
        }
    }

    fn get<T: FromArg>(&self, name: &'static str) -> Result<T, DispatchError> {
        self.get_opt(name)?
            .ok_or_else(|| self.mismatch(name, "missing"))
    }

    fn get_opt<T: FromArg>(&self, name: &'static str) -> Result<Option<T>, DispatchError> {
        self.value(name)
            .map(|value| T::from_arg(value).map_err(|reason| self.mismatch(name, reason)))
            .transpose()
    }

    fn zones(&self) -> Result<&[String], DispatchError> {
        match self.value("zones") {
            Some(ArgValue::Zones(zones)) => Ok(zones),
            _ => Err(self.mismatch("zones", "missing")),
        }
    }
}

trait FromArg: Sized {
    fn from_arg(value: &ArgValue) -> Result<Self, String>;
}

macro_rules! from_arg {
    ($ty:ty, $variant:ident) => {
        impl FromArg for $ty {
            fn from_arg(value: &ArgValue) -> Result<Self, String> {
                match value {
                    ArgValue::$variant(inner) => Ok(Clone::clone(inner)),
                    other => Err(format!("unexpected {other:?}")),
                }
            }
        }
    };
}

from_arg!(i64, Int);
from_arg!(f64, Float);
from_arg!(String, Str);
from_arg!(bool, Bool);
from_arg!(ScheduleFormat, ScheduleFormat);
from_arg!(TemperatureUnit, TemperatureUnit);
from_arg!(DstRegion, DstRegion);
from_arg!(NaiveDate, Date);
from_arg!(NaiveTime, Time);
from_arg!(NaiveDateTime, DateTime);

impl FromArg for u32 {
    fn from_arg(value: &ArgValue) -> Result<Self, String> {
        let int = i64::from_arg(value)?;
        u32::try_from(int).map_err(|_| format!("{int} is out of range"))
    }
}

type Invoke = fn(NeoHub, Args) -> BoxFuture<'static, Result<Value, DispatchError>>;

/// One command the front end can run.
pub struct Command {
    pub name: &'static str,
    pub params: Vec<Param>,
    pub help: &'static str,
    invoke: Invoke,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Command {
    fn new(
        name: &'static str,
        params: Vec<Param>,
        help: &'static str,
        invoke: Invoke,
    ) -> Self {
        Self {
            name,
            params,
            help,
            invoke,
        }
    }

    /// One-line synopsis, e.g. `set_lock <pin> <zones>...`.
    #[must_use]
    pub fn usage(&self) -> String {
        let mut usage = self.name.to_string();
        for param in &self.params {
            let _ = write!(usage, " {param}");
        }
        usage
    }

    /// Synopsis, help text and parameter kinds.
    #[must_use]
    pub fn render_help(&self) -> String {
        let mut text = format!("{}\n\n{}\n", self.usage(), self.help);
        if !self.params.is_empty() {
            text.push_str("\nArguments:\n");
            for param in &self.params {
                let _ = writeln!(text, "  {:<14} {}", param.name, param.kind.describe());
            }
        }
        text
    }

    fn expected_count(&self) -> String {
        let required = self.params.iter().filter(|p| !p.optional).count();
        let variadic = self.params.iter().any(|p| p.kind == ParamKind::Zones);
        let plural = |n: usize| if n == 1 { "argument" } else { "arguments" };
        if variadic {
            format!("at least {required} {}", plural(required))
        } else if required == self.params.len() {
            format!("{required} {}", plural(required))
        } else {
            format!("{required} to {} arguments", self.params.len())
        }
    }

    /// Check the count and coerce each argument.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ArgumentCount`] or
    /// [`DispatchError::InvalidArgument`].
    pub fn parse_args(&self, raw: &[String]) -> Result<Args, DispatchError> {
        let required = self.params.iter().filter(|p| !p.optional).count();
        let variadic = self.params.last().is_some_and(|p| p.kind == ParamKind::Zones);
        if raw.len() < required || (!variadic && raw.len() > self.params.len()) {
            return Err(DispatchError::ArgumentCount {
                command: self.name,
                expected: self.expected_count(),
                got: raw.len(),
            });
        }

        let mut values = HashMap::new();
        for (index, param) in self.params.iter().enumerate() {
            let invalid = |reason: String| DispatchError::InvalidArgument {
                command: self.name,
                param: param.name,
                reason,
            };

            if param.kind == ParamKind::Zones {
                let zones = raw[index..].to_vec();
                if let Some(blank) = zones.iter().find(|z| z.trim().is_empty()) {
                    return Err(invalid(format!("'{blank}' is not a zone name")));
                }
                values.insert(param.name, ArgValue::Zones(zones));
                break;
            }

            let Some(arg) = raw.get(index) else {
                break;
            };
            values.insert(param.name, param.kind.coerce(arg).map_err(invalid)?);
        }

        Ok(Args {
            command: self.name,
            values,
        })
    }

    /// Coerce the arguments and run the command against `hub`.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] for bad arguments or a failed hub call.
    pub async fn run(&self, hub: &NeoHub, raw: &[String]) -> Result<Value, DispatchError> {
        let args = self.parse_args(raw)?;
        (self.invoke)(hub.clone(), args).await
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, DispatchError> {
    serde_json::to_value(value).map_err(|e| DispatchError::Hub(e.into()))
}

use ParamKind as K;

static COMMANDS: LazyLock<Vec<Command>> = LazyLock::new(|| {
    vec![
        Command::new("firmware", vec![], "Firmware version of the hub.", |hub, _| {
            async move { Ok(json!(hub.firmware().await?)) }.boxed()
        }),
        Command::new("get_system", vec![], "Hub-wide settings.", |hub, _| {
            async move { to_json(&hub.get_system().await?) }.boxed()
        }),
        Command::new(
            "target_temperature_step",
            vec![],
            "Set point granularity supported by the hub firmware.",
            |hub, _| async move { Ok(json!(hub.target_temperature_step().await?)) }.boxed(),
        ),
        Command::new(
            "reset",
            vec![],
            "Restart the hub. Needs firmware 2027 or later.",
            |hub, _| async move { Ok(json!(hub.reset().await?)) }.boxed(),
        ),
        Command::new(
            "set_channel",
            vec![Param::required("channel", K::Int)],
            "Change the ZigBee channel (11, 14, 15, 19, 20, 24 or 25).",
            |hub, args| {
                async move {
                    let channel = args.get("channel")?;
                    Ok(json!(hub.set_channel(channel).await?))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_temp_format",
            vec![Param::required("unit", K::TemperatureUnit)],
            "Display temperatures in Celsius or Fahrenheit.",
            |hub, args| {
                async move {
                    let unit = args.get("unit")?;
                    Ok(json!(hub.set_temp_format(unit).await))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_format",
            vec![Param::required("format", K::ScheduleFormat)],
            "Change the schedule format of all devices.",
            |hub, args| {
                async move {
                    let format = args.get("format")?;
                    Ok(json!(hub.set_format(format).await))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_away",
            vec![Param::required("state", K::Bool)],
            "Away mode: thermostats go to frost protection, time clocks switch off.",
            |hub, args| {
                async move {
                    let state = args.get("state")?;
                    Ok(json!(hub.set_away(state).await))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_holiday",
            vec![
                Param::required("start", K::DateTime),
                Param::required("end", K::DateTime),
            ],
            "Schedule a holiday between two local times.",
            |hub, args| {
                async move {
                    let start = args.get("start")?;
                    let end = args.get("end")?;
                    to_json(&hub.set_holiday(start, end).await?)
                }
                .boxed()
            },
        ),
        Command::new("get_holiday", vec![], "Scheduled holiday, if any.", |hub, _| {
            async move { to_json(&hub.get_holiday().await?) }.boxed()
        }),
        Command::new("cancel_holiday", vec![], "Cancel the scheduled holiday.", |hub, _| {
            async move { Ok(json!(hub.cancel_holiday().await)) }.boxed()
        }),
        Command::new("get_zones", vec![], "Zone names and ids.", |hub, _| {
            async move { to_json(&hub.get_zones().await?) }.boxed()
        }),
        Command::new("get_devices", vec![], "Devices known to the hub.", |hub, _| {
            async move { to_json(&hub.get_devices().await?) }.boxed()
        }),
        Command::new(
            "get_device_list",
            vec![Param::required("zone", K::Str)],
            "Devices in one zone.",
            |hub, args| {
                async move {
                    let zone: String = args.get("zone")?;
                    to_json(&hub.get_device_list(&zone).await?)
                }
                .boxed()
            },
        ),
        Command::new(
            "devices_sn",
            vec![],
            "Serial numbers of attached devices.",
            |hub, _| async move { to_json(&hub.devices_sn().await?) }.boxed(),
        ),
        Command::new(
            "set_ntp",
            vec![Param::required("state", K::Bool)],
            "Start or stop the hub's NTP client.",
            |hub, args| {
                async move {
                    let state = args.get("state")?;
                    Ok(json!(hub.set_ntp(state).await))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_date",
            vec![Param::optional("date", K::Date)],
            "Set the hub date (default: today).",
            |hub, args| {
                async move {
                    let date = args.get_opt("date")?;
                    Ok(json!(hub.set_date(date).await))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_time",
            vec![Param::optional("time", K::Time)],
            "Set the hub clock (default: now).",
            |hub, args| {
                async move {
                    let time = args.get_opt("time")?;
                    Ok(json!(hub.set_time(time).await))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_datetime",
            vec![Param::optional("datetime", K::DateTime)],
            "Set the hub date and clock (default: now).",
            |hub, args| {
                async move {
                    let datetime = args.get_opt("datetime")?;
                    Ok(json!(hub.set_datetime(datetime).await))
                }
                .boxed()
            },
        ),
        Command::new(
            "manual_dst",
            vec![Param::required("state", K::Bool)],
            "Manually apply or remove the daylight saving hour.",
            |hub, args| {
                async move {
                    let state = args.get("state")?;
                    Ok(json!(hub.manual_dst(state).await))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_dst",
            vec![
                Param::required("state", K::Bool),
                Param::optional("region", K::DstRegion),
            ],
            "Automatic daylight saving, optionally for a region.",
            |hub, args| {
                async move {
                    let state = args.get("state")?;
                    let region = args.get_opt("region")?;
                    Ok(json!(hub.set_dst(state, region).await))
                }
                .boxed()
            },
        ),
        Command::new("identify", vec![], "Flash the hub's LED.", |hub, _| {
            async move { Ok(json!(hub.identify().await)) }.boxed()
        }),
        Command::new(
            "get_live_data",
            vec![],
            "Hub state and every thermostat and time clock.",
            |hub, _| async move { to_json(&hub.get_live_data().await?) }.boxed(),
        ),
        Command::new(
            "permit_join",
            vec![
                Param::required("name", K::Str),
                Param::optional("timeout", K::Int),
            ],
            "Let a new device join as zone <name> (default window: 120 s).",
            |hub, args| {
                async move {
                    let name: String = args.get("name")?;
                    let timeout = args.get_opt("timeout")?.unwrap_or(DEFAULT_JOIN_TIMEOUT_SECS);
                    Ok(json!(hub.permit_join(&name, timeout).await?))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_lock",
            vec![Param::required("pin", K::Int), Param::zones()],
            "Lock thermostats with a four digit PIN.",
            |hub, args| {
                async move {
                    let pin = args.get("pin")?;
                    Ok(json!(hub.set_lock(pin, args.zones()?).await?))
                }
                .boxed()
            },
        ),
        Command::new(
            "unlock",
            vec![Param::zones()],
            "Unlock thermostats.",
            |hub, args| async move { Ok(json!(hub.unlock(args.zones()?).await?)) }.boxed(),
        ),
        Command::new(
            "set_frost",
            vec![Param::required("state", K::Bool), Param::zones()],
            "Frost protection mode.",
            |hub, args| {
                async move {
                    let state = args.get("state")?;
                    Ok(json!(hub.set_frost(state, args.zones()?).await?))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_target_temperature",
            vec![Param::required("temperature", K::Float), Param::zones()],
            "Set the target temperature of thermostats.",
            |hub, args| {
                async move {
                    let temperature = args.get("temperature")?;
                    Ok(json!(
                        hub.set_target_temperature(temperature, args.zones()?)
                            .await?
                    ))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_diff",
            vec![Param::required("differential", K::Int), Param::zones()],
            "Set the switching differential of thermostats.",
            |hub, args| {
                async move {
                    let differential = args.get("differential")?;
                    Ok(json!(hub.set_diff(differential, args.zones()?).await?))
                }
                .boxed()
            },
        ),
        Command::new(
            "rate_of_change",
            vec![Param::zones()],
            "Minutes each zone needs to warm by one degree.",
            |hub, args| async move { to_json(&hub.rate_of_change(args.zones()?).await?) }.boxed(),
        ),
        Command::new(
            "set_timer",
            vec![Param::required("state", K::Bool), Param::zones()],
            "Switch time clocks on or off.",
            |hub, args| {
                async move {
                    let state = args.get("state")?;
                    Ok(json!(hub.set_timer(state, args.zones()?).await?))
                }
                .boxed()
            },
        ),
        Command::new(
            "set_timer_hold",
            vec![
                Param::required("state", K::Bool),
                Param::required("minutes", K::Int),
                Param::zones(),
            ],
            "Hold time clocks on or off for a number of minutes.",
            |hub, args| {
                async move {
                    let state = args.get("state")?;
                    let minutes = args.get("minutes")?;
                    Ok(json!(
                        hub.set_timer_hold(state, minutes, args.zones()?).await?
                    ))
                }
                .boxed()
            },
        ),
        Command::new(
            "identify_zone",
            vec![Param::required("zone", K::Str)],
            "Flash a device's red LED.",
            |hub, args| {
                async move {
                    let zone: String = args.get("zone")?;
                    Ok(json!(hub.identify_zone(&zone).await?))
                }
                .boxed()
            },
        ),
        Command::new(
            "rename_zone",
            vec![
                Param::required("zone", K::Str),
                Param::required("new_name", K::Str),
            ],
            "Rename a zone.",
            |hub, args| {
                async move {
                    let zone: String = args.get("zone")?;
                    let new_name: String = args.get("new_name")?;
                    Ok(json!(hub.rename_zone(&zone, &new_name).await?))
                }
                .boxed()
            },
        ),
        Command::new(
            "remove_zone",
            vec![Param::required("zone", K::Str)],
            "Remove a zone from the hub.",
            |hub, args| {
                async move {
                    let zone: String = args.get("zone")?;
                    Ok(json!(hub.remove_zone(&zone).await?))
                }
                .boxed()
            },
        ),
    ]
});

/// Every command, in help order.
#[must_use]
pub fn commands() -> &'static [Command] {
    &COMMANDS
}

#[must_use]
pub fn lookup(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|command| command.name == name)
}

/// Run `name` with string arguments.
///
/// # Errors
///
/// Returns [`DispatchError::UnknownCommand`] for names not in the table,
/// otherwise whatever [`Command::run`] returns.
pub async fn dispatch(hub: &NeoHub, name: &str, args: &[String]) -> Result<Value, DispatchError> {
    let command = lookup(name).ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;
    command.run(hub, args).await
}

/// Overview of all commands, or the full help of one.
///
/// # Errors
///
/// Returns [`DispatchError::UnknownCommand`] if `name` is not in the table.
pub fn render_help(name: Option<&str>) -> Result<String, DispatchError> {
    if let Some(name) = name {
        let command =
            lookup(name).ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;
        return Ok(command.render_help());
    }

    let width = COMMANDS.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let mut text = String::from("Commands:\n");
    for command in commands() {
        let summary = command.help.lines().next().unwrap_or_default();
        let _ = writeln!(text, "  {:<width$}  {summary}", command.name);
    }
    text.push_str("\nRun 'help <command>' for arguments.\n");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_command_names_unique() {
        let mut names: Vec<_> = commands().iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), commands().len());
    }

    #[test]
    fn test_zones_only_last_and_optionals_trailing() {
        for command in commands() {
            for (index, param) in command.params.iter().enumerate() {
                if param.kind == ParamKind::Zones {
                    assert_eq!(index, command.params.len() - 1, "{}", command.name);
                }
                if param.optional {
                    assert!(
                        command.params[index..].iter().all(|p| p.optional),
                        "{}",
                        command.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_usage_rendering() {
        assert_eq!(lookup("set_lock").unwrap().usage(), "set_lock <pin> <zones>...");
        assert_eq!(
            lookup("set_dst").unwrap().usage(),
            "set_dst <state> [region]"
        );
        assert_eq!(lookup("identify").unwrap().usage(), "identify");
    }

    #[test]
    fn test_parse_bool_spellings() {
        for raw in ["on", "TRUE", "yes", "1"] {
            assert_eq!(parse_bool(raw), Ok(true));
        }
        for raw in ["off", "false", "No", "0"] {
            assert_eq!(parse_bool(raw), Ok(false));
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 12, 24)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-12-24T18:30"), Ok(expected));
        assert_eq!(parse_datetime("2024-12-24 18:30:00"), Ok(expected));
        assert!(parse_datetime("24/12/2024").is_err());
    }

    #[test]
    fn test_parse_args_variadic_zones() {
        let command = lookup("set_frost").unwrap();
        let parsed = command
            .parse_args(&args(&["on", "Kitchen", "Lounge", "Hall"]))
            .unwrap();
        assert!(parsed.get::<bool>("state").unwrap());
        assert_eq!(parsed.zones().unwrap(), ["Kitchen", "Lounge", "Hall"]);
    }

    #[test]
    fn test_parse_args_requires_a_zone() {
        let err = lookup("set_frost")
            .unwrap()
            .parse_args(&args(&["on"]))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::ArgumentCount { got: 1, .. }
        ));
        assert!(err.to_string().contains("at least 2 arguments"));
    }

    #[test]
    fn test_parse_args_too_many() {
        let err = lookup("identify")
            .unwrap()
            .parse_args(&args(&["now"]))
            .unwrap_err();
        assert!(matches!(err, DispatchError::ArgumentCount { got: 1, .. }));
    }

    #[test]
    fn test_parse_args_optional_missing() {
        let parsed = lookup("set_dst")
            .unwrap()
            .parse_args(&args(&["on"]))
            .unwrap();
        assert_eq!(parsed.get_opt::<DstRegion>("region").unwrap(), None);
    }

    #[test]
    fn test_parse_args_invalid_kind() {
        let err = lookup("set_channel")
            .unwrap()
            .parse_args(&args(&["eleven"]))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InvalidArgument {
                param: "channel",
                ..
            }
        ));

        let err = lookup("set_format")
            .unwrap()
            .parse_args(&args(&["6DAY"]))
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument { .. }));
    }

    #[test]
    fn test_u32_range_checked() {
        let parsed = lookup("set_timer_hold")
            .unwrap()
            .parse_args(&args(&["on", "-5", "Kitchen"]))
            .unwrap();
        assert!(matches!(
            parsed.get::<u32>("minutes"),
            Err(DispatchError::InvalidArgument { param: "minutes", .. })
        ));
    }

    #[test]
    fn test_render_help() {
        let overview = render_help(None).unwrap();
        assert!(overview.contains("get_live_data"));
        assert!(overview.contains("set_timer_hold"));

        let detail = render_help(Some("set_target_temperature")).unwrap();
        assert!(detail.starts_with("set_target_temperature <temperature> <zones>..."));
        assert!(detail.contains("number"));

        assert!(matches!(
            render_help(Some("fly")),
            Err(DispatchError::UnknownCommand(_))
        ));
    }
}
