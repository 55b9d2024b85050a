//! Typed client for the NeoHub heating hub.
//!
//! [`NeoHub`] wraps the request engine from `neohub-rpc` with one method per
//! hub command and decodes replies into [`SystemInfo`], [`LiveData`],
//! [`ZoneSnapshot`] and [`HolidayWindow`]. [`registry`] exposes the same
//! operations by name for the command-line front end.
//!
//! ```no_run
//! use neohub_core::{HubConfig, NeoHub};
//!
//! # async fn example() -> neohub_core::Result<()> {
//! let hub = NeoHub::from_config(&HubConfig::load_default()?)?;
//!
//! let live = hub.get_live_data().await?;
//! for zone in &live.thermostats {
//!     println!("{}: {:?}", zone.name, zone.temperature);
//! }
//! if let Some(kitchen) = live.zone("Kitchen") {
//!     kitchen.set_target_temperature(21.5).await?;
//! }
//! # Ok(())
//! # }
//! ```

// Large `json!` fixtures in the test tree
#![recursion_limit = "256"]

pub mod config;
pub mod registry;

mod decode;
mod error;
mod holiday;
mod live_data;
mod neohub;
mod system;
mod zone;

#[cfg(test)]
mod tests;

pub use config::HubConfig;
pub use error::{Error, Result};
pub use holiday::HolidayWindow;
pub use live_data::LiveData;
pub use neohub::{HALF_DEGREE_MIN_FIRMWARE, NeoHub, RESET_MIN_FIRMWARE};
pub use system::SystemInfo;
pub use zone::{ZoneControl, ZoneName, ZoneRef, ZoneSnapshot};

pub use neohub_rpc::{HubAddress, Reply, RequestOptions};
pub use neohub_types::*;
