//! Test module for neohub-core
//!
//! This module contains tests for:
//! - Hub record decoding (system, live data, zones, holidays)
//! - Facade operations against an in-process fake hub
//! - Command registry dispatch and argument coercion
//! - Configuration loading and defaults

// Test modules use exact float comparisons
#![allow(clippy::float_cmp)]

mod decoder_tests;
mod fixtures;
