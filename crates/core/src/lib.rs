//! Guardian domain logic.
//!
//! Everything in this crate is pure (no database or network access) so it
//! can be unit tested in isolation:
//!
//! - [`telemetry`]: topic parsing and payload decoding for device messages.
//! - [`alert`]: the threshold rule engine.
//! - [`threshold_validation`]: alert rule bound checks.
//! - [`topics`]: well-known topic segments and push message types.

pub mod alert;
pub mod error;
pub mod telemetry;
pub mod threshold_validation;
pub mod topics;
pub mod types;
