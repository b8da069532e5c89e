//! Board-agnostic core of the cellmux battery multiplexer
//!
//! Everything that does not depend on a particular board lives here:
//!
//! - Static wiring tables and the battery-type catalog
//! - Debounced digital I/O cache
//! - Analog sampling and coulomb counting
//! - Battery slot and charger state
//! - PWM time-division scheduling of the active slots
//! - Interrupt routing, deferred work and periodic timers
//! - Supervisory checks and the UI snapshot/command surface
//!
//! Hardware is reached only through the `cellmux-hal` traits, so the whole
//! crate runs on the host under test.

#![no_std]
#![deny(unsafe_code)]

pub mod charge;
pub mod charger;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod pwm;
pub mod sampling;
pub mod slots;
pub mod supervisor;
pub mod ui;
pub mod work;

#[cfg(test)]
mod testing;

pub use controller::{Controller, Notice, Ran};
pub use error::{ConfigError, Device, Error};
