//! Cellmux Hardware Abstraction Layer
//!
//! The controller core only ever touches hardware through four primitive
//! operations. This crate defines them as traits so the same core can run
//! against real expanders/converters or against host-side test doubles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  cellmux-runtime (embassy tasks)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cellmux-core (scheduling, slots, ...)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cellmux-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            board-specific drivers
//! ```
//!
//! # Traits
//!
//! - [`digital::DigitalPorts`] - Pin write and whole-port batch read
//! - [`analog::AnalogConverters`] - Batched multi-channel conversion
//! - [`pwm::PwmController`] - Duty window programming
//! - [`clock::Clock`] - Monotonic millisecond time

#![no_std]
#![deny(unsafe_code)]

pub mod analog;
pub mod clock;
pub mod digital;
pub mod pwm;

pub use analog::{AdcId, AnalogConverters, Gain, ADC_CHANNELS};
pub use clock::Clock;
pub use digital::{DigitalPorts, PortId};
pub use pwm::{PwmController, PwmDuty, PwmTarget};

/// Everything the controller core needs from a board
///
/// Boards usually implement all three traits on one struct that owns the
/// shared bus.
pub trait Hardware: DigitalPorts + AnalogConverters + PwmController {}

// Blanket implementation for types that implement all three traits
impl<T: DigitalPorts + AnalogConverters + PwmController> Hardware for T {}
