//! Embassy runtime for the cellmux controller
//!
//! Splits the system into the execution contexts the controller expects:
//!
//! - Interrupt producers report pins through a bounded queue
//!   ([`irq::notify_interrupt`]), never blocking
//! - One [`worker::Worker`] owns the controller and the hardware and runs
//!   all handlers and deferred work
//! - [`supervisor::run_supervisor`] ticks the supervisory checks
//! - The UI reads snapshots and sends commands via [`ui::UiClient`]
//!
//! The loops are plain async functions; the board crate wraps them in its
//! executor's tasks and supplies the [`cellmux_hal::Hardware`] implementation.

#![no_std]
#![deny(unsafe_code)]

// Must come first so the macros are visible to the other modules
mod fmt;

pub mod channels;
pub mod clock;
pub mod irq;
pub mod supervisor;
pub mod ui;
pub mod worker;

pub use channels::{Channels, CHANNELS};
pub use clock::EmbassyClock;
pub use irq::notify_interrupt;
pub use ui::UiClient;
pub use worker::Worker;
