//! Interrupt producer side
//!
//! Board interrupt handlers (or pin-wait tasks) report which pin fired.
//! Reporting never blocks. Charge edges are tallied inline and never lost;
//! any other event is dropped and counted if the worker has fallen behind.

use embassy_sync::channel::TrySendError;

use cellmux_core::config::PinId;
use cellmux_core::dispatch::{route, IrqRoute};

use crate::channels::Channels;

/// Queue an interrupt event for the worker
///
/// Returns `false` if the queue was full and the event was dropped.
pub fn notify_interrupt(channels: &Channels, pin: PinId) -> bool {
    if let Some(IrqRoute::ChargeEdge(counter)) = route(pin) {
        channels.add_edge(counter);
        return true;
    }

    match channels.interrupts.try_send(pin) {
        Ok(()) => true,
        Err(TrySendError::Full(pin)) => {
            channels.note_dropped_interrupt();
            warn!("interrupt queue full, dropped {:?}", pin);
            false
        }
    }
}
