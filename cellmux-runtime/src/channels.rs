//! Inter-task communication
//!
//! Interrupt producers, the supervisory ticker and the UI all talk to the
//! single worker through these queues and signals. Nothing else holds a
//! reference to controller state. Charge edges bypass the interrupt queue
//! and are tallied per counter so a burst never loses one.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use cellmux_core::config::{CounterId, PinId, COUNTER_COUNT};
use cellmux_core::dispatch::Button;
use cellmux_core::ui::{Snapshot, UiCommand};

/// Pending interrupt events
pub const INTERRUPT_QUEUE_DEPTH: usize = 16;

/// Pending UI commands
pub const COMMAND_QUEUE_DEPTH: usize = 4;

/// Button presses not yet taken by the UI
pub const BUTTON_QUEUE_DEPTH: usize = 4;

pub type InterruptQueue = Channel<CriticalSectionRawMutex, PinId, INTERRUPT_QUEUE_DEPTH>;
pub type CommandQueue = Channel<CriticalSectionRawMutex, UiCommand, COMMAND_QUEUE_DEPTH>;
pub type ButtonQueue = Channel<CriticalSectionRawMutex, Button, BUTTON_QUEUE_DEPTH>;

/// Every channel between the worker and the rest of the system
pub struct Channels {
    /// Interrupt pins that fired, in order
    pub interrupts: InterruptQueue,
    /// Requests from the UI
    pub commands: CommandQueue,
    /// Button presses forwarded to the UI
    pub buttons: ButtonQueue,
    /// Latest display snapshot
    pub snapshot: Signal<CriticalSectionRawMutex, Snapshot>,
    /// Supervisory tick
    pub supervise: Signal<CriticalSectionRawMutex, ()>,
    /// Raised when a charge edge is tallied
    pub edges: Signal<CriticalSectionRawMutex, ()>,
    pending_edges: Mutex<CriticalSectionRawMutex, Cell<[u32; COUNTER_COUNT]>>,
    dropped_interrupts: Mutex<CriticalSectionRawMutex, Cell<u32>>,
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}

impl Channels {
    pub const fn new() -> Self {
        Self {
            interrupts: Channel::new(),
            commands: Channel::new(),
            buttons: Channel::new(),
            snapshot: Signal::new(),
            supervise: Signal::new(),
            edges: Signal::new(),
            pending_edges: Mutex::new(Cell::new([0; COUNTER_COUNT])),
            dropped_interrupts: Mutex::new(Cell::new(0)),
        }
    }

    /// Interrupt events lost to a full queue
    pub fn dropped_interrupts(&self) -> u32 {
        self.dropped_interrupts.lock(|c| c.get())
    }

    /// Tally one charge edge for the worker to pick up
    pub fn add_edge(&self, counter: CounterId) {
        self.pending_edges.lock(|c| {
            let mut pending = c.get();
            let slot = &mut pending[counter.index()];
            *slot = slot.saturating_add(1);
            c.set(pending);
        });
        self.edges.signal(());
    }

    /// Take every tallied edge, leaving the tallies at zero
    pub fn take_edges(&self) -> [u32; COUNTER_COUNT] {
        self.pending_edges.lock(|c| c.replace([0; COUNTER_COUNT]))
    }

    pub(crate) fn note_dropped_interrupt(&self) {
        self.dropped_interrupts
            .lock(|c| c.set(c.get().saturating_add(1)));
    }
}

/// Channels used by the firmware
pub static CHANNELS: Channels = Channels::new();
