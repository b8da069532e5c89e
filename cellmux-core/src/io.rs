//! Debounced digital I/O cache
//!
//! Every pin keeps its last known logical value (active-high regardless of
//! wiring polarity) and an expiry time. Reads inside the debounce window are
//! served from the cache; an expired read refreshes the whole port in one
//! transaction.

use cellmux_hal::DigitalPorts;

use crate::config::{PinId, DEBOUNCE_MS, PINS, PIN_COUNT};
use crate::error::{Device, Error};

#[derive(Debug, Clone, Copy, Default)]
struct PinState {
    value: bool,
    /// Cached value is valid while `now < expires_at`
    expires_at: u64,
}

/// Cached view of every pin in [`PINS`]
#[derive(Debug, Clone)]
pub struct IoCache {
    pins: [PinState; PIN_COUNT],
}

impl Default for IoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl IoCache {
    /// Create a cache with every entry expired
    pub const fn new() -> Self {
        Self {
            pins: [PinState {
                value: false,
                expires_at: 0,
            }; PIN_COUNT],
        }
    }

    /// Drive an output pin to a logical level
    ///
    /// Writing an input pin is a no-op.
    pub fn write<H: DigitalPorts>(
        &mut self,
        hw: &mut H,
        pin: PinId,
        value: bool,
        now_ms: u64,
    ) -> Result<(), Error> {
        let cfg = pin.config();
        if !cfg.is_output() {
            return Ok(());
        }

        let level = value != cfg.active_low;
        hw.write_pin(cfg.port, cfg.pin, level)
            .map_err(|_| Error::HardwareAccess(Device::Port(cfg.port)))?;

        let state = &mut self.pins[pin.index()];
        state.value = value;
        state.expires_at = now_ms + DEBOUNCE_MS;
        Ok(())
    }

    /// Read a pin's logical value
    pub fn read<H: DigitalPorts>(
        &mut self,
        hw: &mut H,
        pin: PinId,
        now_ms: u64,
    ) -> Result<bool, Error> {
        let state = self.pins[pin.index()];
        if now_ms < state.expires_at {
            return Ok(state.value);
        }

        self.read_fresh(hw, pin, now_ms)
    }

    /// Read a pin from hardware even if its cached value is still valid
    pub fn read_fresh<H: DigitalPorts>(
        &mut self,
        hw: &mut H,
        pin: PinId,
        now_ms: u64,
    ) -> Result<bool, Error> {
        self.refresh(hw, pin, now_ms)?;
        Ok(self.pins[pin.index()].value)
    }

    /// Last cached value, without touching hardware
    pub fn cached(&self, pin: PinId) -> bool {
        self.pins[pin.index()].value
    }

    /// Batch-read the port holding `pin` and refresh every pin on it
    fn refresh<H: DigitalPorts>(
        &mut self,
        hw: &mut H,
        pin: PinId,
        now_ms: u64,
    ) -> Result<(), Error> {
        let port = pin.port();
        let raw = hw
            .read_port(port)
            .map_err(|_| Error::HardwareAccess(Device::Port(port)))?;
        let expires_at = now_ms + DEBOUNCE_MS;

        let mut first = pin.index();
        while first > 0 && PINS[first - 1].port == port {
            first -= 1;
        }
        let mut last = pin.index();
        while last + 1 < PIN_COUNT && PINS[last + 1].port == port {
            last += 1;
        }

        for (cfg, state) in PINS[first..=last]
            .iter()
            .zip(self.pins[first..=last].iter_mut())
        {
            let high = raw & (1 << cfg.pin) != 0;
            state.value = high != cfg.active_low;
            state.expires_at = expires_at;
        }
        Ok(())
    }
}
