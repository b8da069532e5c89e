//! Charger output
//!
//! The charger reports two active-low status lines. Its output is shut
//! down whenever it is in standby or not charging; the status LEDs mirror
//! the lines.

use cellmux_hal::DigitalPorts;

use crate::config::PinId;
use crate::error::Error;
use crate::io::IoCache;
use crate::slots::Transition;
use crate::work::{Work, WorkQueue};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargerState {
    pub standby: bool,
    pub charging: bool,
    /// Output switched on
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Charger {
    state: ChargerState,
}

impl Charger {
    pub const fn new() -> Self {
        Self {
            state: ChargerState {
                standby: false,
                charging: false,
                enabled: false,
            },
        }
    }

    pub fn state(&self) -> ChargerState {
        self.state
    }

    /// Handle a status line change
    ///
    /// Samples both lines fresh, updates the enabled state and queues the
    /// output update.
    pub fn on_status<H: DigitalPorts>(
        &mut self,
        io: &mut IoCache,
        hw: &mut H,
        now_ms: u64,
        queue: &mut WorkQueue,
    ) -> Result<Transition, Error> {
        let standby = io.read_fresh(hw, PinId::Standby, now_ms)?;
        let charging = io.read(hw, PinId::Charging, now_ms)?;
        let enabled = !standby && charging;

        let transition = match (self.state.enabled, enabled) {
            (false, true) => Transition::Enabled,
            (true, false) => Transition::Disabled,
            _ => Transition::Unchanged,
        };
        self.state = ChargerState {
            standby,
            charging,
            enabled,
        };
        queue.push(Work::UpdateChargerOutputs);
        Ok(transition)
    }

    /// Drive the shutdown line and status LEDs from the current state
    pub fn update_outputs<H: DigitalPorts>(
        &self,
        io: &mut IoCache,
        hw: &mut H,
        now_ms: u64,
    ) -> Result<(), Error> {
        let s = self.state;
        io.write(hw, PinId::ShutdownOut, !s.enabled, now_ms)?;
        io.write(hw, PinId::LedOutGreen, s.charging, now_ms)?;
        io.write(hw, PinId::LedOutRed, s.standby, now_ms)?;
        io.write(hw, PinId::LedActive, s.enabled, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHardware;

    fn status(hw: &mut MockHardware, standby: bool, charging: bool) {
        hw.set_logical(PinId::Standby, standby);
        hw.set_logical(PinId::Charging, charging);
    }

    #[test]
    fn test_charging_enables_output() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut queue = WorkQueue::new();
        let mut charger = Charger::new();

        status(&mut hw, false, true);
        let t = charger.on_status(&mut io, &mut hw, 0, &mut queue).unwrap();
        assert_eq!(t, Transition::Enabled);
        assert!(charger.state().enabled);
        assert_eq!(queue.pop(), Some(Work::UpdateChargerOutputs));
        // Outputs are deferred
        assert!(hw.writes.is_empty());

        charger.update_outputs(&mut io, &mut hw, 0).unwrap();
        assert!(!hw.logical(PinId::ShutdownOut));
        assert!(hw.logical(PinId::LedOutGreen));
        assert!(!hw.logical(PinId::LedOutRed));
        assert!(hw.logical(PinId::LedActive));
    }

    #[test]
    fn test_standby_shuts_down() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut queue = WorkQueue::new();
        let mut charger = Charger::new();

        status(&mut hw, false, true);
        charger.on_status(&mut io, &mut hw, 0, &mut queue).unwrap();

        // Second edge inside the debounce window still sees the new level
        status(&mut hw, true, true);
        let t = charger.on_status(&mut io, &mut hw, 10, &mut queue).unwrap();
        assert_eq!(t, Transition::Disabled);

        charger.update_outputs(&mut io, &mut hw, 10).unwrap();
        assert!(hw.logical(PinId::ShutdownOut));
        assert!(hw.logical(PinId::LedOutRed));
        assert!(!hw.logical(PinId::LedActive));
    }

    #[test]
    fn test_idle_is_unchanged() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut queue = WorkQueue::new();
        let mut charger = Charger::new();

        status(&mut hw, false, false);
        let t = charger.on_status(&mut io, &mut hw, 0, &mut queue).unwrap();
        assert_eq!(t, Transition::Unchanged);
        assert!(!charger.state().enabled);
    }
}
