//! Battery slot manager
//!
//! Tracks per-slot selection, power-good and enabled state. The manager
//! never force-disables a slot on its own; dropping a slot that left the
//! active set is the PWM scheduler's decision.

pub mod selection;

pub use selection::{cycle, next_battery_type, Step};

use cellmux_hal::DigitalPorts;

use crate::config::batteries::first_allowed;
use crate::config::{BatteryType, PinId, SlotId, BATTERY_TYPES, PINS, SLOTS, SLOT_COUNT};
use crate::dispatch::{route, IrqRoute};
use crate::error::Error;
use crate::io::IoCache;
use crate::work::{Work, WorkQueue};

/// Runtime state of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatterySlot {
    pub power_good: bool,
    pub enabled: bool,
    /// Catalog index of the selected battery type
    pub type_index: u8,
    /// Selected type, with thresholds as adjusted at runtime
    pub battery_type: BatteryType,
}

/// Outcome of an enable/disable request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    Enabled,
    Disabled,
    Unchanged,
    /// Rejected: the pair sibling is enabled
    Ignored,
}

/// Which voltage threshold to adjust
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Threshold {
    Min,
    Max,
}

/// Slot that owns the device raising `pin`
///
/// The owner is the slot whose selector sits on the same device and is
/// currently asserted.
pub fn owner_of<H: DigitalPorts>(
    io: &mut IoCache,
    hw: &mut H,
    pin: PinId,
    now_ms: u64,
) -> Result<Option<SlotId>, Error> {
    let port = pin.port();
    for slot in SLOTS.iter() {
        if slot.select.port() == port && io.read(hw, slot.select, now_ms)? {
            return Ok(Some(slot.id));
        }
    }
    Ok(None)
}

/// Power-good input on the slot's device
pub fn power_good_pin(slot: SlotId) -> Option<PinId> {
    let port = slot.config().select.port();
    PINS.iter()
        .find(|pin| pin.port == port && route(pin.id) == Some(IrqRoute::PowerGood))
        .map(|pin| pin.id)
}

/// Estimated charge level in percent
///
/// The voltage is clamped to the type's window; a degenerate window reads 0.
pub fn level_percent(battery_type: &BatteryType, millivolts: u16) -> u8 {
    let (min, max) = (battery_type.min_mv as u32, battery_type.max_mv as u32);
    if max <= min {
        return 0;
    }
    let mv = (millivolts as u32).clamp(min, max);
    ((mv - min) * 100 / (max - min)) as u8
}

#[derive(Debug, Clone)]
pub struct SlotManager {
    slots: [BatterySlot; SLOT_COUNT],
}

impl Default for SlotManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotManager {
    /// All slots disabled, each on the first battery type it allows
    pub fn new() -> Self {
        let slots = core::array::from_fn(|i| {
            let type_index = first_allowed(SLOTS[i].allowed_types).unwrap_or(0);
            BatterySlot {
                power_good: false,
                enabled: false,
                type_index,
                battery_type: BATTERY_TYPES[type_index as usize],
            }
        });
        Self { slots }
    }

    pub fn slot(&self, id: SlotId) -> &BatterySlot {
        &self.slots[id.index()]
    }

    pub(crate) fn slot_mut(&mut self, id: SlotId) -> &mut BatterySlot {
        &mut self.slots[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &BatterySlot)> {
        SlotId::ALL.into_iter().zip(self.slots.iter())
    }

    /// Handle a power-good change on `pin`
    ///
    /// Runs in interrupt context: resolves the owning slot, records its
    /// power-good level and queues the LED and PWM follow-up. Returns the
    /// owner, or `None` if no selector on the device is asserted.
    pub fn on_power_good<H: DigitalPorts>(
        &mut self,
        io: &mut IoCache,
        hw: &mut H,
        pin: PinId,
        now_ms: u64,
        queue: &mut WorkQueue,
    ) -> Result<Option<SlotId>, Error> {
        let Some(owner) = owner_of(io, hw, pin, now_ms)? else {
            return Ok(None);
        };

        // The edge means the line moved; a cached level may predate it
        self.slots[owner.index()].power_good = io.read_fresh(hw, pin, now_ms)?;
        queue.push(Work::UpdateLeds(owner));
        queue.push(Work::ReschedulePwm);
        Ok(Some(owner))
    }

    /// Drive a slot's status LEDs
    ///
    /// Green while enabled and power-good, red while enabled without
    /// power-good, both off while disabled.
    pub fn update_leds<H: DigitalPorts>(
        &self,
        io: &mut IoCache,
        hw: &mut H,
        id: SlotId,
        now_ms: u64,
    ) -> Result<(), Error> {
        let slot = self.slot(id);
        let cfg = id.config();
        io.write(hw, cfg.green, slot.enabled && slot.power_good, now_ms)?;
        io.write(hw, cfg.red, slot.enabled && !slot.power_good, now_ms)
    }

    /// Enable or disable a slot
    ///
    /// Enabling connects the slot by asserting its selector and releasing
    /// the sibling's, then samples the device's power-good line. A slot
    /// cannot be enabled while its sibling is.
    pub fn set_enabled<H: DigitalPorts>(
        &mut self,
        io: &mut IoCache,
        hw: &mut H,
        id: SlotId,
        enabled: bool,
        now_ms: u64,
    ) -> Result<Transition, Error> {
        if self.slot(id).enabled == enabled {
            return Ok(Transition::Unchanged);
        }
        if !enabled {
            self.slot_mut(id).enabled = false;
            return Ok(Transition::Disabled);
        }

        let sibling = id.sibling();
        if self.slot(sibling).enabled {
            return Ok(Transition::Ignored);
        }

        io.write(hw, sibling.config().select, false, now_ms)?;
        io.write(hw, id.config().select, true, now_ms)?;
        if let Some(pin) = power_good_pin(id) {
            // Any cached level belongs to the previous selection
            self.slot_mut(id).power_good = io.read_fresh(hw, pin, now_ms)?;
        }

        self.slot_mut(id).enabled = true;
        Ok(Transition::Enabled)
    }

    /// Step to the next or previous battery type the slot allows
    ///
    /// Loads the new type's catalog thresholds. Returns the new catalog
    /// index, or `None` if the selection did not change.
    pub fn cycle_type(&mut self, id: SlotId, step: Step) -> Option<u8> {
        let slot = &mut self.slots[id.index()];
        let next = next_battery_type(id.config().allowed_types, slot.type_index, step)?;
        if next == slot.type_index {
            return None;
        }
        slot.type_index = next;
        slot.battery_type = BATTERY_TYPES[next as usize];
        Some(next)
    }

    /// Move one voltage threshold by `delta_mv`
    ///
    /// Ignored if the result would leave the u16 range or collapse the
    /// window (min must stay below max).
    pub fn adjust_threshold(&mut self, id: SlotId, threshold: Threshold, delta_mv: i32) -> bool {
        let battery = &mut self.slots[id.index()].battery_type;
        let current = match threshold {
            Threshold::Min => battery.min_mv,
            Threshold::Max => battery.max_mv,
        };
        let Ok(value) = u16::try_from(current as i32 + delta_mv) else {
            return false;
        };
        let (min, max) = match threshold {
            Threshold::Min => (value, battery.max_mv),
            Threshold::Max => (battery.min_mv, value),
        };
        if min >= max {
            return false;
        }
        battery.min_mv = min;
        battery.max_mv = max;
        true
    }

    pub fn level_percent(&self, id: SlotId, millivolts: u16) -> u8 {
        level_percent(&self.slot(id).battery_type, millivolts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::batteries::{ALKALINE_AA, NIMH_AA, ZINC_CARBON_AA};
    use crate::testing::MockHardware;

    fn select(hw: &mut MockHardware, slot: SlotId) {
        hw.set_logical(slot.config().select, true);
        hw.set_logical(slot.sibling().config().select, false);
    }

    #[test]
    fn test_new_uses_first_allowed_type() {
        let slots = SlotManager::new();
        let slot = slots.slot(SlotId::Batt1a);
        assert_eq!(slot.type_index, ZINC_CARBON_AA);
        assert!(!slot.enabled);
        assert!(!slot.power_good);
    }

    #[test]
    fn test_owner_of_follows_selector() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();

        select(&mut hw, SlotId::Batt2b);
        assert_eq!(
            owner_of(&mut io, &mut hw, PinId::PowerGood2, 0).unwrap(),
            Some(SlotId::Batt2b)
        );

        // Nothing selected on pair 3
        assert_eq!(owner_of(&mut io, &mut hw, PinId::PowerGood3, 0).unwrap(), None);
    }

    #[test]
    fn test_power_good_updates_owner_and_queues_work() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut slots = SlotManager::new();
        let mut queue = WorkQueue::new();

        select(&mut hw, SlotId::Batt1a);
        hw.set_logical(PinId::PowerGood1, true);

        let owner = slots
            .on_power_good(&mut io, &mut hw, PinId::PowerGood1, 0, &mut queue)
            .unwrap();
        assert_eq!(owner, Some(SlotId::Batt1a));
        assert!(slots.slot(SlotId::Batt1a).power_good);
        assert!(!slots.slot(SlotId::Batt1b).power_good);

        assert_eq!(queue.pop(), Some(Work::UpdateLeds(SlotId::Batt1a)));
        assert_eq!(queue.pop(), Some(Work::ReschedulePwm));
        // LED and PWM work only queued, never run inline
        assert!(hw.pwm.is_empty());
        assert!(hw.writes.is_empty());
    }

    #[test]
    fn test_power_good_without_owner() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut slots = SlotManager::new();
        let mut queue = WorkQueue::new();

        let owner = slots
            .on_power_good(&mut io, &mut hw, PinId::PowerGood4, 0, &mut queue)
            .unwrap();
        assert_eq!(owner, None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_power_good_read_failure() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut slots = SlotManager::new();
        let mut queue = WorkQueue::new();
        hw.fail_port = Some(PinId::PowerGood1.port());

        assert!(slots
            .on_power_good(&mut io, &mut hw, PinId::PowerGood1, 0, &mut queue)
            .is_err());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_led_states() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut slots = SlotManager::new();
        let id = SlotId::Batt3a;

        let cases = [
            (false, false, false, false),
            (false, true, false, false),
            (true, false, false, true),
            (true, true, true, false),
        ];
        for (enabled, power_good, green, red) in cases {
            let slot = slots.slot_mut(id);
            slot.enabled = enabled;
            slot.power_good = power_good;
            slots.update_leds(&mut io, &mut hw, id, 0).unwrap();
            assert_eq!(hw.logical(PinId::Led3aGreen), green);
            assert_eq!(hw.logical(PinId::Led3aRed), red);
        }
    }

    #[test]
    fn test_enable_selects_slot() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut slots = SlotManager::new();
        hw.set_logical(PinId::Select4a, true);
        hw.set_logical(PinId::PowerGood4, true);

        let t = slots
            .set_enabled(&mut io, &mut hw, SlotId::Batt4b, true, 0)
            .unwrap();
        assert_eq!(t, Transition::Enabled);
        assert!(hw.logical(PinId::Select4b));
        assert!(!hw.logical(PinId::Select4a));
        assert!(slots.slot(SlotId::Batt4b).enabled);
        assert!(slots.slot(SlotId::Batt4b).power_good);
    }

    #[test]
    fn test_enable_rejected_while_sibling_enabled() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut slots = SlotManager::new();

        slots
            .set_enabled(&mut io, &mut hw, SlotId::Batt1a, true, 0)
            .unwrap();
        let writes = hw.writes.len();

        let t = slots
            .set_enabled(&mut io, &mut hw, SlotId::Batt1b, true, 0)
            .unwrap();
        assert_eq!(t, Transition::Ignored);
        assert!(!slots.slot(SlotId::Batt1b).enabled);
        assert_eq!(hw.writes.len(), writes);
    }

    #[test]
    fn test_enable_write_failure_leaves_slot_disabled() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut slots = SlotManager::new();
        hw.fail_port = Some(PinId::Select2a.port());

        assert!(slots
            .set_enabled(&mut io, &mut hw, SlotId::Batt2a, true, 0)
            .is_err());
        assert!(!slots.slot(SlotId::Batt2a).enabled);
    }

    #[test]
    fn test_disable_and_unchanged() {
        let mut hw = MockHardware::new();
        let mut io = IoCache::new();
        let mut slots = SlotManager::new();

        assert_eq!(
            slots
                .set_enabled(&mut io, &mut hw, SlotId::Batt5a, false, 0)
                .unwrap(),
            Transition::Unchanged
        );
        slots
            .set_enabled(&mut io, &mut hw, SlotId::Batt5a, true, 0)
            .unwrap();
        assert_eq!(
            slots
                .set_enabled(&mut io, &mut hw, SlotId::Batt5a, false, 0)
                .unwrap(),
            Transition::Disabled
        );
        // Selector stays where it was
        assert!(hw.logical(PinId::Select5a));
    }

    #[test]
    fn test_cycle_type_loads_thresholds() {
        let mut slots = SlotManager::new();

        assert_eq!(slots.cycle_type(SlotId::Batt1a, Step::Next), Some(ALKALINE_AA));
        assert_eq!(
            slots.slot(SlotId::Batt1a).battery_type,
            BATTERY_TYPES[ALKALINE_AA as usize]
        );
        assert_eq!(slots.cycle_type(SlotId::Batt1a, Step::Previous), Some(ZINC_CARBON_AA));
        // Wraps within the AA family
        assert_eq!(slots.cycle_type(SlotId::Batt1a, Step::Previous), Some(NIMH_AA));
    }

    #[test]
    fn test_cycle_single_type_slot() {
        let mut slots = SlotManager::new();
        assert_eq!(slots.cycle_type(SlotId::Batt3b, Step::Next), None);
    }

    #[test]
    fn test_adjust_threshold() {
        let mut slots = SlotManager::new();
        let id = SlotId::Batt1a;
        let original = slots.slot(id).battery_type;

        assert!(slots.adjust_threshold(id, Threshold::Min, 100));
        assert_eq!(slots.slot(id).battery_type.min_mv, original.min_mv + 100);

        assert!(slots.adjust_threshold(id, Threshold::Max, -50));
        assert_eq!(slots.slot(id).battery_type.max_mv, original.max_mv - 50);

        // Would cross the other threshold
        let gap = (original.max_mv - original.min_mv) as i32;
        assert!(!slots.adjust_threshold(id, Threshold::Min, gap));
        // Would underflow
        assert!(!slots.adjust_threshold(id, Threshold::Min, -100_000));
        assert_eq!(slots.slot(id).battery_type.min_mv, original.min_mv + 100);
    }

    #[test]
    fn test_level_percent() {
        let battery = BatteryType {
            name: "test",
            max_mv: 1500,
            min_mv: 1000,
        };
        assert_eq!(level_percent(&battery, 900), 0);
        assert_eq!(level_percent(&battery, 1250), 50);
        assert_eq!(level_percent(&battery, 1600), 100);

        let flat = BatteryType {
            name: "flat",
            max_mv: 1000,
            min_mv: 1000,
        };
        assert_eq!(level_percent(&flat, 1000), 0);
    }

    #[test]
    fn test_power_good_pin() {
        assert_eq!(power_good_pin(SlotId::Batt1b), Some(PinId::PowerGood1));
        assert_eq!(power_good_pin(SlotId::Batt5a), Some(PinId::PowerGood5));
    }
}
