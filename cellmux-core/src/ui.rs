//! Display/UI surface
//!
//! The UI reads immutable snapshots and changes state only through
//! [`UiCommand`]. Scheduler internals are never exposed.

use crate::config::{BatteryType, SlotId, SLOT_COUNT};
use crate::slots::{Step, Threshold};

#[cfg(feature = "serde")]
use serde::Serialize;

/// One slot as shown on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SlotSnapshot {
    pub id: SlotId,
    pub enabled: bool,
    pub power_good: bool,
    pub millivolts: u16,
    pub battery_type: BatteryType,
    /// Estimated charge level (0..=100)
    pub level_percent: u8,
    pub charge_mah: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ChargerSnapshot {
    pub enabled: bool,
    pub standby: bool,
    pub charging: bool,
    pub millivolts: u16,
    pub charge_mah: i32,
}

/// Everything the display shows
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Snapshot {
    pub slots: [SlotSnapshot; SLOT_COUNT],
    pub charger: ChargerSnapshot,
}

impl Snapshot {
    pub fn slot(&self, id: SlotId) -> &SlotSnapshot {
        &self.slots[id.index()]
    }
}

/// State change requested from the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UiCommand {
    SetSlotEnabled { slot: SlotId, enabled: bool },
    /// Select the next/previous battery type the slot allows
    CycleBatteryType { slot: SlotId, step: Step },
    AdjustThreshold {
        slot: SlotId,
        threshold: Threshold,
        delta_mv: i16,
    },
}
