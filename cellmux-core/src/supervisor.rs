//! Supervisory checks
//!
//! Run from a low-rate loop. Disables slots that have run flat and queues a
//! PWM recompute whenever the slots no longer match what is programmed.

use crate::config::SLOTS;
use crate::pwm::active_mask;
use crate::sampling::AnalogSampler;
use crate::slots::SlotManager;
use crate::work::{Work, WorkQueue};

/// What one supervisory pass found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Supervision {
    /// Slots cut off below their minimum voltage, by slot index
    pub depleted: u16,
    /// PWM recompute queued
    pub reschedule: bool,
}

/// One supervisory pass
///
/// A slot is depleted when its last sample is non-zero and below the
/// minimum of its battery type. A zero reading means "not sampled yet or
/// failed" and never cuts a slot off.
pub fn supervise(
    slots: &mut SlotManager,
    sampler: &AnalogSampler,
    programmed_mask: u8,
    queue: &mut WorkQueue,
) -> Supervision {
    let mut result = Supervision::default();

    for cfg in SLOTS.iter() {
        let slot = slots.slot_mut(cfg.id);
        if !slot.enabled {
            continue;
        }
        let mv = sampler.millivolts(cfg.voltage);
        if mv > 0 && mv < slot.battery_type.min_mv {
            slot.enabled = false;
            result.depleted |= 1 << cfg.id.index();
            queue.push(Work::UpdateLeds(cfg.id));
        }
    }

    if result.depleted != 0 || active_mask(slots) != programmed_mask {
        result.reschedule = queue.push(Work::ReschedulePwm);
    }
    result
}
