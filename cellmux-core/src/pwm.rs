//! PWM time-division scheduler
//!
//! Every slot that is both power-good and enabled gets an equal slice of
//! the PWM period on the shared output rail. Adjacent slices are separated
//! by deadspace so two channels are never on during a switch-over.

use cellmux_hal::{DigitalPorts, PwmController, PwmDuty, PwmTarget};

use crate::config::{PWM_CHANNEL_COUNT, SLOTS};
use crate::error::{Device, Error};
use crate::io::IoCache;
use crate::slots::SlotManager;

/// Ticks in one PWM period
pub const PWM_PERIOD: u16 = 4096;

/// Idle ticks at each edge of a slice
pub const DEADSPACE: u16 = 2;

const CHANNEL_MASK: u8 = (1 << PWM_CHANNEL_COUNT) - 1;

/// Channel windows for one active mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Schedule {
    pub mask: u8,
    pub count: u8,
    /// Raw slice length, 0 when nothing is active
    pub timeslot: u16,
    /// Duty per channel, indexed by channel number
    pub windows: [PwmDuty; PWM_CHANNEL_COUNT],
}

/// Lay out the active channels of `mask` across one period
///
/// Active channels take consecutive slices in channel order, packed by
/// rank so a sparse mask still fits inside one period. Each slice
/// starts `DEADSPACE` ticks late and ends `2 * DEADSPACE` ticks early.
pub fn compute_schedule(mask: u8) -> Schedule {
    let mask = mask & CHANNEL_MASK;
    let count = mask.count_ones() as u16;
    let timeslot = if count > 0 { PWM_PERIOD / count } else { 0 };

    let mut windows = [PwmDuty::FullOff; PWM_CHANNEL_COUNT];
    let mut position = 0;
    for (channel, window) in windows.iter_mut().enumerate() {
        if mask & (1 << channel) == 0 {
            continue;
        }
        *window = PwmDuty::Window {
            on: position * timeslot + DEADSPACE,
            off: (position + 1) * timeslot - 2 * DEADSPACE,
        };
        position += 1;
    }

    Schedule {
        mask,
        count: count as u8,
        timeslot,
        windows,
    }
}

/// Channels whose slots are power-good and enabled
pub fn active_mask(slots: &SlotManager) -> u8 {
    slots
        .iter()
        .filter(|(_, slot)| slot.power_good && slot.enabled)
        .fold(0, |mask, (id, _)| mask | (1 << id.config().channel))
}

/// What one scheduler pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outcome {
    /// Active mask after the pass
    pub mask: u8,
    /// Slots disabled because their channel left the active set, by slot index
    pub disabled: u16,
    /// Whether the PWM controller was reprogrammed
    pub reprogrammed: bool,
}

/// Owner of the programmed channel mask
#[derive(Debug, Clone, Default)]
pub struct PwmScheduler {
    programmed: u8,
}

impl PwmScheduler {
    pub const fn new() -> Self {
        Self { programmed: 0 }
    }

    /// Mask last written to the PWM controller
    pub fn programmed_mask(&self) -> u8 {
        self.programmed
    }

    /// Recompute the active set and reprogram the PWM if it changed
    ///
    /// Slots whose channel dropped out of the active set are disabled, and
    /// every shutdown line is driven from its slots' enabled flags whether
    /// or not the mask changed. A failed channel write abandons the rest of
    /// the pass; the stored mask is not rolled back.
    pub fn reschedule<H: DigitalPorts + PwmController>(
        &mut self,
        slots: &mut SlotManager,
        io: &mut IoCache,
        hw: &mut H,
        now_ms: u64,
    ) -> Result<Outcome, Error> {
        let candidate = active_mask(slots);

        let dropped = self.programmed & !candidate;
        let mut disabled = 0u16;
        for cfg in SLOTS.iter() {
            let slot = slots.slot_mut(cfg.id);
            if dropped & (1 << cfg.channel) != 0 && slot.enabled {
                slot.enabled = false;
                disabled |= 1 << cfg.id.index();
            }
        }

        drive_shutdowns(slots, io, hw, now_ms)?;

        let mut outcome = Outcome {
            mask: candidate,
            disabled,
            reprogrammed: false,
        };
        if candidate == self.programmed {
            return Ok(outcome);
        }

        self.programmed = candidate;
        let schedule = compute_schedule(candidate);
        program(hw, &schedule)?;
        outcome.reprogrammed = true;
        Ok(outcome)
    }
}

/// Drive each shutdown line to "no slot on it is enabled"
fn drive_shutdowns<H: DigitalPorts>(
    slots: &SlotManager,
    io: &mut IoCache,
    hw: &mut H,
    now_ms: u64,
) -> Result<(), Error> {
    for (index, cfg) in SLOTS.iter().enumerate() {
        if SLOTS[..index].iter().any(|s| s.shutdown == cfg.shutdown) {
            continue;
        }
        let enabled = SLOTS[index..]
            .iter()
            .filter(|s| s.shutdown == cfg.shutdown)
            .any(|s| slots.slot(s.id).enabled);
        io.write(hw, cfg.shutdown, !enabled, now_ms)?;
    }
    Ok(())
}

fn program<H: PwmController>(hw: &mut H, schedule: &Schedule) -> Result<(), Error> {
    let pwm_err = |_| Error::HardwareAccess(Device::Pwm);

    hw.set_duty(PwmTarget::All, PwmDuty::FullOff).map_err(pwm_err)?;
    for (channel, duty) in schedule.windows.iter().enumerate() {
        hw.set_duty(PwmTarget::Channel(channel as u8), *duty)
            .map_err(pwm_err)?;
    }
    Ok(())
}
