//! Controller registry
//!
//! Owns every piece of runtime state: the pin cache, analog readings,
//! charge counters, slots, charger, PWM mask, work queue and timers. It is
//! built once at boot and driven from a single context, so no state is
//! ever shared between two writers.

use cellmux_hal::{Clock, Hardware, PwmDuty, PwmTarget};

use crate::charge::{ChargeAccumulator, ChargeCounter};
use crate::charger::Charger;
use crate::config::{self, AnalogInput, CounterId, PinId, SlotId, COUNTERS, PINS, SLOTS};
use crate::dispatch::{route, Button, IrqRoute};
use crate::error::{ConfigError, Device, Error};
use crate::io::IoCache;
use crate::pwm::PwmScheduler;
use crate::sampling::AnalogSampler;
use crate::slots::{SlotManager, Transition};
use crate::supervisor::{self, Supervision};
use crate::ui::{ChargerSnapshot, SlotSnapshot, Snapshot, UiCommand};
use crate::work::{Timers, Work, WorkQueue};

/// Something the UI side should hear about after a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice {
    /// State changed; publish a fresh snapshot
    Refresh,
    Button(Button),
}

/// A work item the controller just ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ran {
    pub work: Work,
    pub result: Result<Option<Notice>, Error>,
}

#[derive(Debug, Clone, Default)]
pub struct Controller {
    io: IoCache,
    sampler: AnalogSampler,
    charge: ChargeAccumulator,
    slots: SlotManager,
    charger: Charger,
    pwm: PwmScheduler,
    queue: WorkQueue,
    timers: Timers,
}

/// Report startup hardware failures as binding errors
fn binding(e: Error) -> Error {
    match e {
        Error::HardwareAccess(device) => ConfigError::Binding(device).into(),
        other => other,
    }
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the board to a safe idle state
    ///
    /// Validates the static tables, shuts down every charge monitor and the
    /// charger, clears all other outputs, turns the PWM off and arms the
    /// periodic jobs. Any failure here is fatal.
    pub fn init<H: Hardware>(&mut self, hw: &mut H, now_ms: u64) -> Result<(), Error> {
        config::validate()?;

        for pin in PINS.iter().filter(|p| p.is_output()) {
            let shutdown = COUNTERS.iter().any(|c| c.shutdown == pin.id);
            self.io
                .write(hw, pin.id, shutdown, now_ms)
                .map_err(binding)?;
        }
        hw.set_duty(PwmTarget::All, PwmDuty::FullOff)
            .map_err(|_| ConfigError::Binding(Device::Pwm))?;

        self.timers.start(now_ms);
        Ok(())
    }

    /// Run the inline handler for an interrupt pin
    ///
    /// Only bounded bookkeeping happens here; follow-up work is queued.
    /// Returns the route taken, or `None` for a pin with no handler.
    pub fn handle_interrupt<H: Hardware>(
        &mut self,
        hw: &mut H,
        pin: PinId,
        now_ms: u64,
    ) -> Result<Option<IrqRoute>, Error> {
        let Some(irq) = route(pin) else {
            return Ok(None);
        };

        match irq {
            IrqRoute::ChargeEdge(counter) => {
                self.charge.on_edge(&mut self.io, hw, counter, now_ms)?;
            }
            IrqRoute::PowerGood => {
                self.slots
                    .on_power_good(&mut self.io, hw, pin, now_ms, &mut self.queue)?;
            }
            IrqRoute::Charger => {
                let transition = self
                    .charger
                    .on_status(&mut self.io, hw, now_ms, &mut self.queue)?;
                if transition == Transition::Enabled {
                    self.charge.reset(CounterId::Charger);
                }
                self.queue.push(Work::RefreshDisplay);
            }
            IrqRoute::Button(button) => {
                self.queue.push(Work::Button(button));
            }
        }
        Ok(Some(irq))
    }

    /// Account a batch of charge edges collected outside the worker
    pub fn apply_charge_edges<H: Hardware>(
        &mut self,
        hw: &mut H,
        counter: CounterId,
        edges: u32,
        now_ms: u64,
    ) -> Result<i32, Error> {
        self.charge.on_edges(&mut self.io, hw, counter, edges, now_ms)
    }

    pub fn charge_counter(&self, counter: CounterId) -> ChargeCounter {
        self.charge.counter(counter)
    }

    /// Queue every periodic job that is due
    pub fn poll_timers(&mut self, now_ms: u64) {
        self.timers.queue_due(now_ms, &mut self.queue);
    }

    /// When the next periodic job falls due
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn has_pending_work(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Work items lost to a full queue
    pub fn dropped_work(&self) -> u32 {
        self.queue.dropped()
    }

    /// Run the oldest queued work item
    ///
    /// Periodic jobs are re-armed from the time they finish, whatever
    /// their outcome.
    pub fn run_next<H: Hardware, C: Clock>(&mut self, hw: &mut H, clock: &C) -> Option<Ran> {
        let work = self.queue.pop()?;
        let result = self.execute(hw, work, clock.now_ms());
        self.timers.completed(work, clock.now_ms());
        Some(Ran { work, result })
    }

    fn execute<H: Hardware>(
        &mut self,
        hw: &mut H,
        work: Work,
        now_ms: u64,
    ) -> Result<Option<Notice>, Error> {
        match work {
            Work::UpdateLeds(slot) => {
                self.slots.update_leds(&mut self.io, hw, slot, now_ms)?;
            }
            Work::ReschedulePwm => {
                let outcome = self
                    .pwm
                    .reschedule(&mut self.slots, &mut self.io, hw, now_ms)?;
                for id in SlotId::ALL {
                    if outcome.disabled & (1 << id.index()) != 0 {
                        self.queue.push(Work::UpdateLeds(id));
                    }
                }
                if outcome.reprogrammed || outcome.disabled != 0 {
                    self.queue.push(Work::RefreshDisplay);
                }
            }
            Work::UpdateChargerOutputs => {
                self.charger.update_outputs(&mut self.io, hw, now_ms)?;
            }
            Work::SampleAnalog(adc) => {
                self.sampler.sample(hw, adc)?;
                self.queue.push(Work::RefreshDisplay);
            }
            Work::IntegrateCharge(counter) => {
                self.charge
                    .integrate(&mut self.io, hw, counter, now_ms)?;
            }
            Work::RefreshDisplay => return Ok(Some(Notice::Refresh)),
            Work::Button(button) => return Ok(Some(Notice::Button(button))),
        }
        Ok(None)
    }

    /// Periodic safety pass: depletion cutoff and mask drift
    pub fn supervise(&mut self) -> Supervision {
        supervisor::supervise(
            &mut self.slots,
            &self.sampler,
            self.pwm.programmed_mask(),
            &mut self.queue,
        )
    }

    /// Apply a UI request
    ///
    /// Enabling a slot zeroes its charge counter. Requests that do not
    /// change anything are ignored.
    pub fn apply<H: Hardware>(
        &mut self,
        hw: &mut H,
        command: UiCommand,
        now_ms: u64,
    ) -> Result<(), Error> {
        let changed = match command {
            UiCommand::SetSlotEnabled { slot, enabled } => {
                let transition = self
                    .slots
                    .set_enabled(&mut self.io, hw, slot, enabled, now_ms)?;
                match transition {
                    Transition::Enabled | Transition::Disabled => {
                        if transition == Transition::Enabled {
                            self.charge.reset(slot.config().counter);
                        }
                        self.queue.push(Work::UpdateLeds(slot));
                        self.queue.push(Work::ReschedulePwm);
                        true
                    }
                    Transition::Unchanged | Transition::Ignored => false,
                }
            }
            UiCommand::CycleBatteryType { slot, step } => {
                self.slots.cycle_type(slot, step).is_some()
            }
            UiCommand::AdjustThreshold {
                slot,
                threshold,
                delta_mv,
            } => self
                .slots
                .adjust_threshold(slot, threshold, delta_mv as i32),
        };
        if changed {
            self.queue.push(Work::RefreshDisplay);
        }
        Ok(())
    }

    /// Read-only view for the display
    pub fn snapshot(&self) -> Snapshot {
        let slots = core::array::from_fn(|i| {
            let cfg = &SLOTS[i];
            let slot = self.slots.slot(cfg.id);
            let millivolts = self.sampler.millivolts(cfg.voltage);
            SlotSnapshot {
                id: cfg.id,
                enabled: slot.enabled,
                power_good: slot.power_good,
                millivolts,
                battery_type: slot.battery_type,
                level_percent: self.slots.level_percent(cfg.id, millivolts),
                charge_mah: self.charge.counter(cfg.counter).mah,
            }
        });

        let charger = self.charger.state();
        Snapshot {
            slots,
            charger: ChargerSnapshot {
                enabled: charger.enabled,
                standby: charger.standby,
                charging: charger.charging,
                millivolts: self.sampler.millivolts(AnalogInput::Output),
                charge_mah: self.charge.counter(CounterId::Charger).mah,
            },
        }
    }
}
