//! Test doubles shared by the unit tests

extern crate std;

use core::cell::Cell;
use std::vec::Vec;

use cellmux_hal::{
    AdcId, AnalogConverters, Clock, DigitalPorts, PortId, PwmController, PwmDuty, PwmTarget,
    ADC_CHANNELS,
};

use crate::config::{PinId, ADC_COUNT, PORT_COUNT};

/// Recording board double
///
/// Port levels are physical; writes land in the same register a read
/// returns, like a real expander's input register mirroring its outputs.
#[derive(Default)]
pub struct MockHardware {
    pub levels: [u32; PORT_COUNT],
    pub port_reads: [u32; PORT_COUNT],
    pub writes: Vec<(PortId, u8, bool)>,
    pub fail_port: Option<PortId>,
    pub adc_codes: [[u16; ADC_CHANNELS]; ADC_COUNT],
    pub conversions: Vec<(AdcId, u8)>,
    pub fail_adc: Option<AdcId>,
    pub pwm: Vec<(PwmTarget, PwmDuty)>,
    /// Fail the PWM call with this index (0-based, counted over all calls)
    pub fail_pwm_call: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a pin's physical level from its logical value
    pub fn set_logical(&mut self, pin: PinId, value: bool) {
        let cfg = pin.config();
        let high = value != cfg.active_low;
        let port = &mut self.levels[cfg.port.0 as usize];
        if high {
            *port |= 1 << cfg.pin;
        } else {
            *port &= !(1 << cfg.pin);
        }
    }

    /// Logical value currently present on a pin
    pub fn logical(&self, pin: PinId) -> bool {
        let cfg = pin.config();
        let high = self.levels[cfg.port.0 as usize] & (1 << cfg.pin) != 0;
        high != cfg.active_low
    }

    pub fn total_port_reads(&self) -> u32 {
        self.port_reads.iter().sum()
    }

    /// Logical values written to `pin`, oldest first
    pub fn writes_to(&self, pin: PinId) -> Vec<bool> {
        let cfg = pin.config();
        self.writes
            .iter()
            .filter(|(port, bit, _)| *port == cfg.port && *bit == cfg.pin)
            .map(|(_, _, high)| *high != cfg.active_low)
            .collect()
    }
}

impl DigitalPorts for MockHardware {
    type Error = MockError;

    fn write_pin(&mut self, port: PortId, pin: u8, high: bool) -> Result<(), MockError> {
        if self.fail_port == Some(port) {
            return Err(MockError);
        }
        self.writes.push((port, pin, high));
        let level = &mut self.levels[port.0 as usize];
        if high {
            *level |= 1 << pin;
        } else {
            *level &= !(1 << pin);
        }
        Ok(())
    }

    fn read_port(&mut self, port: PortId) -> Result<u32, MockError> {
        if self.fail_port == Some(port) {
            return Err(MockError);
        }
        self.port_reads[port.0 as usize] += 1;
        Ok(self.levels[port.0 as usize])
    }
}

impl AnalogConverters for MockHardware {
    type Error = MockError;

    fn convert(
        &mut self,
        device: AdcId,
        channel_mask: u8,
        buffer: &mut [u16; ADC_CHANNELS],
    ) -> Result<(), MockError> {
        if self.fail_adc == Some(device) {
            return Err(MockError);
        }
        self.conversions.push((device, channel_mask));
        for (ch, slot) in buffer.iter_mut().enumerate() {
            if channel_mask & (1 << ch) != 0 {
                *slot = self.adc_codes[device.0 as usize][ch];
            }
        }
        Ok(())
    }
}

impl PwmController for MockHardware {
    type Error = MockError;

    fn set_duty(&mut self, target: PwmTarget, duty: PwmDuty) -> Result<(), MockError> {
        let index = self.pwm.len();
        self.pwm.push((target, duty));
        if self.fail_pwm_call == Some(index) {
            return Err(MockError);
        }
        Ok(())
    }
}

/// Manually advanced clock
#[derive(Default)]
pub struct MockClock {
    now: Cell<u64>,
}

impl MockClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now: Cell::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
