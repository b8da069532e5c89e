//! Static board configuration
//!
//! All tables are compile-time data. Runtime state lives in the components
//! that own it; these tables only describe wiring and limits.

pub mod analog;
pub mod batteries;
pub mod pins;
pub mod slots;

pub use analog::{AnalogConfig, AnalogInput, ADC_COUNT, ANALOG_INPUTS, ANALOG_INPUT_COUNT};
pub use batteries::{BatteryType, TypeMask, BATTERY_TYPES, BATTERY_TYPE_COUNT};
pub use pins::{Direction, PinConfig, PinId, Trigger, PINS, PIN_COUNT, PORT_COUNT, PORT_WIDTH};
pub use slots::{
    CounterConfig, CounterId, SlotConfig, SlotId, COUNTERS, COUNTER_COUNT, PWM_CHANNEL_COUNT,
    SLOTS, SLOT_COUNT,
};

use crate::error::ConfigError;

/// Debounce window for cached digital values (ms)
pub const DEBOUNCE_MS: u64 = 100;

/// Delay between analog sampling runs, measured from completion (ms)
pub const SAMPLE_PERIOD_MS: u64 = 1000;

/// Delay between charge integration runs, measured from completion (ms)
pub const INTEGRATE_PERIOD_MS: u64 = 1000;

/// Supervisory loop period (ms)
pub const SUPERVISOR_PERIOD_MS: u64 = 100;

/// Check the static tables for wiring mistakes
///
/// Run once at boot before anything touches hardware.
pub fn validate() -> Result<(), ConfigError> {
    for (index, pin) in PINS.iter().enumerate() {
        if pin.id.index() != index {
            return Err(ConfigError::TableOrder(pin.id));
        }
        if pin.pin >= PORT_WIDTH || pin.port.0 as usize >= PORT_COUNT {
            return Err(ConfigError::PinOutOfRange(pin.id));
        }
    }

    let mut claimed = [0u8; ADC_COUNT];
    for input in ANALOG_INPUTS.iter() {
        let adc = input.adc.0 as usize;
        if adc >= ADC_COUNT || input.channel as usize >= cellmux_hal::ADC_CHANNELS {
            return Err(ConfigError::AnalogChannelOutOfRange(input.input));
        }
        let bit = 1u8 << input.channel;
        if claimed[adc] & bit != 0 {
            return Err(ConfigError::AnalogChannelReused(input.input));
        }
        claimed[adc] |= bit;
    }

    for slot in SLOTS.iter() {
        if slot.allowed_types & batteries::CATALOG_MASK == 0 {
            return Err(ConfigError::NoBatteryTypes(slot.id));
        }
        if slot.channel as usize >= PWM_CHANNEL_COUNT {
            return Err(ConfigError::PwmChannelOutOfRange(slot.id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_tables_are_valid() {
        assert_eq!(validate(), Ok(()));
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(PIN_COUNT, 76);
        assert_eq!(ANALOG_INPUT_COUNT, 16);
        assert_eq!(SLOT_COUNT, 10);
        assert_eq!(COUNTER_COUNT, 6);
        assert_eq!(BATTERY_TYPE_COUNT, 17);
    }

    #[test]
    fn test_pins_grouped_by_port() {
        // The I/O cache relies on every port's pins being contiguous
        for port in 0..PORT_COUNT as u8 {
            let first = PINS.iter().position(|p| p.port.0 == port);
            let last = PINS.iter().rposition(|p| p.port.0 == port);
            if let (Some(first), Some(last)) = (first, last) {
                assert!(PINS[first..=last].iter().all(|p| p.port.0 == port));
            }
        }
    }
}
