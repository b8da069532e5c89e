//! Analog input map
//!
//! Six 4-channel converters: one per slot pair (two battery taps plus the
//! pair's output tap) and one for the combined output rail.

use cellmux_hal::{AdcId, Gain};

/// Number of converter devices
pub const ADC_COUNT: usize = 6;

/// Static description of one analog input
#[derive(Debug, Clone, Copy)]
pub struct AnalogConfig {
    pub input: AnalogInput,
    pub adc: AdcId,
    pub channel: u8,
    /// Full-scale reference in millivolts
    pub reference_mv: u16,
    pub gain: Gain,
}

macro_rules! analog_table {
    ($($id:ident: $adc:literal, $channel:literal, $reference_mv:literal;)*) => {
        /// Every analog input on the board
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum AnalogInput {
            $($id,)*
        }

        /// Analog input table, indexed by [`AnalogInput`]
        pub const ANALOG_INPUTS: &[AnalogConfig] = &[
            $(AnalogConfig {
                input: AnalogInput::$id,
                adc: AdcId($adc),
                channel: $channel,
                reference_mv: $reference_mv,
                gain: Gain::Gain1,
            },)*
        ];
    };
}

analog_table! {
    Batt1a: 0, 0, 2048;
    Batt1b: 0, 1, 2048;
    Out1: 0, 2, 5059;

    Batt2a: 1, 0, 2048;
    Batt2b: 1, 1, 3480;
    Out2: 1, 2, 5059;

    Batt3a: 2, 0, 2048;
    Batt3b: 2, 1, 3480;
    Out3: 2, 2, 5059;

    Batt4a: 3, 0, 2048;
    Batt4b: 3, 1, 3480;
    Out4: 3, 2, 5059;

    Batt5a: 4, 0, 12268;
    Batt5b: 4, 1, 12268;
    Out5: 4, 2, 5059;

    Output: 5, 0, 5059;
}

/// Number of entries in [`ANALOG_INPUTS`]
pub const ANALOG_INPUT_COUNT: usize = ANALOG_INPUTS.len();

impl AnalogInput {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn config(self) -> &'static AnalogConfig {
        &ANALOG_INPUTS[self.index()]
    }
}
