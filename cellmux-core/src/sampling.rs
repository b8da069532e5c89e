//! Periodic analog sampling
//!
//! Each converter is sampled as one batch over all of its configured
//! channels. Raw codes are calibrated to millivolts using the channel's
//! reference voltage and gain.

use cellmux_hal::{AdcId, AnalogConverters, Gain, ADC_CHANNELS};

use crate::config::{AnalogInput, ADC_COUNT, ANALOG_INPUTS, ANALOG_INPUT_COUNT};
use crate::error::{Device, Error};

/// Converter resolution used for calibration
pub const RESOLUTION_BITS: u32 = 16;

/// Convert a raw code to millivolts
///
/// Returns `None` when the calibrated value does not fit.
pub fn raw_to_millivolts(raw: u16, reference_mv: u16, gain: Gain, resolution: u32) -> Option<u16> {
    let scaled = (raw as u32).checked_mul(reference_mv as u32)?;
    let mv = gain.invert(scaled)? >> resolution;
    u16::try_from(mv).ok()
}

/// Latest value of one analog input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub raw: u16,
    pub millivolts: u16,
}

/// Outcome of one converter batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatchReport {
    /// Channels converted
    pub channels: u8,
    /// Channels whose calibration failed and were zeroed
    pub zeroed: u8,
}

#[derive(Debug, Clone, Copy, Default)]
struct Converter {
    channel_mask: u8,
    inputs: [Option<AnalogInput>; ADC_CHANNELS],
}

/// Sampling pipeline state for every converter
#[derive(Debug, Clone)]
pub struct AnalogSampler {
    readings: [Reading; ANALOG_INPUT_COUNT],
    converters: [Converter; ADC_COUNT],
}

impl Default for AnalogSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogSampler {
    /// Build per-converter channel masks from [`ANALOG_INPUTS`]
    ///
    /// Entries that do not fit the hardware are skipped here; boot-time
    /// validation reports them.
    pub fn new() -> Self {
        let mut converters = [Converter::default(); ADC_COUNT];
        for cfg in ANALOG_INPUTS.iter() {
            let channel = cfg.channel as usize;
            if let Some(conv) = converters.get_mut(cfg.adc.0 as usize) {
                if channel < ADC_CHANNELS {
                    conv.channel_mask |= 1 << channel;
                    conv.inputs[channel] = Some(cfg.input);
                }
            }
        }

        Self {
            readings: [Reading::default(); ANALOG_INPUT_COUNT],
            converters,
        }
    }

    /// Channel mask configured on a converter
    pub fn channel_mask(&self, adc: AdcId) -> u8 {
        self.converters
            .get(adc.0 as usize)
            .map_or(0, |c| c.channel_mask)
    }

    /// Run one batch conversion on `adc`
    ///
    /// A failed batch leaves every reading untouched. A failed calibration
    /// zeroes only that channel.
    pub fn sample<H: AnalogConverters>(
        &mut self,
        hw: &mut H,
        adc: AdcId,
    ) -> Result<BatchReport, Error> {
        let Some(conv) = self.converters.get(adc.0 as usize).copied() else {
            return Ok(BatchReport::default());
        };
        if conv.channel_mask == 0 {
            return Ok(BatchReport::default());
        }

        let mut buffer = [0u16; ADC_CHANNELS];
        hw.convert(adc, conv.channel_mask, &mut buffer)
            .map_err(|_| Error::HardwareAccess(Device::Adc(adc)))?;

        let mut report = BatchReport::default();
        for (raw, input) in buffer.iter().zip(conv.inputs.iter()) {
            let Some(input) = input else { continue };
            let cfg = input.config();
            let millivolts = match raw_to_millivolts(*raw, cfg.reference_mv, cfg.gain, RESOLUTION_BITS)
            {
                Some(mv) => mv,
                None => {
                    report.zeroed += 1;
                    0
                }
            };
            self.readings[input.index()] = Reading {
                raw: *raw,
                millivolts,
            };
            report.channels += 1;
        }
        Ok(report)
    }

    pub fn reading(&self, input: AnalogInput) -> Reading {
        self.readings[input.index()]
    }

    pub fn millivolts(&self, input: AnalogInput) -> u16 {
        self.readings[input.index()].millivolts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHardware;

    #[test]
    fn test_raw_to_millivolts() {
        assert_eq!(raw_to_millivolts(0, 2048, Gain::Gain1, 16), Some(0));
        assert_eq!(raw_to_millivolts(32768, 2048, Gain::Gain1, 16), Some(1024));
        assert_eq!(raw_to_millivolts(65535, 12268, Gain::Gain1, 16), Some(12267));
        assert_eq!(raw_to_millivolts(32768, 2048, Gain::Gain1_2, 16), Some(2048));
    }

    #[test]
    fn test_raw_to_millivolts_overflow() {
        // 65535 * 12268 * 6 does not fit in 32 bits
        assert_eq!(raw_to_millivolts(65535, 12268, Gain::Gain1_6, 16), None);
        // Fits 32 bits but not a u16 result
        assert_eq!(raw_to_millivolts(65535, 60000, Gain::Gain1, 8), None);
    }

    #[test]
    fn test_channel_masks() {
        let sampler = AnalogSampler::new();
        for adc in 0..5 {
            assert_eq!(sampler.channel_mask(AdcId(adc)), 0b0111);
        }
        assert_eq!(sampler.channel_mask(AdcId(5)), 0b0001);
        assert_eq!(sampler.channel_mask(AdcId(9)), 0);
    }

    #[test]
    fn test_sample_batch() {
        let mut hw = MockHardware::new();
        let mut sampler = AnalogSampler::new();
        hw.adc_codes[4] = [32768, 16384, 65535, 0];

        let report = sampler.sample(&mut hw, AdcId(4)).unwrap();
        assert_eq!(report, BatchReport { channels: 3, zeroed: 0 });
        assert_eq!(hw.conversions, [(AdcId(4), 0b0111)]);

        assert_eq!(sampler.millivolts(AnalogInput::Batt5a), 6134);
        assert_eq!(sampler.millivolts(AnalogInput::Batt5b), 3067);
        assert_eq!(sampler.millivolts(AnalogInput::Out5), 5058);
        assert_eq!(sampler.reading(AnalogInput::Out5).raw, 65535);

        // Other converters untouched
        assert_eq!(sampler.millivolts(AnalogInput::Batt1a), 0);
    }

    #[test]
    fn test_failed_batch_keeps_readings() {
        let mut hw = MockHardware::new();
        let mut sampler = AnalogSampler::new();
        hw.adc_codes[0] = [32768, 32768, 32768, 0];
        sampler.sample(&mut hw, AdcId(0)).unwrap();

        hw.fail_adc = Some(AdcId(0));
        hw.adc_codes[0] = [0; 4];
        assert_eq!(
            sampler.sample(&mut hw, AdcId(0)),
            Err(Error::HardwareAccess(Device::Adc(AdcId(0))))
        );
        assert_eq!(sampler.millivolts(AnalogInput::Batt1a), 1024);
    }
}
