//! Analog converter abstractions

/// Channels per converter device
pub const ADC_CHANNELS: usize = 4;

/// Opaque identity of a converter device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcId(pub u8);

/// Multi-channel converter
pub trait AnalogConverters {
    /// Error type for conversions
    type Error;

    /// Convert every channel selected in `channel_mask` in one sequence
    ///
    /// Raw codes land in `buffer[channel]`; unselected entries are left
    /// untouched.
    fn convert(
        &mut self,
        device: AdcId,
        channel_mask: u8,
        buffer: &mut [u16; ADC_CHANNELS],
    ) -> Result<(), Self::Error>;
}

/// Programmable front-end gain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    Gain1_6,
    Gain1_5,
    Gain1_4,
    Gain1_3,
    Gain1_2,
    Gain2_3,
    #[default]
    Gain1,
    Gain2,
    Gain3,
    Gain4,
    Gain8,
    Gain16,
}

impl Gain {
    /// Undo the gain on a value measured through it
    ///
    /// Returns `None` if the result does not fit.
    pub fn invert(self, value: u32) -> Option<u32> {
        let (num, den) = self.ratio();
        value.checked_mul(den).map(|v| v / num)
    }

    /// Gain as (numerator, denominator)
    pub const fn ratio(self) -> (u32, u32) {
        match self {
            Gain::Gain1_6 => (1, 6),
            Gain::Gain1_5 => (1, 5),
            Gain::Gain1_4 => (1, 4),
            Gain::Gain1_3 => (1, 3),
            Gain::Gain1_2 => (1, 2),
            Gain::Gain2_3 => (2, 3),
            Gain::Gain1 => (1, 1),
            Gain::Gain2 => (2, 1),
            Gain::Gain3 => (3, 1),
            Gain::Gain4 => (4, 1),
            Gain::Gain8 => (8, 1),
            Gain::Gain16 => (16, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_invert() {
        assert_eq!(Gain::Gain1.invert(1234), Some(1234));
        assert_eq!(Gain::Gain1_6.invert(100), Some(600));
        assert_eq!(Gain::Gain2.invert(100), Some(50));
        assert_eq!(Gain::Gain2_3.invert(200), Some(300));
    }

    #[test]
    fn test_gain_invert_overflow() {
        assert_eq!(Gain::Gain1_6.invert(u32::MAX), None);
        assert_eq!(Gain::Gain16.invert(u32::MAX), Some(u32::MAX / 16));
    }
}
