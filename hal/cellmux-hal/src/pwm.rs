//! PWM controller abstractions
//!
//! Models a multi-channel PWM device with a fixed tick period where each
//! channel is programmed with an on-tick and an off-tick inside the period.

/// Which output(s) a PWM command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmTarget {
    /// A single output channel
    Channel(u8),
    /// Every channel at once
    All,
}

/// Duty programming for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmDuty {
    /// Output held inactive for the whole period
    FullOff,
    /// Output active from `on` up to `off` (ticks within the period)
    Window { on: u16, off: u16 },
}

/// Multi-channel PWM device
pub trait PwmController {
    /// Error type for PWM operations
    type Error;

    /// Program the duty of one channel or of all channels
    fn set_duty(&mut self, target: PwmTarget, duty: PwmDuty) -> Result<(), Self::Error>;
}
