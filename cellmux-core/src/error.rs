//! Error taxonomy
//!
//! Hardware access failures are transient: the current operation is
//! abandoned and the next scheduled invocation tries again. Configuration
//! errors only occur at boot and stop initialisation.

use cellmux_hal::{AdcId, PortId};

use crate::config::{AnalogInput, PinId, SlotId};

/// Hardware device named in an access failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Device {
    Port(PortId),
    Adc(AdcId),
    Pwm,
}

/// Static table or device binding problem found at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pin table entry out of order with its identity
    TableOrder(PinId),
    /// Pin number or port beyond the hardware
    PinOutOfRange(PinId),
    /// Analog input on a missing converter or channel
    AnalogChannelOutOfRange(AnalogInput),
    /// Two analog inputs on the same converter channel
    AnalogChannelReused(AnalogInput),
    /// Slot allows no catalog battery type
    NoBatteryTypes(SlotId),
    /// Slot wired to a PWM channel that does not exist
    PwmChannelOutOfRange(SlotId),
    /// A device did not respond during initialisation
    Binding(Device),
}

/// Core error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Transient bus/register failure
    HardwareAccess(Device),
    /// Startup configuration failure
    Configuration(ConfigError),
}

impl Error {
    /// Whether boot must stop
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Configuration(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::HardwareAccess(device) => write!(f, "hardware access failed: {:?}", device),
            Error::Configuration(e) => write!(f, "configuration error: {:?}", e),
        }
    }
}
