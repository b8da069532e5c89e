//! Digital port abstractions
//!
//! Pins are addressed as (port, bit). A port is whatever device holds a
//! register of pins that can be read in one transaction: the MCU's own GPIO
//! bank or an I2C I/O expander.

/// Opaque identity of a digital port device
///
/// Resolved once at startup; the core never interprets the number beyond
/// comparing identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortId(pub u8);

/// Batched digital I/O
pub trait DigitalPorts {
    /// Error type for port operations
    type Error;

    /// Drive a single output pin to a physical level
    ///
    /// # Arguments
    /// * `port` - Device holding the pin
    /// * `pin` - Bit position within the port
    /// * `high` - Physical level (polarity is handled by the caller)
    fn write_pin(&mut self, port: PortId, pin: u8, high: bool) -> Result<(), Self::Error>;

    /// Read the raw physical level of every pin on a port
    ///
    /// Bit `n` of the result is the level of pin `n`.
    fn read_port(&mut self, port: PortId) -> Result<u32, Self::Error>;
}
