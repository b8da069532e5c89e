//! Digital pin map
//!
//! Port 0 is the MCU's own GPIO bank; ports 1-7 are the seven 16-bit I/O
//! expanders. Pins of one port must stay contiguous in [`PINS`] so a single
//! batch read can refresh all of them.

use cellmux_hal::PortId;

/// Number of digital ports (MCU bank + expanders)
pub const PORT_COUNT: usize = 8;

/// Highest pin number + 1 on any port
pub const PORT_WIDTH: u8 = 32;

const PORT_A: PortId = PortId(0);
const EXP0: PortId = PortId(1);
const EXP1: PortId = PortId(2);
const EXP2: PortId = PortId(3);
const EXP3: PortId = PortId(4);
const EXP4: PortId = PortId(5);
const EXP5: PortId = PortId(6);
const EXP6: PortId = PortId(7);

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

/// Edge that raises an interrupt on a pin with a bound handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    Falling,
    Both,
}

/// Static description of one pin
#[derive(Debug, Clone, Copy)]
pub struct PinConfig {
    pub id: PinId,
    pub port: PortId,
    pub pin: u8,
    pub direction: Direction,
    /// Logical "on" is a physical low
    pub active_low: bool,
    /// Interrupt binding, if the pin has a handler
    pub irq: Option<Trigger>,
}

impl PinConfig {
    pub const fn is_output(&self) -> bool {
        matches!(self.direction, Direction::Output)
    }
}

macro_rules! pin_table {
    ($($id:ident: $port:ident, $pin:literal, $dir:ident, $active_low:literal, $irq:expr;)*) => {
        /// Every named pin on the board
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum PinId {
            $($id,)*
        }

        /// Pin table, indexed by [`PinId`]
        pub const PINS: &[PinConfig] = &[
            $(PinConfig {
                id: PinId::$id,
                port: $port,
                pin: $pin,
                direction: Direction::$dir,
                active_low: $active_low,
                irq: $irq,
            },)*
        ];
    };
}

const FALLING: Option<Trigger> = Some(Trigger::Falling);
const BOTH: Option<Trigger> = Some(Trigger::Both);

pin_table! {
    ExtInt: PORT_A, 0, Input, true, None;
    OutputEnable: PORT_A, 1, Output, true, None;
    LedBootRed: PORT_A, 22, Output, false, None;
    LedBootGreen: PORT_A, 23, Output, false, None;
    LedCpuGreen: PORT_A, 24, Output, false, None;
    LedCpuRed: PORT_A, 25, Output, false, None;

    Shutdown1: EXP0, 0, Output, true, None;
    ChargeInt1: EXP0, 1, Input, true, FALLING;
    Polarity1: EXP0, 2, Input, false, None;
    PowerGood1: EXP0, 3, Input, false, BOTH;
    Led1aRed: EXP0, 8, Output, false, None;
    Led1aGreen: EXP0, 9, Output, false, None;
    Led1bRed: EXP0, 10, Output, false, None;
    Led1bGreen: EXP0, 11, Output, false, None;
    Select1a: EXP0, 12, Output, false, None;
    Select1b: EXP0, 13, Output, false, None;

    Shutdown2: EXP1, 0, Output, true, None;
    ChargeInt2: EXP1, 1, Input, true, FALLING;
    Polarity2: EXP1, 2, Input, false, None;
    PowerGood2: EXP1, 3, Input, false, BOTH;
    Led2aRed: EXP1, 8, Output, false, None;
    Led2aGreen: EXP1, 9, Output, false, None;
    Led2bRed: EXP1, 10, Output, false, None;
    Led2bGreen: EXP1, 11, Output, false, None;
    Select2a: EXP1, 12, Output, false, None;
    Select2b: EXP1, 13, Output, false, None;

    Shutdown3: EXP2, 0, Output, true, None;
    ChargeInt3: EXP2, 1, Input, true, FALLING;
    Polarity3: EXP2, 2, Input, false, None;
    PowerGood3: EXP2, 3, Input, false, BOTH;
    Led3aRed: EXP2, 8, Output, false, None;
    Led3aGreen: EXP2, 9, Output, false, None;
    Led3bRed: EXP2, 10, Output, false, None;
    Led3bGreen: EXP2, 11, Output, false, None;
    Select3a: EXP2, 12, Output, false, None;
    Select3b: EXP2, 13, Output, false, None;

    Shutdown4: EXP3, 0, Output, true, None;
    ChargeInt4: EXP3, 1, Input, true, FALLING;
    Polarity4: EXP3, 2, Input, false, None;
    PowerGood4: EXP3, 3, Input, false, BOTH;
    Led4aRed: EXP3, 8, Output, false, None;
    Led4aGreen: EXP3, 9, Output, false, None;
    Led4bRed: EXP3, 10, Output, false, None;
    Led4bGreen: EXP3, 11, Output, false, None;
    Select4a: EXP3, 12, Output, false, None;
    Select4b: EXP3, 13, Output, false, None;

    Shutdown5: EXP4, 0, Output, true, None;
    ChargeInt5: EXP4, 1, Input, true, FALLING;
    Polarity5: EXP4, 2, Input, false, None;
    PowerGood5: EXP4, 3, Input, false, BOTH;
    Led5aRed: EXP4, 8, Output, false, None;
    Led5aGreen: EXP4, 9, Output, false, None;
    Led5bRed: EXP4, 10, Output, false, None;
    Led5bGreen: EXP4, 11, Output, false, None;
    Select5a: EXP4, 12, Output, false, None;
    Select5b: EXP4, 13, Output, false, None;

    BattInt1: EXP5, 0, Input, true, None;
    BattInt2: EXP5, 1, Input, true, None;
    BattInt3: EXP5, 2, Input, true, None;
    BattInt4: EXP5, 3, Input, true, None;
    BattInt5: EXP5, 4, Input, true, None;
    OutInt: EXP5, 5, Input, true, None;
    ButtonUp: EXP5, 8, Input, true, FALLING;
    ButtonLeft: EXP5, 9, Input, true, FALLING;
    ButtonRight: EXP5, 10, Input, true, FALLING;
    ButtonDown: EXP5, 11, Input, true, FALLING;
    ButtonEnter: EXP5, 12, Input, true, FALLING;
    ButtonEsc: EXP5, 13, Input, true, FALLING;

    ShutdownOut: EXP6, 0, Output, true, None;
    ChargeIntOut: EXP6, 1, Input, true, FALLING;
    PolarityOut: EXP6, 2, Input, false, None;
    LedActive: EXP6, 3, Output, false, None;
    Standby: EXP6, 8, Input, true, BOTH;
    Charging: EXP6, 9, Input, true, BOTH;
    LedOutRed: EXP6, 10, Output, false, None;
    LedOutGreen: EXP6, 11, Output, false, None;
}

/// Number of entries in [`PINS`]
pub const PIN_COUNT: usize = PINS.len();

impl PinId {
    /// Position in [`PINS`]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn config(self) -> &'static PinConfig {
        &PINS[self.index()]
    }

    pub fn port(self) -> PortId {
        self.config().port
    }
}
