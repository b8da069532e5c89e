//! Battery slot and charge counter wiring
//!
//! Slots come in pairs ("a" and "b") that share one shutdown line, one PWM
//! channel and one charge counter; the pair's selector lines pick which of
//! the two is connected.

use super::analog::AnalogInput;
use super::batteries::{bit, TypeMask, CHOICE_9V, CHOICE_AA, CHOICE_AAA, CR123A, CR2032};
use super::batteries::{EXTERNAL_12V, EXTERNAL_3V3};
use super::pins::PinId;

/// PWM channels available for slot pairs
pub const PWM_CHANNEL_COUNT: usize = 5;

/// Charge counter identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CounterId {
    Pair1,
    Pair2,
    Pair3,
    Pair4,
    Pair5,
    Charger,
}

impl CounterId {
    pub const ALL: [CounterId; COUNTER_COUNT] = [
        CounterId::Pair1,
        CounterId::Pair2,
        CounterId::Pair3,
        CounterId::Pair4,
        CounterId::Pair5,
        CounterId::Charger,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn config(self) -> &'static CounterConfig {
        &COUNTERS[self.index()]
    }
}

pub const COUNTER_COUNT: usize = 6;

/// Pins belonging to one coulomb counter
#[derive(Debug, Clone, Copy)]
pub struct CounterConfig {
    pub polarity: PinId,
    pub interrupt: PinId,
    pub shutdown: PinId,
}

pub static COUNTERS: [CounterConfig; COUNTER_COUNT] = [
    counter(PinId::Polarity1, PinId::ChargeInt1, PinId::Shutdown1),
    counter(PinId::Polarity2, PinId::ChargeInt2, PinId::Shutdown2),
    counter(PinId::Polarity3, PinId::ChargeInt3, PinId::Shutdown3),
    counter(PinId::Polarity4, PinId::ChargeInt4, PinId::Shutdown4),
    counter(PinId::Polarity5, PinId::ChargeInt5, PinId::Shutdown5),
    counter(PinId::PolarityOut, PinId::ChargeIntOut, PinId::ShutdownOut),
];

const fn counter(polarity: PinId, interrupt: PinId, shutdown: PinId) -> CounterConfig {
    CounterConfig {
        polarity,
        interrupt,
        shutdown,
    }
}

/// Battery slot identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SlotId {
    Batt1a,
    Batt1b,
    Batt2a,
    Batt2b,
    Batt3a,
    Batt3b,
    Batt4a,
    Batt4b,
    Batt5a,
    Batt5b,
}

impl SlotId {
    pub const ALL: [SlotId; SLOT_COUNT] = [
        SlotId::Batt1a,
        SlotId::Batt1b,
        SlotId::Batt2a,
        SlotId::Batt2b,
        SlotId::Batt3a,
        SlotId::Batt3b,
        SlotId::Batt4a,
        SlotId::Batt4b,
        SlotId::Batt5a,
        SlotId::Batt5b,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn config(self) -> &'static SlotConfig {
        &SLOTS[self.index()]
    }

    /// The other slot of the same pair
    pub fn sibling(self) -> SlotId {
        SlotId::ALL[self.index() ^ 1]
    }
}

pub const SLOT_COUNT: usize = 10;

/// Static description of one battery slot
#[derive(Debug, Clone, Copy)]
pub struct SlotConfig {
    pub id: SlotId,
    pub name: &'static str,
    pub select: PinId,
    pub green: PinId,
    pub red: PinId,
    pub shutdown: PinId,
    /// PWM channel shared with the sibling slot
    pub channel: u8,
    pub counter: CounterId,
    pub voltage: AnalogInput,
    pub allowed_types: TypeMask,
}

macro_rules! slot {
    ($id:ident, $select:ident, $green:ident, $red:ident, $shutdown:ident, $channel:literal, $counter:ident, $types:expr) => {
        SlotConfig {
            id: SlotId::$id,
            name: stringify!($id),
            select: PinId::$select,
            green: PinId::$green,
            red: PinId::$red,
            shutdown: PinId::$shutdown,
            channel: $channel,
            counter: CounterId::$counter,
            voltage: AnalogInput::$id,
            allowed_types: $types,
        }
    };
}

pub static SLOTS: [SlotConfig; SLOT_COUNT] = [
    slot!(Batt1a, Select1a, Led1aGreen, Led1aRed, Shutdown1, 0, Pair1, CHOICE_AA),
    slot!(Batt1b, Select1b, Led1bGreen, Led1bRed, Shutdown1, 0, Pair1, CHOICE_AAA),
    slot!(Batt2a, Select2a, Led2aGreen, Led2aRed, Shutdown2, 1, Pair2, CHOICE_AA),
    slot!(Batt2b, Select2b, Led2bGreen, Led2bRed, Shutdown2, 1, Pair2, bit(EXTERNAL_3V3)),
    slot!(Batt3a, Select3a, Led3aGreen, Led3aRed, Shutdown3, 2, Pair3, CHOICE_AA),
    slot!(Batt3b, Select3b, Led3bGreen, Led3bRed, Shutdown3, 2, Pair3, bit(CR2032)),
    slot!(Batt4a, Select4a, Led4aGreen, Led4aRed, Shutdown4, 3, Pair4, CHOICE_AA),
    slot!(Batt4b, Select4b, Led4bGreen, Led4bRed, Shutdown4, 3, Pair4, bit(CR123A)),
    slot!(Batt5a, Select5a, Led5aGreen, Led5aRed, Shutdown5, 4, Pair5, bit(EXTERNAL_12V)),
    slot!(Batt5b, Select5b, Led5bGreen, Led5bRed, Shutdown5, 4, Pair5, CHOICE_9V),
];
