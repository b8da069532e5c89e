//! Battery type catalog
//!
//! Slots restrict which catalog entries may be selected with a [`TypeMask`]
//! where bit `n` allows `BATTERY_TYPES[n]`.

#[cfg(feature = "serde")]
use serde::Serialize;

/// Bitmask over [`BATTERY_TYPES`]
pub type TypeMask = u32;

/// Voltage window of one battery chemistry/size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BatteryType {
    pub name: &'static str,
    /// Fully charged voltage (mV)
    pub max_mv: u16,
    /// Depleted voltage (mV)
    pub min_mv: u16,
}

const fn battery(name: &'static str, max_mv: u16, min_mv: u16) -> BatteryType {
    BatteryType {
        name,
        max_mv,
        min_mv,
    }
}

pub const ZINC_CARBON_AA: u8 = 0;
pub const ALKALINE_AA: u8 = 1;
pub const NICD_AA: u8 = 2;
pub const NIMH_AA: u8 = 3;
pub const ZINC_CARBON_AAA: u8 = 4;
pub const ALKALINE_AAA: u8 = 5;
pub const NICD_AAA: u8 = 6;
pub const NIMH_AAA: u8 = 7;
pub const EXTERNAL_3V3: u8 = 8;
pub const CR2032: u8 = 9;
pub const CR123A: u8 = 10;
pub const EXTERNAL_12V: u8 = 11;
pub const ZINC_CARBON_9V: u8 = 12;
pub const ALKALINE_9V: u8 = 13;
pub const NICD_9V: u8 = 14;
pub const NIMH_9V: u8 = 15;
pub const LITHIUM_9V: u8 = 16;

/// Catalog, indexed by the type constants above
pub const BATTERY_TYPES: [BatteryType; 17] = [
    battery("ZincCarbon AA", 1500, 750),
    battery("Alkaline AA", 1500, 850),
    battery("NiCd AA", 1200, 900),
    battery("NiMH AA", 1200, 900),
    battery("ZincCarbon AAA", 1500, 750),
    battery("Alkaline AAA", 1500, 850),
    battery("NiCd AAA", 1200, 900),
    battery("NiMH AAA", 1200, 900),
    battery("External 3V3", 3300, 850),
    battery("CR2032", 3000, 1600),
    battery("CR123A", 3000, 1600),
    battery("External 12V", 12000, 1500),
    battery("ZincCarbon 9V", 9000, 4500),
    battery("Alkaline 9V", 9000, 5100),
    battery("NiCd 9V", 7200, 5400),
    battery("NiMH 9V", 7200, 5400),
    battery("Lithium 9V", 9000, 4800),
];

pub const BATTERY_TYPE_COUNT: usize = BATTERY_TYPES.len();

/// Every bit that names a catalog entry
pub const CATALOG_MASK: TypeMask = (1 << BATTERY_TYPE_COUNT) - 1;

pub const fn bit(index: u8) -> TypeMask {
    1 << index
}

pub const CHOICE_AA: TypeMask =
    bit(ZINC_CARBON_AA) | bit(ALKALINE_AA) | bit(NICD_AA) | bit(NIMH_AA);
pub const CHOICE_AAA: TypeMask =
    bit(ZINC_CARBON_AAA) | bit(ALKALINE_AAA) | bit(NICD_AAA) | bit(NIMH_AAA);
pub const CHOICE_9V: TypeMask = bit(ZINC_CARBON_9V)
    | bit(ALKALINE_9V)
    | bit(NICD_9V)
    | bit(NIMH_9V)
    | bit(LITHIUM_9V);

/// Lowest catalog index allowed by `mask`
pub fn first_allowed(mask: TypeMask) -> Option<u8> {
    let mask = mask & CATALOG_MASK;
    if mask == 0 {
        None
    } else {
        Some(mask.trailing_zeros() as u8)
    }
}
