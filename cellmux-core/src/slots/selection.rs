//! Battery type selection
//!
//! Cycling through the types a slot allows is a rotation over a fixed-width
//! bitmask: starting next to the current index, walk in the requested
//! direction (wrapping at the width) until an allowed bit is found.

use crate::config::{TypeMask, BATTERY_TYPE_COUNT};

/// Direction to cycle in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    Next,
    Previous,
}

/// Find the next allowed index in a `width`-bit mask
///
/// Returns `None` when no bit within the width is set or when `current`
/// lies outside the width. If `current` is the only allowed index it is
/// returned unchanged.
pub fn cycle(mask: u32, width: u32, current: u8, step: Step) -> Option<u8> {
    if width == 0 || width > u32::BITS || current as u32 >= width {
        return None;
    }
    let mask = if width == u32::BITS {
        mask
    } else {
        mask & ((1 << width) - 1)
    };
    if mask == 0 {
        return None;
    }

    let current = current as u32;
    (1..=width)
        .map(|offset| match step {
            Step::Next => (current + offset) % width,
            Step::Previous => (current + width - offset) % width,
        })
        .find(|&index| mask & (1 << index) != 0)
        .map(|index| index as u8)
}

/// [`cycle`] over the battery catalog
pub fn next_battery_type(mask: TypeMask, current: u8, step: Step) -> Option<u8> {
    cycle(mask, BATTERY_TYPE_COUNT as u32, current, step)
}
