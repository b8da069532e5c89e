//! Coulomb counting
//!
//! Each slot pair (and the charger output) has a charge monitor that emits
//! one interrupt per fixed quantum of charge, with a polarity line giving the
//! current direction. Edges adjust a signed raw count; a periodic integrator
//! converts the count to milliamp-hours.

use cellmux_hal::DigitalPorts;

use crate::config::{CounterId, COUNTER_COUNT};
use crate::error::Error;
use crate::io::IoCache;

/// Edges per 1000 mAh
///
/// One edge is 1/(Gvh * Rsense) coulombs with Gvh = 32.55 and
/// Rsense = 0.1 ohm, so one mAh (3.6 C) is 11.718 edges.
pub const EDGES_PER_AMP_HOUR: i64 = 11718;

/// Convert a raw edge count to milliamp-hours (truncating toward zero)
pub fn counts_to_mah(raw_count: i32) -> i32 {
    (raw_count as i64 * 1000 / EDGES_PER_AMP_HOUR) as i32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargeCounter {
    pub raw_count: i32,
    pub mah: i32,
}

/// Result of one integration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Integration {
    /// mAh recomputed from the raw count
    Updated(i32),
    /// Monitor is shut down; count and mAh left as they were
    Frozen,
}

/// All charge counters
#[derive(Debug, Clone, Default)]
pub struct ChargeAccumulator {
    counters: [ChargeCounter; COUNTER_COUNT],
}

impl ChargeAccumulator {
    pub const fn new() -> Self {
        Self {
            counters: [ChargeCounter {
                raw_count: 0,
                mah: 0,
            }; COUNTER_COUNT],
        }
    }

    /// Account one charge edge
    ///
    /// Returns the step applied (+1 or -1).
    pub fn on_edge<H: DigitalPorts>(
        &mut self,
        io: &mut IoCache,
        hw: &mut H,
        counter: CounterId,
        now_ms: u64,
    ) -> Result<i32, Error> {
        self.on_edges(io, hw, counter, 1, now_ms)
    }

    /// Account `edges` charge edges seen since the last call
    ///
    /// The polarity line is read once for the whole batch. Returns the
    /// signed amount added to the raw count.
    pub fn on_edges<H: DigitalPorts>(
        &mut self,
        io: &mut IoCache,
        hw: &mut H,
        counter: CounterId,
        edges: u32,
        now_ms: u64,
    ) -> Result<i32, Error> {
        if edges == 0 {
            return Ok(0);
        }
        let positive = io.read(hw, counter.config().polarity, now_ms)?;
        let magnitude = edges.min(i32::MAX as u32) as i32;
        let delta = if positive { magnitude } else { -magnitude };
        let c = &mut self.counters[counter.index()];
        c.raw_count = c.raw_count.wrapping_add(delta);
        Ok(delta)
    }

    /// Recompute mAh unless the counter's monitor is shut down
    pub fn integrate<H: DigitalPorts>(
        &mut self,
        io: &mut IoCache,
        hw: &mut H,
        counter: CounterId,
        now_ms: u64,
    ) -> Result<Integration, Error> {
        if io.read(hw, counter.config().shutdown, now_ms)? {
            return Ok(Integration::Frozen);
        }

        let c = &mut self.counters[counter.index()];
        c.mah = counts_to_mah(c.raw_count);
        Ok(Integration::Updated(c.mah))
    }

    /// Zero a counter; only called on a disabled to enabled transition
    pub fn reset(&mut self, counter: CounterId) {
        self.counters[counter.index()] = ChargeCounter::default();
    }

    pub fn counter(&self, counter: CounterId) -> ChargeCounter {
        self.counters[counter.index()]
    }
}
