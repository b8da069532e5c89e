//! Monotonic time from embassy-time

use cellmux_hal::Clock;
use embassy_time::Instant;

/// [`Clock`] backed by the embassy time driver
///
/// Reports milliseconds since the driver started, the same timebase
/// `Timer::at` uses for deadlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
