//! Supervisory ticker
//!
//! Wakes the worker every [`SUPERVISOR_PERIOD_MS`] for the depletion and
//! mask-drift checks. The checks themselves run in the worker.

use embassy_time::{Duration, Ticker};

use cellmux_core::config::SUPERVISOR_PERIOD_MS;

use crate::channels::Channels;

/// Supervisory loop; never returns
pub async fn run_supervisor(channels: &Channels) -> ! {
    info!("Supervisor task started");

    let mut ticker = Ticker::every(Duration::from_millis(SUPERVISOR_PERIOD_MS));
    loop {
        ticker.next().await;
        channels.supervise.signal(());
    }
}
