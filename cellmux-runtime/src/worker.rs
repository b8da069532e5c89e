//! Deferred worker
//!
//! The one task that owns the [`Controller`] and the hardware. It waits for
//! an interrupt event, a UI command, a supervisory tick, tallied charge
//! edges or the next timer deadline, then drains everything that became
//! ready. Queued work runs
//! one item at a time; interrupt events that arrive meanwhile are handled
//! between items.

use embassy_futures::select::{select, select4, Either, Either4};
use embassy_time::{Instant, Timer};

use cellmux_core::config::{CounterId, PinId};
use cellmux_core::ui::UiCommand;
use cellmux_core::{Controller, Error, Notice, Ran};
use cellmux_hal::{Clock, Hardware};

use crate::channels::Channels;
use crate::clock::EmbassyClock;

pub struct Worker<'a, H> {
    controller: Controller,
    hw: H,
    clock: EmbassyClock,
    channels: &'a Channels,
}

impl<'a, H: Hardware> Worker<'a, H> {
    pub fn new(hw: H, channels: &'a Channels) -> Self {
        Self {
            controller: Controller::new(),
            hw,
            clock: EmbassyClock,
            channels,
        }
    }

    /// Bring the board up and publish the first snapshot
    ///
    /// A failure here is a configuration error; the caller should signal
    /// it and stop booting.
    pub fn start(&mut self) -> Result<(), Error> {
        if let Err(e) = self.controller.init(&mut self.hw, self.clock.now_ms()) {
            error!("Controller init failed: {:?}", e);
            return Err(e);
        }
        info!("Controller initialised");
        self.channels.snapshot.signal(self.controller.snapshot());
        Ok(())
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// Worker loop; never returns
    pub async fn run(&mut self) -> ! {
        info!("Worker task started");
        loop {
            self.step().await;
        }
    }

    /// Wait for one wake-up and process everything that is ready
    pub async fn step(&mut self) {
        let channels = self.channels;
        let deadline = self.controller.next_deadline();

        let woke = select4(
            channels.interrupts.receive(),
            channels.commands.receive(),
            select(channels.supervise.wait(), channels.edges.wait()),
            async {
                match deadline {
                    Some(ms) => Timer::at(Instant::from_millis(ms)).await,
                    None => core::future::pending::<()>().await,
                }
            },
        )
        .await;

        // Edges counted before this wake-up belong before whatever woke us
        self.charge_edges();
        match woke {
            Either4::First(pin) => self.interrupt(pin),
            Either4::Second(command) => self.command(command),
            Either4::Third(Either::First(())) => {
                let result = self.controller.supervise();
                if result.depleted != 0 {
                    warn!("Depleted slots cut off: {:#x}", result.depleted);
                }
            }
            Either4::Third(Either::Second(())) | Either4::Fourth(()) => {}
        }

        self.drain();
    }

    fn interrupt(&mut self, pin: PinId) {
        let now = self.clock.now_ms();
        match self.controller.handle_interrupt(&mut self.hw, pin, now) {
            Ok(Some(route)) => trace!("{:?} -> {:?}", pin, route),
            Ok(None) => debug!("No handler for {:?}", pin),
            Err(e) => warn!("Interrupt {:?} skipped: {:?}", pin, e),
        }
    }

    /// Fold the tallied charge edges into the counters
    fn charge_edges(&mut self) {
        let pending = self.channels.take_edges();
        let now = self.clock.now_ms();
        for (counter, edges) in CounterId::ALL.into_iter().zip(pending) {
            if edges == 0 {
                continue;
            }
            if let Err(e) = self
                .controller
                .apply_charge_edges(&mut self.hw, counter, edges, now)
            {
                warn!("{} edges on {:?} lost: {:?}", edges, counter, e);
            }
        }
    }

    fn command(&mut self, command: UiCommand) {
        let now = self.clock.now_ms();
        if let Err(e) = self.controller.apply(&mut self.hw, command, now) {
            warn!("UI command {:?} failed: {:?}", command, e);
        }
    }

    /// Run queued work until nothing is left
    fn drain(&mut self) {
        loop {
            self.charge_edges();
            while let Ok(pin) = self.channels.interrupts.try_receive() {
                self.interrupt(pin);
            }
            self.controller.poll_timers(self.clock.now_ms());

            match self.controller.run_next(&mut self.hw, &self.clock) {
                Some(ran) => self.report(ran),
                None => break,
            }
        }
    }

    fn report(&mut self, ran: Ran) {
        match ran.result {
            Ok(None) => trace!("{:?} done", ran.work),
            Ok(Some(Notice::Refresh)) => {
                self.channels.snapshot.signal(self.controller.snapshot());
            }
            Ok(Some(Notice::Button(button))) => {
                if self.channels.buttons.try_send(button).is_err() {
                    warn!("Button queue full, dropped {:?}", button);
                }
            }
            Err(e) => warn!("{:?} skipped: {:?}", ran.work, e),
        }
    }
}
