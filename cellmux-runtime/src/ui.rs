//! UI side of the channels
//!
//! A display task holds a [`UiClient`] to read snapshots, receive button
//! presses and request state changes. It never touches the controller.

use cellmux_core::config::SlotId;
use cellmux_core::dispatch::Button;
use cellmux_core::slots::{Step, Threshold};
use cellmux_core::ui::{Snapshot, UiCommand};

use crate::channels::Channels;

#[derive(Clone, Copy)]
pub struct UiClient<'a> {
    channels: &'a Channels,
}

impl<'a> UiClient<'a> {
    pub fn new(channels: &'a Channels) -> Self {
        Self { channels }
    }

    /// Wait for the next published snapshot
    pub async fn next_snapshot(&self) -> Snapshot {
        self.channels.snapshot.wait().await
    }

    /// Take a snapshot published since the last call, if any
    pub fn latest_snapshot(&self) -> Option<Snapshot> {
        self.channels.snapshot.try_take()
    }

    pub async fn next_button(&self) -> Button {
        self.channels.buttons.receive().await
    }

    pub async fn send(&self, command: UiCommand) {
        self.channels.commands.send(command).await;
    }

    pub async fn set_slot_enabled(&self, slot: SlotId, enabled: bool) {
        self.send(UiCommand::SetSlotEnabled { slot, enabled }).await;
    }

    pub async fn cycle_battery_type(&self, slot: SlotId, step: Step) {
        self.send(UiCommand::CycleBatteryType { slot, step }).await;
    }

    pub async fn adjust_threshold(&self, slot: SlotId, threshold: Threshold, delta_mv: i16) {
        self.send(UiCommand::AdjustThreshold {
            slot,
            threshold,
            delta_mv,
        })
        .await;
    }
}
