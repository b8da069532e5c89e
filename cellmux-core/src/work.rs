//! Deferred work
//!
//! Interrupt-level handlers only do bounded bookkeeping and then queue the
//! heavier follow-up here. A single worker drains the queue one item at a
//! time. An item that is already pending is not queued twice.
//!
//! Periodic jobs are one-shot timers: when a job completes it is re-armed
//! relative to its completion time, so drift under load is not corrected.

use cellmux_hal::AdcId;
use heapless::Deque;

use crate::config::{
    CounterId, SlotId, ADC_COUNT, COUNTER_COUNT, INTEGRATE_PERIOD_MS, SAMPLE_PERIOD_MS,
};
use crate::dispatch::Button;

/// Pending work capacity
pub const WORK_QUEUE_DEPTH: usize = 32;

/// One unit of deferred work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Work {
    /// Refresh a slot's status LEDs
    UpdateLeds(SlotId),
    /// Recompute and program the PWM time slices
    ReschedulePwm,
    /// Drive the charger shutdown line and LEDs
    UpdateChargerOutputs,
    /// Batch-convert one converter
    SampleAnalog(AdcId),
    /// Integrate one charge counter
    IntegrateCharge(CounterId),
    /// Publish a fresh snapshot to the display
    RefreshDisplay,
    /// Forward a button press to the menu
    Button(Button),
}

/// Bounded FIFO of pending work
#[derive(Debug, Clone, Default)]
pub struct WorkQueue {
    items: Deque<Work, WORK_QUEUE_DEPTH>,
    dropped: u32,
}

impl WorkQueue {
    pub const fn new() -> Self {
        Self {
            items: Deque::new(),
            dropped: 0,
        }
    }

    /// Queue `work` unless it is already pending
    ///
    /// Returns `true` if the item is pending after the call. A full queue
    /// drops the item and counts it.
    pub fn push(&mut self, work: Work) -> bool {
        if self.contains(work) {
            return true;
        }
        if self.items.push_back(work).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        true
    }

    pub fn pop(&mut self) -> Option<Work> {
        self.items.pop_front()
    }

    pub fn contains(&self, work: Work) -> bool {
        self.items.iter().any(|w| *w == work)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items dropped because the queue was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Self-rescheduling one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodic {
    period_ms: u64,
    /// `None` while the job is queued or running
    due_at: Option<u64>,
}

impl Periodic {
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            due_at: None,
        }
    }

    /// Arm for one period after `now_ms`
    pub fn arm(&mut self, now_ms: u64) {
        self.due_at = Some(now_ms + self.period_ms);
    }

    pub fn due_at(&self) -> Option<u64> {
        self.due_at
    }

    /// Disarm and return `true` if the timer has fired
    pub fn take_if_due(&mut self, now_ms: u64) -> bool {
        match self.due_at {
            Some(due) if now_ms >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Timers for every periodic job
#[derive(Debug, Clone)]
pub struct Timers {
    sample: [Periodic; ADC_COUNT],
    integrate: [Periodic; COUNTER_COUNT],
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

impl Timers {
    pub const fn new() -> Self {
        Self {
            sample: [Periodic::new(SAMPLE_PERIOD_MS); ADC_COUNT],
            integrate: [Periodic::new(INTEGRATE_PERIOD_MS); COUNTER_COUNT],
        }
    }

    /// Arm every job for its first run
    pub fn start(&mut self, now_ms: u64) {
        self.sample.iter_mut().for_each(|t| t.arm(now_ms));
        self.integrate.iter_mut().for_each(|t| t.arm(now_ms));
    }

    /// Queue every job whose timer has fired
    ///
    /// A job that cannot be queued is re-armed so it is not lost.
    pub fn queue_due(&mut self, now_ms: u64, queue: &mut WorkQueue) {
        for (i, timer) in self.sample.iter_mut().enumerate() {
            if timer.take_if_due(now_ms) && !queue.push(Work::SampleAnalog(AdcId(i as u8))) {
                timer.arm(now_ms);
            }
        }
        for (timer, counter) in self.integrate.iter_mut().zip(CounterId::ALL) {
            if timer.take_if_due(now_ms) && !queue.push(Work::IntegrateCharge(counter)) {
                timer.arm(now_ms);
            }
        }
    }

    /// Re-arm the timer behind `work` from its completion time
    pub fn completed(&mut self, work: Work, completed_at: u64) {
        let timer = match work {
            Work::SampleAnalog(adc) => self.sample.get_mut(adc.0 as usize),
            Work::IntegrateCharge(counter) => self.integrate.get_mut(counter.index()),
            _ => None,
        };
        if let Some(timer) = timer {
            timer.arm(completed_at);
        }
    }

    /// Earliest armed deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.sample
            .iter()
            .chain(self.integrate.iter())
            .filter_map(Periodic::due_at)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_coalesces() {
        let mut queue = WorkQueue::new();
        assert!(queue.push(Work::ReschedulePwm));
        assert!(queue.push(Work::UpdateLeds(SlotId::Batt1a)));
        assert!(queue.push(Work::ReschedulePwm));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop(), Some(Work::ReschedulePwm));
        assert_eq!(queue.pop(), Some(Work::UpdateLeds(SlotId::Batt1a)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_clone_keeps_pending_work() {
        let mut queue = WorkQueue::new();
        queue.push(Work::RefreshDisplay);
        queue.push(Work::ReschedulePwm);

        let mut copy = queue.clone();
        assert_eq!(copy.pop(), Some(Work::RefreshDisplay));
        assert_eq!(copy.pop(), Some(Work::ReschedulePwm));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_full_queue_drops() {
        let mut queue = WorkQueue::new();
        for slot in SlotId::ALL {
            assert!(queue.push(Work::UpdateLeds(slot)));
        }
        for i in 0..(WORK_QUEUE_DEPTH - SlotId::ALL.len()) {
            assert!(queue.push(Work::SampleAnalog(AdcId(i as u8))));
        }
        assert!(!queue.push(Work::ReschedulePwm));
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.len(), WORK_QUEUE_DEPTH);
    }

    #[test]
    fn test_periodic_fires_once() {
        let mut timer = Periodic::new(1000);
        assert!(!timer.take_if_due(5000));

        timer.arm(0);
        assert!(!timer.take_if_due(999));
        assert!(timer.take_if_due(1000));
        // Disarmed until the job completes
        assert!(!timer.take_if_due(5000));
    }

    #[test]
    fn test_rearm_from_completion() {
        let mut timers = Timers::new();
        let mut queue = WorkQueue::new();
        timers.start(0);
        assert_eq!(timers.next_deadline(), Some(1000));

        // Worker only gets around to it late
        timers.queue_due(1300, &mut queue);
        assert_eq!(queue.len(), ADC_COUNT + COUNTER_COUNT);
        assert_eq!(timers.next_deadline(), None);

        let work = queue.pop().unwrap();
        assert_eq!(work, Work::SampleAnalog(AdcId(0)));
        timers.completed(work, 1350);
        assert_eq!(timers.next_deadline(), Some(2350));
    }

    #[test]
    fn test_completion_of_other_work_is_ignored() {
        let mut timers = Timers::new();
        timers.completed(Work::ReschedulePwm, 10);
        assert_eq!(timers.next_deadline(), None);
    }
}
