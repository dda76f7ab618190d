use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::{log_info, log_warn};

use super::{
    scheduler::{ScheduleId, TickEvent, TickScheduler},
    CountdownTimer, Mode, TickOutcome, TimerState,
};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub state: TimerState,
    pub clock: String,
    pub epoch: u64,
    pub epoch_started_at: Option<DateTime<Utc>>,
}

/// Drives a [`CountdownTimer`] from a repeating tick source and flips
/// between focus and break whenever the countdown expires.
///
/// Every run between a start and the next pause/reset/switch is an epoch.
/// The tick source is cancelled before any of those operations return, and
/// ticks are stamped with the epoch that scheduled them so a tick that was
/// already queued when its epoch closed is dropped in [`Self::on_tick`].
pub struct SessionController<S: TickScheduler> {
    timer: CountdownTimer,
    scheduler: S,
    ticks: UnboundedSender<TickEvent>,
    tick_interval: Duration,
    ticker: Option<ScheduleId>,
    epoch: u64,
    epoch_started_at: Option<DateTime<Utc>>,
}

impl<S: TickScheduler> SessionController<S> {
    pub fn new(scheduler: S, ticks: UnboundedSender<TickEvent>, tick_interval: Duration) -> Self {
        Self {
            timer: CountdownTimer::new(),
            scheduler,
            ticks,
            tick_interval,
            ticker: None,
            epoch: 0,
            epoch_started_at: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let state = self.timer.state();
        TimerSnapshot {
            clock: state.clock(),
            state,
            epoch: self.epoch,
            epoch_started_at: self.epoch_started_at,
        }
    }

    pub fn start(&mut self) {
        if self.timer.is_running() {
            return;
        }
        self.timer.start();
        self.open_epoch();
    }

    pub fn pause(&mut self) {
        if !self.timer.is_running() {
            return;
        }
        self.close_epoch();
        self.timer.pause();
    }

    pub fn toggle(&mut self) {
        if self.timer.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn reset(&mut self, mode: Mode) {
        self.close_epoch();
        self.timer.reset(mode);
    }

    /// Resets the countdown to the preset of the current mode.
    pub fn reset_current(&mut self) {
        let mode = self.timer.mode();
        self.reset(mode);
    }

    /// Flips focus/break and resets to the new mode's preset. Always leaves
    /// the countdown stopped.
    pub fn switch_mode(&mut self) {
        let next = self.timer.mode().other();
        self.reset(next);
        log_info!("Switched to {} ({}s)", next.as_str(), next.preset_seconds());
    }

    /// Explicit mode selection. Unlike [`Self::switch_mode`] this does not
    /// stop a running countdown.
    pub fn set_mode(&mut self, mode: Mode) {
        self.timer.set_mode(mode);
    }

    /// Consumes one elapsed second. On expiry the mode is switched before
    /// this returns, so the countdown never rests at zero.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.timer.tick();
        if outcome == TickOutcome::Expired {
            self.on_expiry();
        }
        outcome
    }

    /// Entry point for ticks delivered by the scheduler. Returns `None` when
    /// the tick belongs to a closed epoch.
    pub fn on_tick(&mut self, event: TickEvent) -> Option<TickOutcome> {
        if event.epoch != self.epoch || self.ticker.is_none() {
            log_warn!(
                "Dropping stale tick from epoch {} (current {})",
                event.epoch,
                self.epoch
            );
            return None;
        }
        Some(self.tick())
    }

    fn on_expiry(&mut self) {
        log_info!("{} countdown expired", self.timer.mode().as_str());
        self.switch_mode();
    }

    fn open_epoch(&mut self) {
        self.close_epoch();
        self.epoch += 1;
        self.epoch_started_at = Some(Utc::now());

        let epoch = self.epoch;
        let ticks = self.ticks.clone();
        let id = self.scheduler.schedule_repeating(
            self.tick_interval,
            Box::new(move || {
                // Receiver gone means the host is shutting down.
                let _ = ticks.send(TickEvent { epoch });
            }),
        );
        self.ticker = Some(id);
        log_info!(
            "Epoch {} started: {} with {}s remaining",
            epoch,
            self.timer.mode().as_str(),
            self.timer.remaining_seconds()
        );
    }

    fn close_epoch(&mut self) {
        if let Some(id) = self.ticker.take() {
            self.scheduler.cancel(id);
            log_info!("Epoch {} closed", self.epoch);
        }
        self.epoch_started_at = None;
    }
}

impl<S: TickScheduler> Drop for SessionController<S> {
    fn drop(&mut self) {
        if let Some(id) = self.ticker.take() {
            self.scheduler.cancel(id);
        }
    }
}
