use std::{collections::HashMap, time::Duration};

use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::log_info;

const ENABLE_LOGS: bool = false;

/// The countdown consumes exactly one second per tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleId(pub u64);

/// A tick stamped with the countdown epoch that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub epoch: u64,
}

/// Repeating callback source the countdown runs on.
///
/// `cancel` must take effect before it returns: once cancelled, the callback
/// is never invoked again.
pub trait TickScheduler {
    fn schedule_repeating(&mut self, interval: Duration, on_tick: TickCallback) -> ScheduleId;
    fn cancel(&mut self, id: ScheduleId);
}

/// Runs each schedule as a tokio task driven by `time::interval`.
pub struct TokioTickScheduler {
    runtime: Handle,
    tickers: HashMap<ScheduleId, JoinHandle<()>>,
    next_id: u64,
}

impl TokioTickScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            tickers: HashMap::new(),
            next_id: 0,
        }
    }
}

impl TickScheduler for TokioTickScheduler {
    fn schedule_repeating(&mut self, interval: Duration, mut on_tick: TickCallback) -> ScheduleId {
        self.next_id += 1;
        let id = ScheduleId(self.next_id);

        let handle = self.runtime.spawn(async move {
            // First tick lands one full interval after scheduling.
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                on_tick();
            }
        });

        log_info!("Scheduled ticker {:?} every {:?}", id, interval);
        self.tickers.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: ScheduleId) {
        if let Some(handle) = self.tickers.remove(&id) {
            handle.abort();
            log_info!("Cancelled ticker {:?}", id);
        }
    }
}

impl Drop for TokioTickScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tickers.drain() {
            handle.abort();
        }
    }
}
