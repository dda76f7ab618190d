pub mod controller;
pub mod scheduler;
pub mod state;

pub use controller::{SessionController, TimerSnapshot};
pub use scheduler::{ScheduleId, TickEvent, TickScheduler, TokioTickScheduler, TICK_INTERVAL};
pub use state::{CountdownTimer, Mode, ParseModeError, TickOutcome, TimerState};
