use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub const FOCUS_SECONDS: u32 = 25 * 60;
pub const BREAK_SECONDS: u32 = 5 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Focus,
    Break,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Focus
    }
}

impl Mode {
    /// Countdown length for this mode, in seconds.
    pub fn preset_seconds(self) -> u32 {
        match self {
            Mode::Focus => FOCUS_SECONDS,
            Mode::Break => BREAK_SECONDS,
        }
    }

    pub fn other(self) -> Mode {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::Break => "break",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown mode '{0}', expected focus or break")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "focus" => Ok(Mode::Focus),
            "break" => Ok(Mode::Break),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub mode: Mode,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle(Mode::default())
    }
}

impl TimerState {
    pub fn idle(mode: Mode) -> Self {
        Self {
            remaining_seconds: mode.preset_seconds(),
            is_running: false,
            mode,
        }
    }

    /// Remaining time as `MM:SS`.
    pub fn clock(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }
}

/// Result of feeding one tick into the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown was paused; nothing changed.
    Idle,
    /// One second was consumed.
    Counted { remaining_seconds: u32 },
    /// The countdown hit zero. The owner must switch mode and reset.
    Expired,
}

/// The countdown half of the session: remaining time, running flag and mode.
///
/// Knows nothing about scheduling. Whoever owns it decides when a second
/// has elapsed and what happens on expiry.
#[derive(Debug, Clone, Default)]
pub struct CountdownTimer {
    state: TimerState,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.state.remaining_seconds
    }

    pub fn start(&mut self) {
        self.state.is_running = true;
    }

    pub fn pause(&mut self) {
        self.state.is_running = false;
    }

    pub fn toggle(&mut self) {
        self.state.is_running = !self.state.is_running;
    }

    pub fn reset(&mut self, mode: Mode) {
        self.state = TimerState::idle(mode);
    }

    /// Relabels the countdown without stopping it. Remaining time is only
    /// touched when it would exceed the new mode's preset.
    pub fn set_mode(&mut self, mode: Mode) {
        self.state.mode = mode;
        self.state.remaining_seconds = self.state.remaining_seconds.min(mode.preset_seconds());
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_running {
            return TickOutcome::Idle;
        }

        if self.state.remaining_seconds > 0 {
            self.state.remaining_seconds -= 1;
        }

        if self.state.remaining_seconds == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Counted {
                remaining_seconds: self.state.remaining_seconds,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(Mode::Focus.preset_seconds(), 1500);
        assert_eq!(Mode::Break.preset_seconds(), 300);
        assert_eq!(Mode::Focus.other(), Mode::Break);
        assert_eq!(Mode::Break.other(), Mode::Focus);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("FOCUS".parse::<Mode>(), Ok(Mode::Focus));
        assert_eq!("break".parse::<Mode>(), Ok(Mode::Break));
        let err = "nap".parse::<Mode>().unwrap_err();
        assert_eq!(err.to_string(), "unknown mode 'nap', expected focus or break");
    }

    #[test]
    fn test_initial_state() {
        let timer = CountdownTimer::new();
        assert_eq!(timer.mode(), Mode::Focus);
        assert_eq!(timer.remaining_seconds(), 1500);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_reset_restores_preset_and_stops() {
        for mode in [Mode::Focus, Mode::Break] {
            let mut timer = CountdownTimer::new();
            timer.start();
            timer.tick();
            timer.tick();
            timer.reset(mode);
            assert_eq!(timer.remaining_seconds(), mode.preset_seconds());
            assert!(!timer.is_running());
            assert_eq!(timer.mode(), mode);
        }
    }

    #[test]
    fn test_tick_decrements_by_one() {
        let mut timer = CountdownTimer::new();
        timer.start();
        assert_eq!(
            timer.tick(),
            TickOutcome::Counted {
                remaining_seconds: 1499
            }
        );
        assert_eq!(timer.mode(), Mode::Focus);
    }

    #[test]
    fn test_tick_while_paused_is_noop() {
        let mut timer = CountdownTimer::new();
        timer.start();
        timer.tick();
        timer.pause();
        assert_eq!(timer.tick(), TickOutcome::Idle);
        assert_eq!(timer.remaining_seconds(), 1499);
    }

    #[test]
    fn test_redundant_start_and_pause() {
        let mut timer = CountdownTimer::new();
        timer.pause();
        assert!(!timer.is_running());
        timer.start();
        timer.start();
        assert!(timer.is_running());
        timer.toggle();
        assert!(!timer.is_running());
    }

    #[test]
    fn test_tick_reports_expiry_at_zero() {
        let mut timer = CountdownTimer::new();
        timer.reset(Mode::Break);
        timer.start();
        for _ in 0..299 {
            assert!(matches!(timer.tick(), TickOutcome::Counted { .. }));
        }
        assert_eq!(timer.tick(), TickOutcome::Expired);
        assert_eq!(timer.remaining_seconds(), 0);
    }

    #[test]
    fn test_set_mode_keeps_running_and_clamps() {
        let mut timer = CountdownTimer::new();
        timer.start();
        timer.tick();
        timer.set_mode(Mode::Break);
        assert!(timer.is_running());
        assert_eq!(timer.mode(), Mode::Break);
        assert_eq!(timer.remaining_seconds(), 300);

        timer.set_mode(Mode::Focus);
        assert_eq!(timer.remaining_seconds(), 300);
    }

    #[test]
    fn test_clock_format() {
        let mut state = TimerState::idle(Mode::Focus);
        assert_eq!(state.clock(), "25:00");
        state.remaining_seconds = 61;
        assert_eq!(state.clock(), "01:01");
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_value(TimerState::default()).unwrap();
        assert_eq!(json["remainingSeconds"], 1500);
        assert_eq!(json["isRunning"], false);
        assert_eq!(json["mode"], "focus");
    }
}
