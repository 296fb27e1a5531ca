use crate::config::GameConfig;
use crate::types::TimerView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    CountingDown { remaining: u32 },
    /// Ran out; the session resolves it with a forced move and cancels.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Running { remaining: u32 },
    Expired,
}

/// Per-turn countdown for the local seat, driven by one tick per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTimer {
    state: TimerState,
    turn_ticks: u32,
    warning_ticks: u32,
}

impl TurnTimer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            state: TimerState::Idle,
            turn_ticks: config.turn_ticks,
            warning_ticks: config.warning_ticks,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Starts a fresh countdown, restarting one already running.
    pub fn start(&mut self) {
        self.state = TimerState::CountingDown { remaining: self.turn_ticks };
    }

    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::CountingDown { .. })
    }

    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            TimerState::Idle => TickOutcome::Idle,
            TimerState::Expired => TickOutcome::Expired,
            TimerState::CountingDown { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.state = TimerState::Expired;
                    TickOutcome::Expired
                } else {
                    self.state = TimerState::CountingDown { remaining };
                    TickOutcome::Running { remaining }
                }
            }
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        match self.state {
            TimerState::CountingDown { remaining } => Some(remaining),
            TimerState::Expired => Some(0),
            TimerState::Idle => None,
        }
    }

    pub fn warning(&self) -> bool {
        self.remaining().is_some_and(|remaining| remaining <= self.warning_ticks)
    }

    pub fn view(&self) -> TimerView {
        TimerView { remaining: self.remaining(), warning: self.warning() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> TurnTimer {
        TurnTimer::new(&GameConfig::default())
    }

    fn tick_n(timer: &mut TurnTimer, n: u32) -> TickOutcome {
        let mut last = TickOutcome::Idle;
        for _ in 0..n {
            last = timer.tick();
        }
        last
    }

    #[test]
    fn idle_timer_ignores_ticks() {
        let mut timer = timer();

        assert_eq!(timer.tick(), TickOutcome::Idle);
        assert_eq!(timer.view(), TimerView { remaining: None, warning: false });
    }

    #[test]
    fn countdown_reports_warning_at_ten_or_less() {
        let mut timer = timer();
        timer.start();
        assert_eq!(timer.remaining(), Some(30));

        tick_n(&mut timer, 10);
        assert_eq!(timer.view(), TimerView { remaining: Some(20), warning: false });

        tick_n(&mut timer, 10);
        assert_eq!(timer.view(), TimerView { remaining: Some(10), warning: true });

        tick_n(&mut timer, 1);
        assert_eq!(timer.view(), TimerView { remaining: Some(9), warning: true });
    }

    #[test]
    fn thirtieth_tick_expires() {
        let mut timer = timer();
        timer.start();

        assert_eq!(tick_n(&mut timer, 29), TickOutcome::Running { remaining: 1 });
        assert_eq!(timer.tick(), TickOutcome::Expired);
        assert_eq!(timer.state(), TimerState::Expired);
    }

    #[test]
    fn start_while_running_restarts_from_full() {
        let mut timer = timer();
        timer.start();
        tick_n(&mut timer, 17);

        timer.start();

        assert_eq!(timer.remaining(), Some(30));
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut timer = timer();
        timer.start();
        tick_n(&mut timer, 3);

        timer.cancel();

        assert!(!timer.is_running());
        assert_eq!(timer.tick(), TickOutcome::Idle);
    }
}
