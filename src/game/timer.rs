use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_secs(1);

/// One-second tick schedule for a round. The owner drives it with `poll`;
/// once cancelled, pending ticks are dropped.
#[derive(Debug, Clone, Default)]
pub struct RoundTimer {
    limit: u32,
    elapsed: u32,
    countdown: bool,
    next_tick: Option<Instant>,
}

impl RoundTimer {
    /// Starts a fresh schedule. With `countdown` off the timer still counts
    /// elapsed seconds but reports no remaining time.
    pub fn arm(&mut self, limit: u32, countdown: bool, now: Instant) {
        self.limit = limit;
        self.elapsed = 0;
        self.countdown = countdown;
        self.next_tick = if countdown && limit == 0 {
            None
        } else {
            Some(now + TICK)
        };
    }

    pub fn cancel(&mut self) {
        self.next_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Applies every tick due at `now`. Returns true if any fired.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut fired = false;
        while let Some(due) = self.next_tick {
            if due > now {
                break;
            }
            fired = true;
            self.elapsed += 1;
            // Countdown stops at zero; it never forces an answer
            self.next_tick = if self.countdown && self.elapsed >= self.limit {
                None
            } else {
                Some(due + TICK)
            };
        }
        fired
    }

    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick.map(|due| due.saturating_duration_since(now))
    }

    pub fn remaining(&self) -> u32 {
        if self.countdown {
            self.limit.saturating_sub(self.elapsed)
        } else {
            0
        }
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn countdown(&self) -> bool {
        self.countdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_and_stops_at_zero() {
        let start = Instant::now();
        let mut timer = RoundTimer::default();
        timer.arm(3, true, start);
        assert_eq!(timer.remaining(), 3);

        assert!(!timer.poll(start + Duration::from_millis(500)));
        assert!(timer.poll(start + Duration::from_millis(2100)));
        assert_eq!(timer.remaining(), 1);

        assert!(timer.poll(start + Duration::from_secs(10)));
        assert_eq!(timer.remaining(), 0);
        assert_eq!(timer.elapsed(), 3);
        assert!(!timer.is_running());
    }

    #[test]
    fn cancelled_timer_ignores_late_ticks() {
        let start = Instant::now();
        let mut timer = RoundTimer::default();
        timer.arm(30, true, start);
        timer.poll(start + Duration::from_secs(4));
        timer.cancel();
        assert!(!timer.poll(start + Duration::from_secs(20)));
        assert_eq!(timer.remaining(), 26);
        assert_eq!(timer.until_next_tick(start), None);
    }

    #[test]
    fn stopwatch_mode_keeps_counting() {
        let start = Instant::now();
        let mut timer = RoundTimer::default();
        timer.arm(5, false, start);
        timer.poll(start + Duration::from_secs(12));
        assert_eq!(timer.elapsed(), 12);
        assert_eq!(timer.remaining(), 0);
        assert!(timer.is_running());
    }
}
