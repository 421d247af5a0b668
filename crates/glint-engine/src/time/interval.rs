use std::time::{Duration, Instant};

/// Fixed-cadence wall-clock timer, polled from the event loop.
///
/// Fires at most once per poll. After a stall the next deadline is pushed
/// past `now` instead of replaying every missed period.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    deadline: Instant,
    fired: u64,
}

impl IntervalTimer {
    /// First deadline is one `period` after `start`.
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            deadline: start + period,
            fired: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// When the timer next fires.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Number of times the timer has fired.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Returns `true` if the deadline has passed, and schedules the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.deadline {
            return false;
        }

        self.deadline += self.period;
        if self.deadline <= now {
            self.deadline = now + self.period;
        }
        self.fired += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_millis(1000);

    #[test]
    fn fires_once_per_period() {
        let start = Instant::now();
        let mut timer = IntervalTimer::new(SECOND, start);

        assert!(!timer.poll(start + Duration::from_millis(999)));
        assert!(timer.poll(start + SECOND));
        assert!(!timer.poll(start + Duration::from_millis(1500)));
        assert!(timer.poll(start + 2 * SECOND));
        assert_eq!(timer.fired(), 2);
    }

    #[test]
    fn keeps_cadence_when_polled_late() {
        let start = Instant::now();
        let mut timer = IntervalTimer::new(SECOND, start);

        assert!(timer.poll(start + Duration::from_millis(1100)));
        assert_eq!(timer.deadline(), start + 2 * SECOND);
    }

    #[test]
    fn long_stall_fires_once() {
        let start = Instant::now();
        let mut timer = IntervalTimer::new(SECOND, start);
        let late = start + 10 * SECOND;

        assert!(timer.poll(late));
        assert!(!timer.poll(late));
        assert_eq!(timer.deadline(), late + SECOND);
    }
}
