use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Milliseconds since the clock started. Unclamped and monotonic; this is
    /// what animations derive their deltas from.
    pub timestamp_ms: f64,

    /// Clamped time since the previous tick, in seconds.
    pub dt: f32,

    pub now: Instant,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

/// Produces one [`FrameTime`] per presented frame.
///
/// One clock per window, so windows never share delta state. `dt` is
/// clamped so a debugger pause or a minimized window does not yield a huge
/// step; `timestamp_ms` is not.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// A clock whose timestamp 0 is `origin`.
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            origin,
            last: origin,
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
        }
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            dt_min,
            dt_max,
            ..Self::new()
        }
    }

    /// Restarts delta measurement, e.g. after the surface was reconfigured.
    /// Timestamps keep counting from the original origin.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock to the current instant.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            timestamp_ms: now.saturating_duration_since(self.origin).as_secs_f64() * 1000.0,
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_milliseconds_since_origin() {
        let origin = Instant::now();
        let mut clock = FrameClock::starting_at(origin);

        let a = clock.tick_at(origin + Duration::from_millis(16));
        let b = clock.tick_at(origin + Duration::from_millis(33));

        assert!((a.timestamp_ms - 16.0).abs() < 1e-6);
        assert!((b.timestamp_ms - 33.0).abs() < 1e-6);
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
    }

    #[test]
    fn dt_is_clamped_but_timestamp_is_not() {
        let origin = Instant::now();
        let mut clock = FrameClock::starting_at(origin);

        let ft = clock.tick_at(origin + Duration::from_secs(5));
        assert!((ft.dt - 0.25).abs() < 1e-6);
        assert!((ft.timestamp_ms - 5000.0).abs() < 1e-6);
    }
}
