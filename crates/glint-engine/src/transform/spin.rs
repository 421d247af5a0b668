use glam::Mat4;

use super::matrix::rotate_z;

/// Radians of rotation per millisecond of frame time.
pub const DEFAULT_ANGULAR_RATE: f32 = 0.002;

/// Accumulating rotation about Z driven by frame timestamps.
///
/// The first timestamp only establishes the baseline; every later one
/// rotates the model by `(now - previous) * rate`. Timestamps that go
/// backwards contribute nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Spin {
    rate: f32,
    previous_ms: Option<f64>,
    angle: f32,
}

impl Spin {
    pub fn new(rate: f32) -> Self {
        Self {
            rate,
            previous_ms: None,
            angle: 0.0,
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Total rotation applied so far, in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advances to `timestamp_ms` and returns the angle step for this frame.
    pub fn advance(&mut self, timestamp_ms: f64) -> f32 {
        let delta_ms = match self.previous_ms {
            Some(prev) => (timestamp_ms - prev).max(0.0),
            None => 0.0,
        };
        self.previous_ms = Some(timestamp_ms);

        let step = delta_ms as f32 * self.rate;
        self.angle += step;
        step
    }

    /// Advances and composes this frame's step onto `model`.
    pub fn apply(&mut self, model: &mut Mat4, timestamp_ms: f64) {
        let step = self.advance(timestamp_ms);
        if step != 0.0 {
            rotate_z(model, step);
        }
    }
}

impl Default for Spin {
    fn default() -> Self {
        Self::new(DEFAULT_ANGULAR_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_no_delta() {
        let mut spin = Spin::default();
        assert_eq!(spin.advance(1234.0), 0.0);
        assert_eq!(spin.angle(), 0.0);
    }

    #[test]
    fn accumulates_across_frames() {
        let mut spin = Spin::default();
        for t in [0.0, 16.0, 33.0] {
            spin.advance(t);
        }
        assert!((spin.angle() - 0.066).abs() < 1e-6);
    }

    #[test]
    fn backwards_time_is_ignored() {
        let mut spin = Spin::default();
        spin.advance(100.0);
        assert_eq!(spin.advance(50.0), 0.0);
        assert!((spin.advance(60.0) - 0.02).abs() < 1e-6);
    }

    #[test]
    fn apply_rotates_model_by_total_angle() {
        let mut spin = Spin::default();
        let mut model = Mat4::IDENTITY;
        for t in [0.0, 16.0, 33.0] {
            spin.apply(&mut model, t);
        }
        assert!(model.abs_diff_eq(Mat4::from_rotation_z(0.066), 1e-5));
    }
}
