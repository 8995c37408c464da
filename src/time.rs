//! Frame clock handed to every per-frame update.

/// Timing for the frame being simulated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds covered by this frame.
    pub dt: f32,
    /// Simulated seconds elapsed before this frame started.
    pub total_seconds: f64,
}

impl FrameTime {
    /// A clock at `total_seconds` stepping by `dt`.
    #[must_use]
    pub const fn new(dt: f32, total_seconds: f64) -> Self {
        Self { dt, total_seconds }
    }

    /// Moves the clock forward by `dt` and records it as the frame length.
    pub fn advance(&mut self, dt: f32) {
        self.total_seconds += f64::from(self.dt);
        self.dt = dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_previous_frame() {
        let mut clock = FrameTime::default();
        clock.advance(0.5);
        assert_eq!(clock.total_seconds, 0.0);
        clock.advance(0.25);
        assert_eq!(clock.total_seconds, 0.5);
        assert_eq!(clock.dt, 0.25);
    }
}
