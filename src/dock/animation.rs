//! Snap animation between two points

use std::time::Duration;

use super::geometry::Point;

/// Default length of the snap-to-edge animation
pub const DEFAULT_SNAP_DURATION: Duration = Duration::from_millis(250);

/// Moves a point from `from` to `to` over `duration` with an ease-out curve
#[derive(Debug, Clone, PartialEq)]
pub struct SnapAnimation {
    from: Point,
    to: Point,
    duration: Duration,
    elapsed: Duration,
}

impl SnapAnimation {
    pub fn new(from: Point, to: Point, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Where the animation ends
    pub fn target(&self) -> Point {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advances the clock by `dt` and returns the new position
    pub fn advance(&mut self, dt: Duration) -> Point {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.current()
    }

    /// Position at the current point in time
    pub fn current(&self) -> Point {
        if self.is_finished() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let eased = ease_out_cubic(t);
        Point::new(
            self.from.x + (self.to.x - self.from.x) * eased,
            self.from.y + (self.to.y - self.from.y) * eased,
        )
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}
