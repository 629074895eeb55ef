//! Per-entity motion state machines

use crate::error::{MotionError, Result};
use glam::{Quat, Vec3};

/// Outcome of advancing a mover by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionStep {
    /// Interpolated position inside the current segment
    Moving(Vec3),
    /// Snapped onto a waypoint; the next segment starts
    Arrived(Vec3),
    /// Snapped onto the final waypoint of a non-looping path
    Finished(Vec3),
}

impl MotionStep {
    /// Position to push for this tick
    pub fn position(&self) -> Vec3 {
        match *self {
            Self::Moving(p) | Self::Arrived(p) | Self::Finished(p) => p,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Linear waypoint follower.
///
/// Motion is distance based: a segment of length `d` at speed `s` takes
/// `d / s` seconds no matter how the ticks are sliced.
#[derive(Debug, Clone)]
pub struct KinematicMover {
    waypoints: Vec<Vec3>,
    /// Units per second
    speed: f32,
    looping: bool,
    segment: usize,
    elapsed_ms: f32,
    finished: bool,
}

impl KinematicMover {
    /// Create a mover; fewer than two waypoints or a non-positive speed
    /// is rejected
    pub fn new(waypoints: Vec<Vec3>, speed: f32, looping: bool) -> Result<Self> {
        if waypoints.len() < 2 {
            return Err(MotionError::TooFewWaypoints(waypoints.len()));
        }
        if !(speed.is_finite() && speed > 0.0) {
            return Err(MotionError::InvalidSpeed(speed));
        }

        Ok(Self {
            waypoints,
            speed,
            looping,
            segment: 0,
            elapsed_ms: 0.0,
            finished: false,
        })
    }

    /// Index of the waypoint the current segment starts from
    pub fn segment_index(&self) -> usize {
        self.segment
    }

    /// Milliseconds spent in the current segment
    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn segment_count(&self) -> usize {
        if self.looping {
            self.waypoints.len()
        } else {
            self.waypoints.len() - 1
        }
    }

    fn segment_ends(&self, index: usize) -> (Vec3, Vec3) {
        let n = self.waypoints.len();
        (self.waypoints[index], self.waypoints[(index + 1) % n])
    }

    /// Segment duration in milliseconds
    fn segment_duration_ms(&self, index: usize) -> f32 {
        let (from, to) = self.segment_ends(index);
        from.distance(to) / self.speed * 1000.0
    }

    /// Advance by one tick.
    ///
    /// Time left over after reaching a waypoint carries into the next
    /// segment. At most one waypoint is crossed per tick.
    pub fn advance(&mut self, delta_ms: f32) -> MotionStep {
        let last = self.waypoints[self.waypoints.len() - 1];
        if self.finished {
            return MotionStep::Finished(last);
        }

        self.elapsed_ms += delta_ms.max(0.0);

        let (from, to) = self.segment_ends(self.segment);
        let duration = self.segment_duration_ms(self.segment);
        let progress = if duration <= f32::EPSILON {
            1.0
        } else {
            self.elapsed_ms / duration
        };

        if progress < 1.0 {
            return MotionStep::Moving(from.lerp(to, progress));
        }

        self.elapsed_ms = (self.elapsed_ms - duration).max(0.0);
        self.segment += 1;

        if self.segment >= self.segment_count() {
            if self.looping {
                self.segment = 0;
            } else {
                self.finished = true;
                self.elapsed_ms = 0.0;
                return MotionStep::Finished(to);
            }
        }

        MotionStep::Arrived(to)
    }
}

/// Constant-rate rotation in place
#[derive(Debug, Clone)]
pub struct SpinMover {
    axis: Vec3,
    radians_per_ms: f32,
    base: Quat,
    angle: f32,
}

impl SpinMover {
    pub fn new(axis: Vec3, degrees_per_second: f32, base: Quat) -> Result<Self> {
        let axis = axis.try_normalize().ok_or(MotionError::ZeroAxis)?;
        if !degrees_per_second.is_finite() {
            return Err(MotionError::InvalidSpeed(degrees_per_second));
        }

        Ok(Self {
            axis,
            radians_per_ms: degrees_per_second.to_radians() / 1000.0,
            base,
            angle: 0.0,
        })
    }

    /// Advance by one tick and return the new orientation
    pub fn advance(&mut self, delta_ms: f32) -> Quat {
        self.angle = (self.angle + self.radians_per_ms * delta_ms.max(0.0)) % std::f32::consts::TAU;
        Quat::from_axis_angle(self.axis, self.angle) * self.base
    }
}
