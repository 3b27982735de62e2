//! Kinematic state of the point-mass vehicle and planar geometry helpers.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Number of components in the integrated state vector `[x, y, v, theta]`.
pub const STATE_DIM: usize = 4;

/// Instantaneous vehicle state: position (m), scalar speed (m/s) and heading (rad).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct KinematicState {
    pub x: f64,
    pub y: f64,
    pub v: f64,
    pub theta: f64,
}

impl KinematicState {
    pub fn new(x: f64, y: f64, v: f64, theta: f64) -> Self {
        Self { x, y, v, theta }
    }

    pub fn to_array(self) -> [f64; STATE_DIM] {
        [self.x, self.y, self.v, self.theta]
    }

    pub fn from_array(values: [f64; STATE_DIM]) -> Self {
        let [x, y, v, theta] = values;
        Self { x, y, v, theta }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean distance between the positions of two states.
    pub fn distance_to(&self, other: &KinematicState) -> f64 {
        (other.position() - self.position()).norm()
    }

    /// Same position and speed, new heading.
    pub fn with_heading(self, theta: f64) -> Self {
        Self { theta, ..self }
    }

    /// Heading that points from this state's position at `target`.
    pub fn heading_to(&self, target: Waypoint) -> f64 {
        let d = target.to_vector() - self.position();
        d.y.atan2(d.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.v.is_finite() && self.theta.is_finite()
    }
}

/// A fixed point on the track plane, in meters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
}

impl Waypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn distance_from(self, state: &KinematicState) -> f64 {
        (self.to_vector() - state.position()).norm()
    }
}

/// Signed angle (rad, in `(-π, π]`) that rotates direction `from` onto direction `to`.
/// Positive is counter-clockwise.
pub fn signed_angle(from: Vector2<f64>, to: Vector2<f64>) -> f64 {
    let cross = from.x * to.y - from.y * to.x;
    cross.atan2(from.dot(&to))
}
