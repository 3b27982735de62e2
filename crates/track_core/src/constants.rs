use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// How a curve treats speeds whose lateral acceleration `v²/r` exceeds `a_max`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LateralPolicy {
    /// Kinematic speed in the curve is capped to `sqrt(a_max * r)`.
    #[default]
    HardCap,
    /// Speed is left untouched; over-limit samples are flagged and logged.
    Diagnostic,
}

fn default_max_steps() -> usize {
    200_000
}

/// Physical parameters shared by every segment of a run.
///
/// Deserializes from `{ "mass": kg, "g": m/s², "g_factor": multiplier, "dt": s }`;
/// the remaining fields fall back to their defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimulationConstants {
    pub mass: f64,
    pub g: f64,
    pub g_factor: f64,
    pub dt: f64,
    /// Iteration ceiling for a single segment.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default)]
    pub lateral_policy: LateralPolicy,
}

impl Default for SimulationConstants {
    fn default() -> Self {
        Self {
            mass: 800.0,
            g: 9.81,
            g_factor: 6.0,
            dt: 0.01,
            max_steps: default_max_steps(),
            lateral_policy: LateralPolicy::HardCap,
        }
    }
}

impl SimulationConstants {
    /// Maximum allowed acceleration, `g_factor * g`.
    pub fn a_max(&self) -> f64 {
        self.g_factor * self.g
    }

    /// Maximum drive/brake force, `a_max * mass`.
    pub fn f_max(&self) -> f64 {
        self.a_max() * self.mass
    }

    /// Clips a force to `[-F_max, F_max]`.
    pub fn clip_force(&self, force: f64) -> f64 {
        let f_max = self.f_max();
        force.clamp(-f_max, f_max)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        for (name, value) in [
            ("mass", self.mass),
            ("g", self.g),
            ("g_factor", self.g_factor),
            ("dt", self.dt),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::invalid_constants(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if self.max_steps == 0 {
            return Err(SimError::invalid_constants(
                "max_steps must be greater than zero",
            ));
        }
        Ok(())
    }
}
