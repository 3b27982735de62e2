//! Vector fields for the two kinds of track segment.
//!
//! Both act on the state `[x, y, v, theta]`. Control parameters are fields of the
//! dynamics value, so all four RK4 stages of a step see the same force law or radius.

use crate::constants::{LateralPolicy, SimulationConstants};
use crate::error::SimError;
use crate::state::STATE_DIM;
use crate::traits::DynamicalSystem;
use serde::{Deserialize, Serialize};

/// Reference speed for the exponential force decay, m/s.
pub const DEFAULT_V_REF: f64 = 60.0;

/// Longitudinal control law on a straight. Every law is clipped to `±F_max`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForceLaw {
    /// Fixed drive (positive) or brake (negative) force, N.
    Constant { force: f64 },
    /// `force * exp(-v / v_ref)`: net force falls off as the car speeds up.
    Decaying {
        force: f64,
        #[serde(default = "default_v_ref")]
        v_ref: f64,
    },
    /// Proportional speed control, `kp * (v_target - v)`.
    SpeedTarget { kp: f64, v_target: f64 },
}

fn default_v_ref() -> f64 {
    DEFAULT_V_REF
}

impl ForceLaw {
    pub fn constant(force: f64) -> Self {
        ForceLaw::Constant { force }
    }

    pub fn decaying(force: f64) -> Self {
        ForceLaw::Decaying {
            force,
            v_ref: DEFAULT_V_REF,
        }
    }

    /// Unclipped force requested at speed `v`.
    pub fn raw_force(&self, v: f64) -> f64 {
        match *self {
            ForceLaw::Constant { force } => force,
            ForceLaw::Decaying { force, v_ref } => force * (-v / v_ref).exp(),
            ForceLaw::SpeedTarget { kp, v_target } => kp * (v_target - v),
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            ForceLaw::Constant { force } => {
                if !force.is_finite() {
                    return Err(SimError::invalid_segment(format!(
                        "force must be finite, got {force}"
                    )));
                }
            }
            ForceLaw::Decaying { force, v_ref } => {
                if !force.is_finite() {
                    return Err(SimError::invalid_segment(format!(
                        "force must be finite, got {force}"
                    )));
                }
                if !v_ref.is_finite() || v_ref <= 0.0 {
                    return Err(SimError::invalid_segment(format!(
                        "v_ref must be positive, got {v_ref}"
                    )));
                }
            }
            ForceLaw::SpeedTarget { kp, v_target } => {
                if !kp.is_finite() || kp <= 0.0 {
                    return Err(SimError::invalid_segment(format!(
                        "kp must be positive, got {kp}"
                    )));
                }
                if !v_target.is_finite() {
                    return Err(SimError::invalid_segment(format!(
                        "v_target must be finite, got {v_target}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Straight-line motion: heading fixed, speed driven by a clipped force law.
#[derive(Debug, Clone, Copy)]
pub struct StraightDynamics {
    constants: SimulationConstants,
    law: ForceLaw,
}

impl StraightDynamics {
    pub fn new(constants: SimulationConstants, law: ForceLaw) -> Self {
        Self { constants, law }
    }

    /// Force actually applied at speed `v`, after saturation.
    pub fn applied_force(&self, v: f64) -> f64 {
        self.constants.clip_force(self.law.raw_force(v))
    }

    pub fn acceleration(&self, v: f64) -> f64 {
        self.applied_force(v) / self.constants.mass
    }
}

impl DynamicalSystem<f64> for StraightDynamics {
    fn dimension(&self) -> usize {
        STATE_DIM
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        let (v, theta) = (x[2], x[3]);
        out[0] = v * theta.cos();
        out[1] = v * theta.sin();
        out[2] = self.acceleration(v);
        out[3] = 0.0;
    }
}

/// Constant-radius turn: speed held, heading rotating at `v_used / radius`.
#[derive(Debug, Clone, Copy)]
pub struct CurveDynamics {
    constants: SimulationConstants,
    radius: f64,
    /// +1 for counter-clockwise, -1 for clockwise.
    direction: f64,
    target_speed: Option<f64>,
}

impl CurveDynamics {
    /// Fails with [`SimError::InvalidSegment`] unless `radius` is positive and finite.
    pub fn new(
        constants: SimulationConstants,
        radius: f64,
        clockwise: bool,
        target_speed: Option<f64>,
    ) -> Result<Self, SimError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SimError::invalid_segment(format!(
                "curve radius must be positive, got {radius}"
            )));
        }
        if let Some(speed) = target_speed {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(SimError::invalid_segment(format!(
                    "curve target speed must be positive, got {speed}"
                )));
            }
        }
        Ok(Self {
            constants,
            radius,
            direction: if clockwise { -1.0 } else { 1.0 },
            target_speed,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Highest speed whose lateral acceleration stays within `a_max`.
    pub fn safe_speed(&self) -> f64 {
        (self.constants.a_max() * self.radius).sqrt()
    }

    /// Speed used for the kinematics when the state carries speed `v`.
    pub fn kinematic_speed(&self, v: f64) -> f64 {
        let limited = match self.constants.lateral_policy {
            LateralPolicy::HardCap => v.min(self.safe_speed()),
            LateralPolicy::Diagnostic => v,
        };
        match self.target_speed {
            Some(target) => limited.min(target),
            None => limited,
        }
    }

    /// Centripetal acceleration `v_used² / r` at state speed `v`.
    pub fn lateral_acceleration(&self, v: f64) -> f64 {
        let speed = self.kinematic_speed(v);
        speed * speed / self.radius
    }
}

impl DynamicalSystem<f64> for CurveDynamics {
    fn dimension(&self) -> usize {
        STATE_DIM
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        let speed = self.kinematic_speed(x[2]);
        let theta = x[3];
        out[0] = speed * theta.cos();
        out[1] = speed * theta.sin();
        out[2] = 0.0;
        out[3] = self.direction * speed / self.radius;
    }
}

#[cfg(test)]
mod tests {
    use super::{CurveDynamics, ForceLaw, StraightDynamics};
    use crate::constants::{LateralPolicy, SimulationConstants};
    use crate::error::SimError;
    use crate::traits::DynamicalSystem;

    #[test]
    fn straight_clips_force_to_limit() {
        let constants = SimulationConstants::default();
        let dynamics = StraightDynamics::new(constants, ForceLaw::constant(1.0e6));
        let mut out = [0.0; 4];
        dynamics.apply(0.0, &[0.0, 0.0, 10.0, 0.0], &mut out);
        assert!((out[2] - constants.a_max()).abs() < 1e-12);
        assert_eq!(out[3], 0.0);

        let braking = StraightDynamics::new(constants, ForceLaw::constant(-1.0e6));
        assert!((braking.acceleration(10.0) + constants.a_max()).abs() < 1e-12);
    }

    #[test]
    fn straight_velocity_follows_heading() {
        let dynamics =
            StraightDynamics::new(SimulationConstants::default(), ForceLaw::constant(0.0));
        let mut out = [0.0; 4];
        let theta = std::f64::consts::FRAC_PI_3;
        dynamics.apply(0.0, &[5.0, 5.0, 20.0, theta], &mut out);
        assert!((out[0] - 20.0 * theta.cos()).abs() < 1e-12);
        assert!((out[1] - 20.0 * theta.sin()).abs() < 1e-12);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn decaying_force_falls_with_speed() {
        let law = ForceLaw::decaying(15000.0);
        assert_eq!(law.raw_force(0.0), 15000.0);
        let expected = 15000.0 * (-1.0_f64).exp();
        assert!((law.raw_force(60.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn speed_target_law_drives_towards_target() {
        let constants = SimulationConstants::default();
        let law = ForceLaw::SpeedTarget {
            kp: 500.0,
            v_target: 40.0,
        };
        let dynamics = StraightDynamics::new(constants, law);
        assert!(dynamics.applied_force(30.0) > 0.0);
        assert!(dynamics.applied_force(50.0) < 0.0);
        assert_eq!(dynamics.applied_force(40.0), 0.0);
        // far from target: saturates
        assert_eq!(dynamics.applied_force(-1000.0), constants.f_max());
    }

    #[test]
    fn force_law_validation() {
        assert!(ForceLaw::constant(f64::INFINITY).validate().is_err());
        assert!(ForceLaw::Decaying {
            force: 1000.0,
            v_ref: 0.0
        }
        .validate()
        .is_err());
        assert!(ForceLaw::SpeedTarget {
            kp: -1.0,
            v_target: 10.0
        }
        .validate()
        .is_err());
        assert!(ForceLaw::decaying(1000.0).validate().is_ok());
    }

    #[test]
    fn curve_caps_speed_to_lateral_limit() {
        let constants = SimulationConstants::default();
        let curve = CurveDynamics::new(constants, 9.0, false, None).expect("valid curve");
        let v_safe = (constants.a_max() * 9.0).sqrt();
        assert!((curve.kinematic_speed(50.0) - v_safe).abs() < 1e-12);
        assert_eq!(curve.kinematic_speed(10.0), 10.0);
        assert!(curve.lateral_acceleration(50.0) <= constants.a_max() + 1e-9);

        let mut out = [0.0; 4];
        curve.apply(0.0, &[0.0, 0.0, 50.0, 0.0], &mut out);
        assert!((out[0] - v_safe).abs() < 1e-12);
        assert_eq!(out[2], 0.0);
        assert!((out[3] - v_safe / 9.0).abs() < 1e-12);
    }

    #[test]
    fn clockwise_curve_turns_negative() {
        let curve = CurveDynamics::new(SimulationConstants::default(), 20.0, true, None)
            .expect("valid curve");
        let mut out = [0.0; 4];
        curve.apply(0.0, &[0.0, 0.0, 10.0, 0.0], &mut out);
        assert!((out[3] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn curve_target_speed_caps_further() {
        let curve = CurveDynamics::new(SimulationConstants::default(), 30.0, false, Some(12.0))
            .expect("valid curve");
        assert_eq!(curve.kinematic_speed(25.0), 12.0);
        assert_eq!(curve.kinematic_speed(8.0), 8.0);
    }

    #[test]
    fn diagnostic_policy_leaves_speed_over_budget() {
        let constants = SimulationConstants {
            lateral_policy: LateralPolicy::Diagnostic,
            ..SimulationConstants::default()
        };
        let curve = CurveDynamics::new(constants, 9.0, false, None).expect("valid curve");
        assert_eq!(curve.kinematic_speed(50.0), 50.0);
        assert!(curve.lateral_acceleration(50.0) > constants.a_max());
    }

    #[test]
    fn curve_rejects_non_positive_radius() {
        for radius in [0.0, -3.0, f64::NAN] {
            let err = CurveDynamics::new(SimulationConstants::default(), radius, false, None)
                .expect_err("radius should be rejected");
            assert!(matches!(err, SimError::InvalidSegment { .. }));
        }
    }
}
