//! Segment simulator: steps RK4 over one straight or curve until its stopping
//! condition is met, recording a sample per step.

use crate::constants::{LateralPolicy, SimulationConstants};
use crate::dynamics::{CurveDynamics, ForceLaw, StraightDynamics};
use crate::error::SimError;
use crate::sample::{Sample, SampleSeries, SegmentKind, LIMIT_TOLERANCE};
use crate::solvers::RK4;
use crate::state::{KinematicState, STATE_DIM};
use crate::traits::Steppable;
use serde::Serialize;
use tracing::{debug, warn};

/// Outcome of one segment.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentRun {
    /// State at the stopping boundary, handed to the next segment.
    pub state: KinematicState,
    pub samples: SampleSeries,
    /// Time at the stopping boundary, s.
    pub end_time: f64,
    pub steps: usize,
}

impl SegmentRun {
    fn empty(state: KinematicState, t0: f64) -> Self {
        Self {
            state,
            samples: SampleSeries::new(),
            end_time: t0,
            steps: 0,
        }
    }
}

/// Runs a straight until the distance from its starting point reaches `distance`.
///
/// A non-positive `distance` returns immediately with no samples and the state unchanged.
pub fn simulate_straight(
    state: KinematicState,
    distance: f64,
    law: ForceLaw,
    t0: f64,
    constants: &SimulationConstants,
) -> Result<SegmentRun, SimError> {
    run_straight(state, distance, law, t0, constants, 0)
}

/// Runs a curve of `radius` until the heading has swept `|angle|`.
///
/// The sign of `angle` picks the turn direction (positive is counter-clockwise).
pub fn simulate_curve(
    state: KinematicState,
    radius: f64,
    angle: f64,
    t0: f64,
    constants: &SimulationConstants,
) -> Result<SegmentRun, SimError> {
    run_curve(state, radius, angle, None, t0, constants, 0)
}

fn check_inputs(
    state: &KinematicState,
    t0: f64,
    constants: &SimulationConstants,
) -> Result<(), SimError> {
    constants.validate()?;
    if !state.is_finite() {
        return Err(SimError::invalid_segment(format!(
            "initial state must be finite, got {state:?}"
        )));
    }
    if !t0.is_finite() {
        return Err(SimError::invalid_segment(format!(
            "start time must be finite, got {t0}"
        )));
    }
    Ok(())
}

pub(crate) fn run_straight(
    state: KinematicState,
    distance: f64,
    law: ForceLaw,
    t0: f64,
    constants: &SimulationConstants,
    segment: usize,
) -> Result<SegmentRun, SimError> {
    check_inputs(&state, t0, constants)?;
    law.validate()?;
    if distance.is_nan() {
        return Err(SimError::invalid_segment("straight distance is NaN"));
    }
    if distance <= 0.0 {
        return Ok(SegmentRun::empty(state, t0));
    }

    let dynamics = StraightDynamics::new(*constants, law);
    let a_max = constants.a_max();
    let dt = constants.dt;
    let mut solver = RK4::<f64>::new(STATE_DIM);
    let mut y = state.to_array();
    let mut t = t0;
    let mut samples = SampleSeries::new();
    let mut steps = 0usize;
    let mut travelled = 0.0;

    while travelled < distance {
        if steps >= constants.max_steps {
            return Err(SimError::StalledSegment {
                steps,
                progress: travelled,
                target: distance,
            });
        }

        let v_prev = y[2];
        solver.step(&dynamics, &mut t, &mut y, dt);
        steps += 1;

        let current = KinematicState::from_array(y);
        let tangential = (current.v - v_prev) / dt;
        samples.push(Sample {
            time: t,
            x: current.x,
            y: current.y,
            speed: current.v,
            tangential_accel: tangential,
            lateral_accel: 0.0,
            force: tangential * constants.mass,
            kind: SegmentKind::Straight,
            segment,
            exceeds_limit: tangential.abs() > a_max + LIMIT_TOLERANCE,
        });

        travelled = state.distance_to(&current);
    }

    let end = KinematicState::from_array(y);
    debug!(
        segment,
        steps,
        duration = t - t0,
        entry_speed = state.v,
        exit_speed = end.v,
        "straight finished"
    );

    Ok(SegmentRun {
        state: end,
        samples,
        end_time: t,
        steps,
    })
}

pub(crate) fn run_curve(
    state: KinematicState,
    radius: f64,
    angle: f64,
    target_speed: Option<f64>,
    t0: f64,
    constants: &SimulationConstants,
    segment: usize,
) -> Result<SegmentRun, SimError> {
    check_inputs(&state, t0, constants)?;
    let dynamics = CurveDynamics::new(*constants, radius, angle < 0.0, target_speed)?;
    if !angle.is_finite() {
        return Err(SimError::invalid_segment(format!(
            "curve angle must be finite, got {angle}"
        )));
    }
    let target = angle.abs();
    if target == 0.0 {
        return Ok(SegmentRun::empty(state, t0));
    }
    // Speed is constant through a curve, so a zero turn rate never recovers.
    if dynamics.kinematic_speed(state.v) <= 0.0 {
        return Err(SimError::StalledSegment {
            steps: 0,
            progress: 0.0,
            target,
        });
    }

    let a_max = constants.a_max();
    let dt = constants.dt;
    let mut solver = RK4::<f64>::new(STATE_DIM);
    let mut y = state.to_array();
    let mut t = t0;
    let mut samples = SampleSeries::new();
    let mut steps = 0usize;
    let mut swept = 0.0;
    let mut over_limit = 0usize;

    while swept < target {
        if steps >= constants.max_steps {
            return Err(SimError::StalledSegment {
                steps,
                progress: swept,
                target,
            });
        }

        solver.step(&dynamics, &mut t, &mut y, dt);
        steps += 1;

        let current = KinematicState::from_array(y);
        let lateral = dynamics.lateral_acceleration(current.v);
        let exceeds = lateral > a_max + LIMIT_TOLERANCE;
        if exceeds {
            over_limit += 1;
        }
        samples.push(Sample {
            time: t,
            x: current.x,
            y: current.y,
            speed: current.v,
            tangential_accel: 0.0,
            lateral_accel: lateral,
            force: 0.0,
            kind: SegmentKind::Curve,
            segment,
            exceeds_limit: exceeds,
        });

        swept = (current.theta - state.theta).abs();
    }

    if over_limit > 0 && constants.lateral_policy == LateralPolicy::Diagnostic {
        warn!(
            segment,
            radius,
            speed = state.v,
            safe_speed = dynamics.safe_speed(),
            samples = over_limit,
            "lateral acceleration over limit"
        );
    }

    let end = KinematicState::from_array(y);
    debug!(
        segment,
        steps,
        radius,
        duration = t - t0,
        speed = dynamics.kinematic_speed(end.v),
        "curve finished"
    );

    Ok(SegmentRun {
        state: end,
        samples,
        end_time: t,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::{simulate_curve, simulate_straight};
    use crate::constants::{LateralPolicy, SimulationConstants};
    use crate::dynamics::ForceLaw;
    use crate::error::SimError;
    use crate::state::KinematicState;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn constant_force_from_rest_matches_analytic_position() {
        let constants = SimulationConstants::default();
        let force = 8000.0;
        let start = KinematicState::new(2.0, 0.0, 0.0, 0.0);
        let run = simulate_straight(start, 50.0, ForceLaw::constant(force), 0.0, &constants)
            .expect("straight should complete");

        let a = force / constants.mass;
        for sample in run.samples.iter() {
            let expected = 2.0 + 0.5 * a * sample.time * sample.time;
            assert!(
                (sample.x - expected).abs() < 1e-8,
                "x = {} expected {} at t = {}",
                sample.x,
                expected,
                sample.time
            );
            assert!((sample.tangential_accel - a).abs() < 1e-6);
            assert!((sample.force - force).abs() < 1e-3);
            assert!(!sample.exceeds_limit);
        }
        assert!(run.state.distance_to(&start) >= 50.0);
    }

    #[test]
    fn reference_straight_gains_speed_within_expected_time() {
        let constants = SimulationConstants::default();
        let start = KinematicState::new(2.0, 14.0, 50.0, 0.0);
        let run = simulate_straight(start, 77.4, ForceLaw::decaying(15000.0), 0.0, &constants)
            .expect("straight should complete");

        assert!(run.state.v > start.v);
        assert!(
            run.end_time > 1.3 && run.end_time < 1.6,
            "segment time {}",
            run.end_time
        );
        assert_eq!(run.samples.len(), run.steps);
        let last = run.samples.last().expect("samples recorded");
        assert!((last.time - run.end_time).abs() < 1e-12);
        // last step is the first to reach the target
        let second_last = run.samples.as_slice()[run.steps - 2];
        let reached = (second_last.x - start.x).hypot(second_last.y - start.y);
        assert!(reached < 77.4);
    }

    #[test]
    fn non_positive_distance_returns_without_stepping() {
        let constants = SimulationConstants::default();
        let start = KinematicState::new(1.0, 2.0, 30.0, 0.3);
        for distance in [0.0, -5.0] {
            let run =
                simulate_straight(start, distance, ForceLaw::constant(1000.0), 4.0, &constants)
                    .expect("empty straight should succeed");
            assert!(run.samples.is_empty());
            assert_eq!(run.state, start);
            assert_eq!(run.end_time, 4.0);
            assert_eq!(run.steps, 0);
        }
    }

    #[test]
    fn straight_at_rest_without_force_stalls() {
        let constants = SimulationConstants {
            max_steps: 500,
            ..SimulationConstants::default()
        };
        let start = KinematicState::new(0.0, 0.0, 0.0, 0.0);
        let err = simulate_straight(start, 10.0, ForceLaw::constant(0.0), 0.0, &constants)
            .expect_err("should stall");
        match err {
            SimError::StalledSegment { steps, target, .. } => {
                assert_eq!(steps, 500);
                assert_eq!(target, 10.0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn curve_respects_lateral_limit_and_sweeps_angle() {
        let constants = SimulationConstants::default();
        let start = KinematicState::new(0.0, 0.0, 60.0, 0.0);
        let run = simulate_curve(start, 9.0, FRAC_PI_2, 1.0, &constants)
            .expect("curve should complete");

        assert!(!run.samples.is_empty());
        for sample in run.samples.iter() {
            assert!(sample.lateral_accel <= constants.a_max() + 1e-9);
            assert_eq!(sample.force, 0.0);
            assert!(!sample.exceeds_limit);
        }
        let swept = run.state.theta - start.theta;
        assert!(swept >= FRAC_PI_2);
        let v_safe = (constants.a_max() * 9.0).sqrt();
        assert!(swept - FRAC_PI_2 <= v_safe / 9.0 * constants.dt + 1e-12);
        // speed state is carried, not reduced
        assert_eq!(run.state.v, 60.0);
    }

    #[test]
    fn curve_traces_circle_of_given_radius() {
        let constants = SimulationConstants::default();
        let start = KinematicState::new(0.0, 0.0, 10.0, 0.0);
        let run = simulate_curve(start, 20.0, FRAC_PI_2, 0.0, &constants)
            .expect("curve should complete");
        // counter-clockwise from heading 0: centre at (0, 20)
        for sample in run.samples.iter() {
            let r = (sample.x.powi(2) + (sample.y - 20.0).powi(2)).sqrt();
            assert!((r - 20.0).abs() < 1e-6, "radius drifted to {r}");
        }
    }

    #[test]
    fn negative_angle_turns_clockwise() {
        let constants = SimulationConstants::default();
        let start = KinematicState::new(0.0, 0.0, 15.0, 0.0);
        let run = simulate_curve(start, 10.0, -FRAC_PI_4, 0.0, &constants)
            .expect("curve should complete");
        assert!(run.state.theta <= -FRAC_PI_4);
        assert!(run.state.y < 0.0);
    }

    #[test]
    fn curve_rejects_non_positive_radius() {
        let constants = SimulationConstants::default();
        let start = KinematicState::new(0.0, 0.0, 15.0, 0.0);
        for radius in [0.0, -2.0] {
            let err = simulate_curve(start, radius, FRAC_PI_2, 0.0, &constants)
                .expect_err("radius should be rejected");
            assert!(matches!(err, SimError::InvalidSegment { .. }));
        }
    }

    #[test]
    fn curve_without_speed_stalls() {
        let constants = SimulationConstants::default();
        let start = KinematicState::new(0.0, 0.0, 0.0, 0.0);
        let err = simulate_curve(start, 10.0, FRAC_PI_2, 0.0, &constants)
            .expect_err("zero speed cannot turn");
        assert!(matches!(err, SimError::StalledSegment { .. }));
    }

    #[test]
    fn diagnostic_policy_flags_over_limit_samples() {
        let constants = SimulationConstants {
            lateral_policy: LateralPolicy::Diagnostic,
            ..SimulationConstants::default()
        };
        let start = KinematicState::new(0.0, 0.0, 50.0, 0.0);
        let run = simulate_curve(start, 9.0, FRAC_PI_4, 0.0, &constants)
            .expect("curve should complete");
        assert_eq!(run.samples.violations().count(), run.samples.len());
        assert!(run.samples.peak_lateral_accel() > constants.a_max());
    }
}
