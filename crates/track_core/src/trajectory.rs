//! Trajectory composer: runs segments in order, handing each one's final state to the next.

use crate::constants::SimulationConstants;
use crate::error::SimError;
use crate::sample::{SampleSeries, SegmentKind};
use crate::segment::SegmentSpec;
use crate::simulate::{run_curve, run_straight, SegmentRun};
use crate::state::{KinematicState, Waypoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Heading override applied between segments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Aim {
    /// Absolute heading, rad.
    Heading(f64),
    /// Point the vehicle at a waypoint from wherever it is.
    Waypoint(Waypoint),
}

impl Aim {
    fn heading_from(&self, state: &KinematicState) -> f64 {
        match *self {
            Aim::Heading(theta) => theta,
            Aim::Waypoint(p) => state.heading_to(p),
        }
    }
}

/// A segment plus an optional re-aim performed before it starts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Leg {
    pub segment: SegmentSpec,
    #[serde(default)]
    pub aim: Option<Aim>,
}

impl Leg {
    pub fn aimed(segment: SegmentSpec, aim: Aim) -> Self {
        Self {
            segment,
            aim: Some(aim),
        }
    }
}

impl From<SegmentSpec> for Leg {
    fn from(segment: SegmentSpec) -> Self {
        Self { segment, aim: None }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentSummary {
    pub index: usize,
    pub kind: SegmentKind,
    pub start_time: f64,
    pub duration: f64,
    pub steps: usize,
    pub entry_speed: f64,
    pub exit_speed: f64,
    pub end_state: KinematicState,
}

/// Concatenated result of a full run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Trajectory {
    pub samples: SampleSeries,
    /// Elapsed time over all segments, s.
    pub total_time: f64,
    pub final_state: KinematicState,
    pub segments: Vec<SegmentSummary>,
}

/// Runs `legs` in order starting from `initial` at t = 0.
///
/// Any segment failure aborts the whole run; the error carries the leg index.
pub fn compose_trajectory(
    initial: KinematicState,
    legs: &[Leg],
    constants: &SimulationConstants,
) -> Result<Trajectory, SimError> {
    constants.validate()?;

    let mut state = initial;
    let mut t = 0.0;
    let mut samples = SampleSeries::new();
    let mut segments = Vec::with_capacity(legs.len());

    for (index, leg) in legs.iter().enumerate() {
        if let Some(aim) = leg.aim {
            let theta = aim.heading_from(&state);
            if !theta.is_finite() {
                return Err(SimError::invalid_segment(format!(
                    "aim produced a non-finite heading {theta}"
                ))
                .at_segment(index));
            }
            state = state.with_heading(theta);
        }

        let run = run_leg(&leg.segment, state, t, constants, index)
            .map_err(|err| err.at_segment(index))?;

        segments.push(SegmentSummary {
            index,
            kind: leg.segment.kind(),
            start_time: t,
            duration: run.end_time - t,
            steps: run.steps,
            entry_speed: state.v,
            exit_speed: run.state.v,
            end_state: run.state,
        });

        state = run.state;
        t = run.end_time;
        samples.append(run.samples);
    }

    debug!(
        segments = legs.len(),
        samples = samples.len(),
        total_time = t,
        "trajectory composed"
    );

    Ok(Trajectory {
        samples,
        total_time: t,
        final_state: state,
        segments,
    })
}

fn run_leg(
    segment: &SegmentSpec,
    state: KinematicState,
    t0: f64,
    constants: &SimulationConstants,
    index: usize,
) -> Result<SegmentRun, SimError> {
    segment.validate()?;
    match segment {
        SegmentSpec::Straight(params) => {
            let distance = params.length.resolve(&state);
            run_straight(state, distance, params.law, t0, constants, index)
        }
        SegmentSpec::Curve(params) => run_curve(
            state,
            params.radius,
            params.angle,
            params.target_speed,
            t0,
            constants,
            index,
        ),
    }
}
