//! Circuits described by waypoints, turned into composer legs.

use crate::constants::SimulationConstants;
use crate::dynamics::ForceLaw;
use crate::error::SimError;
use crate::segment::{CurveParams, SegmentSpec, StraightLength, StraightParams};
use crate::state::{signed_angle, KinematicState, Waypoint};
use crate::trajectory::{compose_trajectory, Aim, Leg, Trajectory};
use serde::{Deserialize, Serialize};

/// A straight drawn from `start` to `end`, driven by `law`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StraightSection {
    pub start: Waypoint,
    pub end: Waypoint,
    pub law: ForceLaw,
}

impl StraightSection {
    pub fn length(&self) -> f64 {
        (self.end.to_vector() - self.start.to_vector()).norm()
    }

    pub fn heading(&self) -> f64 {
        let d = self.end.to_vector() - self.start.to_vector();
        d.y.atan2(d.x)
    }
}

/// Corner joining two consecutive straights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Corner {
    pub radius: f64,
    #[serde(default)]
    pub target_speed: Option<f64>,
}

impl Corner {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            target_speed: None,
        }
    }
}

/// Alternating straights and corners, `corners.len() == straights.len() - 1`.
///
/// Each corner turns through the angle between its neighbouring straights. Straights
/// after a corner are re-aimed along their own direction; the last one is aimed at its
/// end waypoint and runs exactly as far as needed to reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Circuit {
    pub initial_speed: f64,
    pub straights: Vec<StraightSection>,
    pub corners: Vec<Corner>,
}

impl Circuit {
    /// The three-straight reference track, starting at 50 m/s.
    pub fn reference() -> Self {
        let section = |x0: f64, y0: f64, x1: f64, y1: f64, force: f64| StraightSection {
            start: Waypoint::new(x0, y0),
            end: Waypoint::new(x1, y1),
            law: ForceLaw::decaying(force),
        };
        Self {
            initial_speed: 50.0,
            straights: vec![
                section(2.0, 14.0, 79.3, 10.3, 15000.0),
                section(88.0, 19.0, 90.0, 48.0, 10000.0),
                section(89.0, 51.0, 36.0, 74.0, 18000.0),
            ],
            corners: vec![Corner::new(9.0), Corner::new(4.0)],
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.straights.is_empty() {
            return Err(SimError::invalid_segment("circuit has no straights"));
        }
        if self.corners.len() + 1 != self.straights.len() {
            return Err(SimError::invalid_segment(format!(
                "circuit with {} straights needs {} corners, got {}",
                self.straights.len(),
                self.straights.len() - 1,
                self.corners.len()
            )));
        }
        if !self.initial_speed.is_finite() || self.initial_speed < 0.0 {
            return Err(SimError::invalid_segment(format!(
                "initial speed must be non-negative, got {}",
                self.initial_speed
            )));
        }
        if let Some(idx) = self.straights.iter().position(|s| s.length() == 0.0) {
            return Err(SimError::invalid_segment(format!(
                "straight {idx} has coincident start and end points"
            )));
        }
        Ok(())
    }

    /// State at the start of the first straight, heading along it.
    pub fn initial_state(&self) -> Result<KinematicState, SimError> {
        self.validate()?;
        let first = &self.straights[0];
        Ok(KinematicState::new(
            first.start.x,
            first.start.y,
            self.initial_speed,
            first.heading(),
        ))
    }

    /// Signed turn angle of each corner.
    pub fn turn_angles(&self) -> Vec<f64> {
        self.straights
            .windows(2)
            .map(|pair| {
                let from = pair[0].end.to_vector() - pair[0].start.to_vector();
                let to = pair[1].end.to_vector() - pair[1].start.to_vector();
                signed_angle(from, to)
            })
            .collect()
    }

    pub fn legs(&self) -> Result<Vec<Leg>, SimError> {
        self.validate()?;
        let angles = self.turn_angles();
        let last = self.straights.len() - 1;
        let mut legs = Vec::with_capacity(2 * self.straights.len() - 1);

        for (i, straight) in self.straights.iter().enumerate() {
            if i > 0 {
                let corner = self.corners[i - 1];
                legs.push(Leg::from(SegmentSpec::Curve(CurveParams {
                    radius: corner.radius,
                    angle: angles[i - 1],
                    target_speed: corner.target_speed,
                })));
            }

            let (length, aim) = if i > 0 && i == last {
                (
                    StraightLength::ToWaypoint(straight.end),
                    Aim::Waypoint(straight.end),
                )
            } else {
                (
                    StraightLength::Distance(straight.length()),
                    Aim::Heading(straight.heading()),
                )
            };
            legs.push(Leg::aimed(
                SegmentSpec::Straight(StraightParams {
                    length,
                    law: straight.law,
                }),
                aim,
            ));
        }
        Ok(legs)
    }

    pub fn simulate(&self, constants: &SimulationConstants) -> Result<Trajectory, SimError> {
        compose_trajectory(self.initial_state()?, &self.legs()?, constants)
    }

    /// Copy of this circuit with new straight laws and corner radii.
    pub fn with_parameters(&self, laws: &[ForceLaw], radii: &[f64]) -> Result<Self, SimError> {
        if laws.len() != self.straights.len() || radii.len() != self.corners.len() {
            return Err(SimError::InvalidSweep {
                reason: format!(
                    "expected {} laws and {} radii, got {} and {}",
                    self.straights.len(),
                    self.corners.len(),
                    laws.len(),
                    radii.len()
                ),
            });
        }
        let mut circuit = self.clone();
        for (straight, law) in circuit.straights.iter_mut().zip(laws) {
            straight.law = *law;
        }
        for (corner, radius) in circuit.corners.iter_mut().zip(radii) {
            corner.radius = *radius;
        }
        Ok(circuit)
    }
}

/// Time to take a corner at the lateral limit, `|r·θ| / sqrt(a_max·r)`.
///
/// Radii under one metre are not drivable and give `None`.
pub fn corner_time_estimate(
    radius: f64,
    angle: f64,
    constants: &SimulationConstants,
) -> Option<f64> {
    if !radius.is_finite() || radius < 1.0 {
        return None;
    }
    let v_max = (constants.a_max() * radius).sqrt();
    Some((radius * angle).abs() / v_max)
}
