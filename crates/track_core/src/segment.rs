//! Track segment descriptions.

use crate::dynamics::ForceLaw;
use crate::error::SimError;
use crate::sample::SegmentKind;
use crate::state::{KinematicState, Waypoint};
use serde::{Deserialize, Serialize};

/// How far a straight runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StraightLength {
    /// Fixed distance, m.
    Distance(f64),
    /// Distance from the hand-off position to a waypoint, resolved when the segment starts.
    ToWaypoint(Waypoint),
}

impl StraightLength {
    pub fn resolve(&self, state: &KinematicState) -> f64 {
        match *self {
            StraightLength::Distance(d) => d,
            StraightLength::ToWaypoint(p) => p.distance_from(state),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StraightParams {
    pub length: StraightLength,
    pub law: ForceLaw,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurveParams {
    /// Turn radius, m. Must be positive.
    pub radius: f64,
    /// Angle to sweep, rad. Positive turns counter-clockwise, negative clockwise.
    pub angle: f64,
    /// Optional upper bound on the speed carried through the curve, m/s.
    #[serde(default)]
    pub target_speed: Option<f64>,
}

/// One piece of track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentSpec {
    Straight(StraightParams),
    Curve(CurveParams),
}

impl SegmentSpec {
    pub fn straight(distance: f64, law: ForceLaw) -> Self {
        SegmentSpec::Straight(StraightParams {
            length: StraightLength::Distance(distance),
            law,
        })
    }

    pub fn straight_to(waypoint: Waypoint, law: ForceLaw) -> Self {
        SegmentSpec::Straight(StraightParams {
            length: StraightLength::ToWaypoint(waypoint),
            law,
        })
    }

    pub fn curve(radius: f64, angle: f64) -> Self {
        SegmentSpec::Curve(CurveParams {
            radius,
            angle,
            target_speed: None,
        })
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            SegmentSpec::Straight(_) => SegmentKind::Straight,
            SegmentSpec::Curve(_) => SegmentKind::Curve,
        }
    }

    /// Checks parameters that can be judged without running the segment.
    pub fn validate(&self) -> Result<(), SimError> {
        match self {
            SegmentSpec::Straight(params) => {
                if let StraightLength::Distance(d) = params.length {
                    if !d.is_finite() || d < 0.0 {
                        return Err(SimError::invalid_segment(format!(
                            "straight distance must be non-negative, got {d}"
                        )));
                    }
                }
                params.law.validate()
            }
            SegmentSpec::Curve(params) => {
                if !params.radius.is_finite() || params.radius <= 0.0 {
                    return Err(SimError::invalid_segment(format!(
                        "curve radius must be positive, got {}",
                        params.radius
                    )));
                }
                if !params.angle.is_finite() {
                    return Err(SimError::invalid_segment(format!(
                        "curve angle must be finite, got {}",
                        params.angle
                    )));
                }
                Ok(())
            }
        }
    }
}
