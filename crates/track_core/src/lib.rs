pub mod constants;
pub mod dynamics;
pub mod error;
pub mod sample;
pub mod segment;
pub mod simulate;
pub mod solvers;
pub mod state;
pub mod sweep;
pub mod track;
pub mod trajectory;
/// The `track_core` crate simulates a point-mass car driving a track made of straights
/// and constant-radius corners, under a longitudinal force limit and a lateral
/// acceleration limit.
///
/// Key components:
/// - **Traits**: `Scalar`, `DynamicalSystem` (vector fields), `Steppable` (solvers).
/// - **Solvers**: fixed-step RK4.
/// - **Dynamics**: straight (clipped force laws) and curve (lateral-limited speed) fields.
/// - **Simulate**: per-segment loops with distance/angle stopping conditions.
/// - **Trajectory**: composition of segments with state hand-off and re-aiming.
/// - **Track / Sweep**: waypoint circuits and parallel parameter search on top of the composer.
pub mod traits;

pub use constants::{LateralPolicy, SimulationConstants};
pub use dynamics::ForceLaw;
pub use error::SimError;
pub use sample::{Sample, SampleSeries, SegmentKind};
pub use segment::SegmentSpec;
pub use simulate::{simulate_curve, simulate_straight, SegmentRun};
pub use state::{KinematicState, Waypoint};
pub use trajectory::{compose_trajectory, Aim, Leg, Trajectory};
