//! Brute-force search over straight force laws and corner radii.
//!
//! Every candidate is an independent run with its own state, so candidates are
//! evaluated in parallel. Candidates whose run fails are dropped from the ranking.

use crate::constants::SimulationConstants;
use crate::dynamics::ForceLaw;
use crate::error::SimError;
use crate::track::Circuit;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Candidate values per straight (`laws`) and per corner (`radii`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SweepGrid {
    pub laws: Vec<Vec<ForceLaw>>,
    pub radii: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub laws: Vec<ForceLaw>,
    pub radii: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SweepResult {
    pub candidate: Candidate,
    pub total_time: f64,
    pub peak_accel: f64,
    pub violations: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SweepReport {
    /// Successful candidates, fastest first.
    pub ranked: Vec<SweepResult>,
    pub evaluated: usize,
    pub excluded: usize,
}

impl SweepReport {
    pub fn top(&self, n: usize) -> &[SweepResult] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    pub fn best(&self) -> Option<&SweepResult> {
        self.ranked.first()
    }
}

impl SweepGrid {
    /// Grid with `Decaying` laws built from raw force values.
    pub fn from_forces(forces: Vec<Vec<f64>>, radii: Vec<Vec<f64>>) -> Self {
        let laws = forces
            .into_iter()
            .map(|axis| axis.into_iter().map(ForceLaw::decaying).collect())
            .collect();
        Self { laws, radii }
    }

    /// Number of candidates in the Cartesian product.
    pub fn len(&self) -> usize {
        self.axis_sizes().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn axis_sizes(&self) -> Vec<usize> {
        self.laws
            .iter()
            .map(Vec::len)
            .chain(self.radii.iter().map(Vec::len))
            .collect()
    }

    /// Enumerates every combination, last axis varying fastest.
    pub fn candidates(&self) -> Vec<Candidate> {
        let sizes = self.axis_sizes();
        let total = self.len();
        let n_laws = self.laws.len();
        let mut out = Vec::with_capacity(total);
        let mut index = vec![0usize; sizes.len()];

        for _ in 0..total {
            out.push(Candidate {
                laws: (0..n_laws).map(|a| self.laws[a][index[a]]).collect(),
                radii: (0..self.radii.len())
                    .map(|a| self.radii[a][index[n_laws + a]])
                    .collect(),
            });

            for axis in (0..sizes.len()).rev() {
                index[axis] += 1;
                if index[axis] < sizes[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
        out
    }
}

/// Runs every candidate of `grid` on `base` and ranks the ones that finish.
pub fn sweep(
    base: &Circuit,
    grid: &SweepGrid,
    constants: &SimulationConstants,
) -> Result<SweepReport, SimError> {
    constants.validate()?;
    base.validate()?;
    if grid.laws.len() != base.straights.len() || grid.radii.len() != base.corners.len() {
        return Err(SimError::InvalidSweep {
            reason: format!(
                "grid has {} law axes and {} radius axes, circuit has {} straights and {} corners",
                grid.laws.len(),
                grid.radii.len(),
                base.straights.len(),
                base.corners.len()
            ),
        });
    }
    if grid.is_empty() {
        return Err(SimError::InvalidSweep {
            reason: "grid has an empty axis".to_string(),
        });
    }

    let candidates = grid.candidates();
    let evaluated = candidates.len();
    debug!(candidates = evaluated, "starting sweep");

    let outcomes: Vec<Option<SweepResult>> = candidates
        .into_par_iter()
        .map(|candidate| evaluate(base, candidate, constants))
        .collect();

    let mut ranked: Vec<SweepResult> = outcomes.into_iter().flatten().collect();
    ranked.sort_by(|a, b| a.total_time.total_cmp(&b.total_time));
    let excluded = evaluated - ranked.len();

    debug!(
        evaluated,
        excluded,
        best = ?ranked.first().map(|r| r.total_time),
        "sweep finished"
    );

    Ok(SweepReport {
        ranked,
        evaluated,
        excluded,
    })
}

fn evaluate(
    base: &Circuit,
    candidate: Candidate,
    constants: &SimulationConstants,
) -> Option<SweepResult> {
    let outcome = base
        .with_parameters(&candidate.laws, &candidate.radii)
        .and_then(|circuit| circuit.simulate(constants));
    match outcome {
        Ok(trajectory) => Some(SweepResult {
            total_time: trajectory.total_time,
            peak_accel: trajectory.samples.peak_total_accel(),
            violations: trajectory.samples.violations().count(),
            candidate,
        }),
        Err(err) => {
            trace!(?candidate, %err, "candidate excluded");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{sweep, SweepGrid};
    use crate::constants::SimulationConstants;
    use crate::error::SimError;
    use crate::track::Circuit;

    fn small_grid() -> SweepGrid {
        SweepGrid::from_forces(
            vec![
                vec![10000.0, 30000.0],
                vec![10000.0],
                vec![18000.0, 40000.0],
            ],
            vec![vec![9.0, 15.0], vec![-2.0, 4.0]],
        )
    }

    #[test]
    fn candidates_cover_cartesian_product() {
        let grid = small_grid();
        assert_eq!(grid.len(), 16);
        let candidates = grid.candidates();
        assert_eq!(candidates.len(), 16);
        assert_eq!(candidates[0].radii, vec![9.0, -2.0]);
        assert_eq!(candidates[1].radii, vec![9.0, 4.0]);
        for (i, a) in candidates.iter().enumerate() {
            for b in &candidates[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn sweep_excludes_failures_and_ranks_by_time() {
        let constants = SimulationConstants::default();
        let report = sweep(&Circuit::reference(), &small_grid(), &constants).expect("sweep runs");

        assert_eq!(report.evaluated, 16);
        // every candidate with a negative radius fails
        assert_eq!(report.excluded, 8);
        assert_eq!(report.ranked.len(), 8);
        for pair in report.ranked.windows(2) {
            assert!(pair[0].total_time <= pair[1].total_time);
        }
        assert!(report.ranked.iter().all(|r| r.candidate.radii[1] > 0.0));
        assert_eq!(report.top(3).len(), 3);
        assert_eq!(report.top(100).len(), 8);

        let best = report.best().expect("at least one candidate");
        let circuit = Circuit::reference()
            .with_parameters(&best.candidate.laws, &best.candidate.radii)
            .expect("dimensions match");
        let rerun = circuit.simulate(&constants).expect("best candidate reruns");
        assert_eq!(rerun.total_time, best.total_time);
    }

    #[test]
    fn sweep_rejects_grid_of_wrong_shape() {
        let grid = SweepGrid::from_forces(vec![vec![1000.0]], vec![]);
        let err = sweep(
            &Circuit::reference(),
            &grid,
            &SimulationConstants::default(),
        )
        .expect_err("shape mismatch");
        assert!(matches!(err, SimError::InvalidSweep { .. }));

        let mut grid = small_grid();
        grid.radii[0].clear();
        assert!(grid.is_empty());
        assert!(sweep(
            &Circuit::reference(),
            &grid,
            &SimulationConstants::default()
        )
        .is_err());
    }
}
