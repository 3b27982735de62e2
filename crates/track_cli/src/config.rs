use crate::args::{Policy, Setup};
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use track_core::sweep::SweepGrid;
use track_core::track::Circuit;
use track_core::{LateralPolicy, SimulationConstants};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Constants from file (or defaults) with command-line overrides applied.
pub fn load_constants(setup: &Setup) -> Result<SimulationConstants> {
    let mut constants = match &setup.constants {
        Some(path) => read_json(path)?,
        None => SimulationConstants::default(),
    };
    if let Some(mass) = setup.mass {
        constants.mass = mass;
    }
    if let Some(dt) = setup.dt {
        constants.dt = dt;
    }
    if let Some(g_factor) = setup.g_factor {
        constants.g_factor = g_factor;
    }
    if let Some(policy) = setup.policy {
        constants.lateral_policy = match policy {
            Policy::HardCap => LateralPolicy::HardCap,
            Policy::Diagnostic => LateralPolicy::Diagnostic,
        };
    }
    constants
        .validate()
        .context("Simulation constants are not usable.")?;
    Ok(constants)
}

pub fn load_circuit(setup: &Setup) -> Result<Circuit> {
    let circuit = match &setup.circuit {
        Some(path) => read_json(path)?,
        None => Circuit::reference(),
    };
    circuit.validate().context("Circuit is not usable.")?;
    Ok(circuit)
}

pub fn load_grid(path: &Path) -> Result<SweepGrid> {
    read_json(path)
}

/// Parses `MIN:MAX:STEP` into the inclusive list of values.
pub fn parse_range(text: &str) -> Result<Vec<f64>> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        bail!("Range \"{text}\" must have the form MIN:MAX:STEP.");
    }
    let mut values = [0.0; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid number \"{part}\" in range \"{text}\"."))?;
    }
    let [min, max, step] = values;
    if step <= 0.0 || !step.is_finite() {
        bail!("Range step must be positive, got {step}.");
    }
    if max < min {
        bail!("Range maximum {max} is below minimum {min}.");
    }
    let count = ((max - min) / step + 1e-9).floor() as usize + 1;
    Ok((0..count).map(|i| min + step * i as f64).collect())
}

/// Same force range on every straight and same radius range on every corner.
pub fn uniform_grid(circuit: &Circuit, forces: &[f64], radii: &[f64]) -> SweepGrid {
    SweepGrid::from_forces(
        vec![forces.to_vec(); circuit.straights.len()],
        vec![radii.to_vec(); circuit.corners.len()],
    )
}

#[cfg(test)]
mod tests {
    use super::{parse_range, uniform_grid};
    use track_core::track::Circuit;

    #[test]
    fn parse_range_is_inclusive() {
        let values = parse_range("4:20:4").expect("valid range");
        assert_eq!(values, vec![4.0, 8.0, 12.0, 16.0, 20.0]);
        let values = parse_range("0:1:0.25").expect("valid range");
        assert_eq!(values.len(), 5);
    }

    #[test]
    fn parse_range_rejects_bad_input() {
        assert!(parse_range("1:2").is_err());
        assert!(parse_range("1:x:1").is_err());
        assert!(parse_range("5:1:1").is_err());
        assert!(parse_range("1:5:0").is_err());
    }

    #[test]
    fn uniform_grid_matches_circuit_shape() {
        let circuit = Circuit::reference();
        let grid = uniform_grid(&circuit, &[1000.0, 2000.0], &[5.0]);
        assert_eq!(grid.laws.len(), 3);
        assert_eq!(grid.radii.len(), 2);
        assert_eq!(grid.len(), 8);
    }
}
