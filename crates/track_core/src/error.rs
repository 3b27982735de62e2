//! Error types for segment simulation and trajectory composition.

use thiserror::Error;

/// Errors returned by the simulation entry points.
///
/// Limit violations are not errors: they are flagged on each
/// [`Sample`](crate::sample::Sample) and the run continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Physical constants that cannot drive a simulation
    #[error("Invalid simulation constants: {reason}")]
    InvalidConstants { reason: String },

    /// Segment parameters outside the model's domain (e.g. radius <= 0)
    #[error("Invalid segment: {reason}")]
    InvalidSegment { reason: String },

    /// Stopping condition not met within the iteration ceiling
    #[error("Segment stalled after {steps} steps: progress {progress} of target {target}")]
    StalledSegment {
        /// Steps taken before giving up
        steps: usize,
        /// Distance covered (straight) or angle swept (curve) when the ceiling was hit
        progress: f64,
        /// Distance or angle the segment had to reach
        target: f64,
    },

    /// Parameter grid that does not fit the circuit it is applied to
    #[error("Invalid sweep: {reason}")]
    InvalidSweep { reason: String },

    /// Failure inside one leg of a composed trajectory
    #[error("Segment {index} failed: {source}")]
    Segment {
        index: usize,
        #[source]
        source: Box<SimError>,
    },
}

impl SimError {
    pub(crate) fn invalid_segment(reason: impl Into<String>) -> Self {
        SimError::InvalidSegment {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_constants(reason: impl Into<String>) -> Self {
        SimError::InvalidConstants {
            reason: reason.into(),
        }
    }

    pub(crate) fn at_segment(self, index: usize) -> Self {
        SimError::Segment {
            index,
            source: Box::new(self),
        }
    }

    /// Index of the failing segment, when raised by the composer.
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            SimError::Segment { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The underlying error with any segment wrapper removed.
    pub fn root(&self) -> &SimError {
        match self {
            SimError::Segment { source, .. } => source.root(),
            other => other,
        }
    }
}
