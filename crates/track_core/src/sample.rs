//! Per-step records produced by the segment simulator.

use serde::{Deserialize, Serialize};

/// Floating-point slack allowed before a sample counts as over the limit.
pub const LIMIT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Straight,
    Curve,
}

/// State and loads at the end of one integration step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    /// Time at the end of the step, s.
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    /// Along-track acceleration over the step, m/s².
    pub tangential_accel: f64,
    /// Centripetal acceleration, m/s².
    pub lateral_accel: f64,
    /// Longitudinal force, N. Zero in curves.
    pub force: f64,
    pub kind: SegmentKind,
    /// Index of the segment within its trajectory.
    pub segment: usize,
    /// Combined acceleration exceeded `a_max`.
    pub exceeds_limit: bool,
}

impl Sample {
    /// Magnitude of the combined tangential and lateral acceleration.
    pub fn total_accel(&self) -> f64 {
        self.tangential_accel.hypot(self.lateral_accel)
    }
}

/// Ordered, append-only sequence of samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SampleSeries {
    samples: Vec<Sample>,
}

impl SampleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Appends every sample of `other`, consuming it.
    pub fn append(&mut self, other: SampleSeries) {
        self.samples.extend(other.samples);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Samples recorded on segments of the given kind.
    pub fn of_kind(&self, kind: SegmentKind) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter().filter(move |s| s.kind == kind)
    }

    /// Samples flagged as exceeding the acceleration limit.
    pub fn violations(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter().filter(|s| s.exceeds_limit)
    }

    pub fn peak_tangential_accel(&self) -> f64 {
        self.peak(|s| s.tangential_accel.abs())
    }

    pub fn peak_lateral_accel(&self) -> f64 {
        self.peak(|s| s.lateral_accel.abs())
    }

    pub fn peak_total_accel(&self) -> f64 {
        self.peak(Sample::total_accel)
    }

    pub fn peak_speed(&self) -> f64 {
        self.peak(|s| s.speed)
    }

    fn peak(&self, f: impl Fn(&Sample) -> f64) -> f64 {
        self.samples.iter().map(f).fold(0.0, f64::max)
    }

    /// Column views for downstream plotting.
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (s.x, s.y)).collect()
    }
}

impl<'a> IntoIterator for &'a SampleSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
