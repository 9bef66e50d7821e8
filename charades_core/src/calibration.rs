//! Neutral-pose calibration.
//!
//! The first sample with a `beta` reading after [`Calibrator::reset`] becomes
//! the baseline.  Every later sample, until the next reset, is a
//! classification candidate.

use crate::sampler::OrientationSample;

/// Gamma assumed for the baseline when the calibrating sample lacks one:
/// landscape on the forehead, where gamma rests near its -90° saturation.
pub const DEFAULT_NEUTRAL_GAMMA: f64 = -90.0;

/// Neutral pose captured for the current round.
///
/// Both axes are set together from one sample, or neither is set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalibrationBaseline {
    neutral: Option<(f64, f64)>,
}

impl CalibrationBaseline {
    pub fn is_set(&self)        -> bool        { self.neutral.is_some() }
    pub fn neutral_beta(&self)  -> Option<f64> { self.neutral.map(|(b, _)| b) }
    pub fn neutral_gamma(&self) -> Option<f64> { self.neutral.map(|(_, g)| g) }
}

/// What [`Calibrator::observe`] did with a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// This sample became the baseline; do not classify it.
    Calibrated,
    /// Baseline already set; classify this sample.
    Candidate,
    /// No baseline and no beta to take one from.
    Waiting,
}

#[derive(Clone, Debug)]
pub struct Calibrator {
    baseline:      CalibrationBaseline,
    default_gamma: f64,
}

impl Calibrator {
    pub fn new() -> Self {
        Calibrator::with_default_gamma(DEFAULT_NEUTRAL_GAMMA)
    }

    pub fn with_default_gamma(default_gamma: f64) -> Self {
        Calibrator { baseline: CalibrationBaseline::default(), default_gamma }
    }

    pub fn baseline(&self) -> &CalibrationBaseline { &self.baseline }

    pub fn is_calibrated(&self) -> bool { self.baseline.is_set() }

    /// Clear the baseline; the next sample with a beta reading replaces it.
    pub fn reset(&mut self) {
        self.baseline = CalibrationBaseline::default();
    }

    pub fn observe(&mut self, sample: &OrientationSample) -> Observation {
        if self.baseline.is_set() {
            return Observation::Candidate;
        }
        match sample.beta {
            Some(beta) => {
                let gamma = sample.gamma.unwrap_or(self.default_gamma);
                self.baseline.neutral = Some((beta, gamma));
                tracing::debug!(beta, gamma, "calibrated neutral pose");
                Observation::Calibrated
            }
            None => Observation::Waiting,
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self { Self::new() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
