//! Sample → calibration → gesture.

use crate::calibration::{Calibrator, Observation};
use crate::classifier::{GestureClassifier, GestureEvent, TiltThresholds};
use crate::sampler::OrientationSample;
use crate::session::SensorActive;

/// What one sample produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Feed {
    /// No sensor capability; the sample was dropped unseen.
    Disabled,
    /// The sample became the neutral baseline.
    Calibrated,
    /// A tilt gesture fired.
    Gesture(GestureEvent),
    /// Nothing happened (no baseline yet, neutral pose, or cooling down).
    Quiet,
}

/// Calibrator and classifier for one game, owned by whoever owns the
/// session so several games can coexist in one process.
#[derive(Clone, Debug)]
pub struct TiltPipeline {
    calibrator: Calibrator,
    classifier: GestureClassifier,
}

impl TiltPipeline {
    pub fn new(thresholds: TiltThresholds, default_gamma: f64) -> Self {
        TiltPipeline {
            calibrator: Calibrator::with_default_gamma(default_gamma),
            classifier: GestureClassifier::new(thresholds),
        }
    }

    pub fn calibrator(&self) -> &Calibrator { &self.calibrator }
    pub fn classifier(&self) -> &GestureClassifier { &self.classifier }
    pub fn is_calibrated(&self) -> bool { self.calibrator.is_calibrated() }

    /// Drop the baseline; the next sample re-calibrates.
    pub fn recalibrate(&mut self) {
        self.calibrator.reset();
    }

    pub fn feed(&mut self, sample: &OrientationSample, sensor: Option<SensorActive>) -> Feed {
        if sensor.is_none() {
            return Feed::Disabled;
        }
        match self.calibrator.observe(sample) {
            Observation::Calibrated => Feed::Calibrated,
            Observation::Waiting    => Feed::Quiet,
            Observation::Candidate  => self
                .classifier
                .classify(sample, self.calibrator.baseline(), sample.timestamp, sensor)
                .map_or(Feed::Quiet, Feed::Gesture),
        }
    }
}

impl Default for TiltPipeline {
    fn default() -> Self {
        TiltPipeline {
            calibrator: Calibrator::new(),
            classifier: GestureClassifier::default(),
        }
    }
}
