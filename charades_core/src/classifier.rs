//! Tilt-gesture classification.
//!
//! The device rests landscape on the player's forehead, screen facing out.
//! In that pose `gamma` sits saturated near -90° and a single-axis threshold
//! is ambiguous (gimbal lock), so two rules are checked in order:
//!
//! | Order | Rule | Gesture | Pose |
//! |---|---|---|---|
//! | 1 | `low < gamma < high` (default -50..0) | `Pass` | tilted back, screen toward the ceiling |
//! | 2 | `abs(beta) > limit` (default 140) | `Correct` | flipped past vertical, screen toward the floor |
//!
//! After a gesture fires, every sample within the cooldown (default 1 s)
//! is ignored regardless of geometry.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationBaseline;
use crate::sampler::OrientationSample;
use crate::session::SensorActive;

// ════════════════════════════════════════════════════════════════════════════
// Guess / GestureEvent
// ════════════════════════════════════════════════════════════════════════════

/// The two ways a card can leave play.  Tilt gestures and manual buttons
/// share this vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Guess {
    Correct,
    Pass,
}

/// A classified tilt and the instant it fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureEvent {
    pub guess: Guess,
    pub at:    Instant,
}

// ════════════════════════════════════════════════════════════════════════════
// TiltThresholds
// ════════════════════════════════════════════════════════════════════════════

/// Empirically tuned thresholds, in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltThresholds {
    /// Exclusive lower bound of the Pass band on gamma.
    pub pass_gamma_low:   f64,
    /// Exclusive upper bound of the Pass band on gamma.
    pub pass_gamma_high:  f64,
    /// `abs(beta)` must exceed this for Correct.
    pub correct_beta_abs: f64,
    /// Minimum gap between two fired gestures.
    pub cooldown_ms:      u64,
}

impl Default for TiltThresholds {
    fn default() -> Self {
        TiltThresholds {
            pass_gamma_low:   -50.0,
            pass_gamma_high:  0.0,
            correct_beta_abs: 140.0,
            cooldown_ms:      1000,
        }
    }
}

impl TiltThresholds {
    pub fn cooldown(&self) -> Duration { Duration::from_millis(self.cooldown_ms) }

    /// Pure geometry: which gesture this pose reads as, ignoring cooldown
    /// and calibration.
    pub fn evaluate(&self, beta: Option<f64>, gamma: Option<f64>) -> Option<Guess> {
        if let Some(g) = gamma {
            if self.pass_gamma_low < g && g < self.pass_gamma_high {
                return Some(Guess::Pass);
            }
        }
        if let Some(b) = beta {
            if b.abs() > self.correct_beta_abs {
                return Some(Guess::Correct);
            }
        }
        None
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct GestureClassifier {
    thresholds: TiltThresholds,
    last_fire:  Option<Instant>,
}

impl GestureClassifier {
    pub fn new(thresholds: TiltThresholds) -> Self {
        GestureClassifier { thresholds, last_fire: None }
    }

    pub fn thresholds(&self) -> &TiltThresholds { &self.thresholds }

    pub fn last_fire(&self) -> Option<Instant> { self.last_fire }

    /// Classify one sample.
    ///
    /// Returns `None`, without touching the cooldown, unless the baseline is
    /// set and the caller holds the sensor capability.
    pub fn classify(
        &mut self,
        sample:   &OrientationSample,
        baseline: &CalibrationBaseline,
        now:      Instant,
        sensor:   Option<SensorActive>,
    ) -> Option<GestureEvent> {
        if sensor.is_none() || !baseline.is_set() {
            return None;
        }
        if let Some(last) = self.last_fire {
            if now.saturating_duration_since(last) < self.thresholds.cooldown() {
                return None;
            }
        }

        let guess = self.thresholds.evaluate(sample.beta, sample.gamma)?;
        self.last_fire = Some(now);
        tracing::debug!(?guess, beta = ?sample.beta, gamma = ?sample.gamma, "tilt gesture");
        Some(GestureEvent { guess, at: now })
    }
}

impl Default for GestureClassifier {
    fn default() -> Self { Self::new(TiltThresholds::default()) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibrator;

    fn calibrated() -> CalibrationBaseline {
        let mut cal = Calibrator::new();
        cal.observe(&OrientationSample::at(5.0, -88.0, Instant::now()));
        *cal.baseline()
    }

    fn on() -> Option<SensorActive> { Some(SensorActive::mint()) }

    fn classify_at(c: &mut GestureClassifier, beta: f64, gamma: f64, now: Instant) -> Option<Guess> {
        let s = OrientationSample::at(beta, gamma, now);
        c.classify(&s, &calibrated(), now, on()).map(|e| e.guess)
    }

    #[test]
    fn gamma_band_reads_as_pass() {
        let mut c = GestureClassifier::default();
        assert_eq!(classify_at(&mut c, 10.0, -30.0, Instant::now()), Some(Guess::Pass));
    }

    #[test]
    fn flipped_beta_reads_as_correct() {
        let mut c = GestureClassifier::default();
        assert_eq!(classify_at(&mut c, 170.0, -89.0, Instant::now()), Some(Guess::Correct));
        let mut c = GestureClassifier::default();
        assert_eq!(classify_at(&mut c, -150.0, -89.0, Instant::now()), Some(Guess::Correct));
    }

    #[test]
    fn neutral_pose_reads_as_nothing() {
        let mut c = GestureClassifier::default();
        assert_eq!(classify_at(&mut c, 10.0, -89.0, Instant::now()), None);
        assert_eq!(c.last_fire(), None);
    }

    #[test]
    fn pass_wins_when_both_rules_match() {
        let mut c = GestureClassifier::default();
        assert_eq!(classify_at(&mut c, 170.0, -20.0, Instant::now()), Some(Guess::Pass));
    }

    #[test]
    fn band_edges_are_exclusive() {
        let t = TiltThresholds::default();
        assert_eq!(t.evaluate(Some(0.0), Some(-50.0)), None);
        assert_eq!(t.evaluate(Some(0.0), Some(0.0)), None);
        assert_eq!(t.evaluate(Some(140.0), Some(-89.0)), None);
        assert_eq!(t.evaluate(Some(140.5), Some(-89.0)), Some(Guess::Correct));
    }

    #[test]
    fn missing_axes_fall_through() {
        let t = TiltThresholds::default();
        assert_eq!(t.evaluate(None, None), None);
        assert_eq!(t.evaluate(Some(170.0), None), Some(Guess::Correct));
        assert_eq!(t.evaluate(None, Some(-30.0)), Some(Guess::Pass));
    }

    #[test]
    fn cooldown_blocks_until_a_full_second() {
        let mut c = GestureClassifier::default();
        let t0 = Instant::now();
        assert_eq!(classify_at(&mut c, 170.0, -89.0, t0), Some(Guess::Correct));
        let t999 = t0 + Duration::from_millis(999);
        assert_eq!(classify_at(&mut c, 170.0, -89.0, t999), None);
        let t1000 = t0 + Duration::from_millis(1000);
        assert_eq!(classify_at(&mut c, 10.0, -30.0, t1000), Some(Guess::Pass));
    }

    #[test]
    fn blocked_sample_does_not_extend_cooldown() {
        let mut c = GestureClassifier::default();
        let t0 = Instant::now();
        classify_at(&mut c, 170.0, -89.0, t0);
        classify_at(&mut c, 170.0, -89.0, t0 + Duration::from_millis(500));
        assert_eq!(c.last_fire(), Some(t0));
    }

    #[test]
    fn disabled_without_capability_or_baseline() {
        let mut c = GestureClassifier::default();
        let now = Instant::now();
        let s = OrientationSample::at(170.0, -89.0, now);
        assert!(c.classify(&s, &calibrated(), now, None).is_none());
        assert!(c.classify(&s, &CalibrationBaseline::default(), now, on()).is_none());
        assert_eq!(c.last_fire(), None);
    }

    #[test]
    fn custom_thresholds_apply() {
        let t = TiltThresholds { correct_beta_abs: 100.0, ..TiltThresholds::default() };
        let mut c = GestureClassifier::new(t);
        assert_eq!(classify_at(&mut c, 120.0, -89.0, Instant::now()), Some(Guess::Correct));
    }
}
