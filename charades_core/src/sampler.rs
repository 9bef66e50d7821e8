//! Orientation samples and the sensor permission lifecycle.
//!
//! Host platforms deliver `{alpha, beta, gamma}` readings, any of which may
//! be missing while the sensor warms up.  [`OrientationSampler`] turns them
//! into [`OrientationSample`]s once sensor permission has been granted.

use std::time::Instant;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Samples
// ════════════════════════════════════════════════════════════════════════════

/// A reading as the platform reports it, in degrees.
///
/// `alpha` (compass heading) is accepted and ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrientation {
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub beta:  Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
}

/// A normalized reading.
///
/// `beta` ∈ [-180, 180] is front-to-back tilt, `gamma` ∈ [-90, 90] is
/// left-to-right tilt.  Absent axes are `None`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationSample {
    pub beta:      Option<f64>,
    pub gamma:     Option<f64>,
    pub timestamp: Instant,
}

impl OrientationSample {
    pub fn new(beta: Option<f64>, gamma: Option<f64>, timestamp: Instant) -> Self {
        OrientationSample { beta, gamma, timestamp }
    }

    /// Both axes present.
    pub fn at(beta: f64, gamma: f64, timestamp: Instant) -> Self {
        OrientationSample::new(Some(beta), Some(gamma), timestamp)
    }
}

/// Normalize a raw reading: non-finite values become absent, beta is
/// wrapped into [-180, 180] and gamma clamped into [-90, 90].
pub fn normalize(raw: &RawOrientation, at: Instant) -> OrientationSample {
    let beta = raw.beta.filter(|b| b.is_finite()).map(|b| {
        if (-180.0..=180.0).contains(&b) {
            b
        } else {
            (b + 180.0).rem_euclid(360.0) - 180.0
        }
    });
    let gamma = raw
        .gamma
        .filter(|g| g.is_finite())
        .map(|g| g.clamp(-90.0, 90.0));
    OrientationSample::new(beta, gamma, at)
}

// ════════════════════════════════════════════════════════════════════════════
// Permission
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Unknown,
    Granted,
    Denied,
}

/// Platform hook that asks the user for motion-sensor access.
pub trait PermissionProvider: Send {
    /// `true` when access is granted.
    fn request(&mut self) -> bool;
}

/// Platforms without a permission concept.
pub struct PreGranted;

impl PermissionProvider for PreGranted {
    fn request(&mut self) -> bool { true }
}

/// No usable sensor; the round is played with manual commands only.
pub struct NoSensor;

impl PermissionProvider for NoSensor {
    fn request(&mut self) -> bool { false }
}

// ════════════════════════════════════════════════════════════════════════════
// OrientationSampler
// ════════════════════════════════════════════════════════════════════════════

pub struct OrientationSampler {
    provider:   Box<dyn PermissionProvider>,
    permission: Permission,
}

impl OrientationSampler {
    pub fn new(provider: Box<dyn PermissionProvider>) -> Self {
        OrientationSampler { provider, permission: Permission::Unknown }
    }

    pub fn permission(&self) -> Permission { self.permission }

    pub fn is_granted(&self) -> bool { self.permission == Permission::Granted }

    /// Ask the provider once; later calls return the cached answer.
    pub fn request_permission(&mut self) -> bool {
        if self.permission == Permission::Unknown {
            let granted = self.provider.request();
            self.permission = if granted { Permission::Granted } else { Permission::Denied };
            tracing::info!(granted, "motion sensor permission");
        }
        self.is_granted()
    }

    /// Forget the cached answer so the next request asks again.
    pub fn reset_permission(&mut self) {
        self.permission = Permission::Unknown;
    }

    /// Normalize a reading, or `None` without permission.
    pub fn sample(&self, raw: &RawOrientation, at: Instant) -> Option<OrientationSample> {
        if !self.is_granted() {
            return None;
        }
        Some(normalize(raw, at))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct Counting(Arc<AtomicU32>);
    impl PermissionProvider for Counting {
        fn request(&mut self) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    fn raw(beta: Option<f64>, gamma: Option<f64>) -> RawOrientation {
        RawOrientation { alpha: Some(12.0), beta, gamma }
    }

    #[test]
    fn normalize_keeps_in_range_values() {
        let s = normalize(&raw(Some(12.0), Some(-88.0)), Instant::now());
        assert_eq!(s.beta, Some(12.0));
        assert_eq!(s.gamma, Some(-88.0));
    }

    #[test]
    fn normalize_wraps_beta_and_clamps_gamma() {
        let s = normalize(&raw(Some(190.0), Some(-95.0)), Instant::now());
        assert!((s.beta.unwrap() - -170.0).abs() < 1e-9);
        assert_eq!(s.gamma, Some(-90.0));
    }

    #[test]
    fn normalize_drops_non_finite() {
        let s = normalize(&raw(Some(f64::NAN), Some(f64::INFINITY)), Instant::now());
        assert_eq!(s.beta, None);
        assert_eq!(s.gamma, None);
        let s = normalize(&raw(None, None), Instant::now());
        assert_eq!((s.beta, s.gamma), (None, None));
    }

    #[test]
    fn no_samples_before_permission() {
        let sampler = OrientationSampler::new(Box::new(PreGranted));
        assert_eq!(sampler.permission(), Permission::Unknown);
        assert!(sampler.sample(&raw(Some(1.0), Some(1.0)), Instant::now()).is_none());
    }

    #[test]
    fn granted_sampler_produces_samples() {
        let mut sampler = OrientationSampler::new(Box::new(PreGranted));
        assert!(sampler.request_permission());
        assert!(sampler.sample(&raw(Some(1.0), None), Instant::now()).is_some());
    }

    #[test]
    fn denied_sampler_stays_silent() {
        let mut sampler = OrientationSampler::new(Box::new(NoSensor));
        assert!(!sampler.request_permission());
        assert_eq!(sampler.permission(), Permission::Denied);
        assert!(sampler.sample(&raw(Some(1.0), Some(1.0)), Instant::now()).is_none());
    }

    #[test]
    fn permission_is_asked_once_until_reset() {
        let asked = Arc::new(AtomicU32::new(0));
        let mut sampler = OrientationSampler::new(Box::new(Counting(asked.clone())));
        sampler.request_permission();
        sampler.request_permission();
        assert_eq!(asked.load(Ordering::SeqCst), 1);
        sampler.reset_permission();
        assert_eq!(sampler.permission(), Permission::Unknown);
        sampler.request_permission();
        assert_eq!(asked.load(Ordering::SeqCst), 2);
        assert!(sampler.is_granted());
    }

    #[test]
    fn replay_records_parse_with_missing_axes() {
        let r: RawOrientation = serde_json::from_str(r#"{"beta": 10.5}"#).unwrap();
        assert_eq!(r, RawOrientation { alpha: None, beta: Some(10.5), gamma: None });
    }
}
