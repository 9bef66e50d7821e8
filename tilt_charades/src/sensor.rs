//! Motion sensor sources.
//!
//! The public interface is a [`SensorFeed`]: a background thread that pulls
//! [`RawOrientation`] readings from a [`SampleSource`] and hands them over a
//! `mpsc` channel, each stamped with the instant it was delivered.  Consumers don't need to know whether readings come from
//! the keyboard simulator or a recorded session.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Context;
use charades_core::RawOrientation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

// ════════════════════════════════════════════════════════════════════════════
// SampleSource trait — unified interface for sim and replay
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can produce a stream of orientation readings.
pub trait SampleSource: Send + 'static {
    /// The next reading and how long to wait before delivering it.
    /// `None` ends the feed.
    fn next_reading(&mut self) -> Option<(Duration, RawOrientation)>;
}

// ════════════════════════════════════════════════════════════════════════════
// SensorFeed — scoped subscription
// ════════════════════════════════════════════════════════════════════════════

/// A running source.  Dropping the feed stops and joins its thread.
pub struct SensorFeed {
    rx:      Receiver<(Instant, RawOrientation)>,
    stop_tx: Option<Sender<()>>,
    handle:  Option<JoinHandle<()>>,
}

impl SensorFeed {
    pub fn subscribe<S: SampleSource>(source: S) -> Self {
        let (tx, rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || feed_thread(source, tx, stop_rx));
        tracing::debug!("sensor feed subscribed");
        SensorFeed { rx, stop_tx: Some(stop_tx), handle: Some(handle) }
    }

    /// Drain any pending readings with their delivery stamps (non-blocking).
    pub fn drain(&self) -> Vec<(Instant, RawOrientation)> {
        let mut out = Vec::new();
        while let Ok(r) = self.rx.try_recv() { out.push(r); }
        out
    }
}

impl Drop for SensorFeed {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
        tracing::debug!("sensor feed released");
    }
}

fn feed_thread<S: SampleSource>(
    mut source: S,
    tx:         Sender<(Instant, RawOrientation)>,
    stop_rx:    Receiver<()>,
) {
    while let Some((wait, reading)) = source.next_reading() {
        match stop_rx.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {
                if tx.send((Instant::now(), reading)).is_err() { return; }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
    }
    tracing::debug!("sensor source exhausted");
}

// ════════════════════════════════════════════════════════════════════════════
// SimTiltSource — keyboard-driven pose (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Where the simulated phone is being held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TiltPose {
    /// Upright against the forehead, landscape.
    Neutral,
    /// Screen rolled toward the floor.
    Forward,
    /// Screen rolled toward the ceiling.
    Back,
}

impl TiltPose {
    /// Target `(beta, gamma)` in degrees.
    fn target(self) -> (f64, f64) {
        match self {
            TiltPose::Neutral => (0.0,   -88.0),
            TiltPose::Forward => (165.0, -80.0),
            TiltPose::Back    => (5.0,   -30.0),
        }
    }
}

/// Degrees the simulated phone can turn per reading.
const SLEW_DEG: f64 = 15.0;
const JITTER_DEG: f64 = 0.3;

/// Readings from a simulated phone whose pose is steered over a channel.
///
/// The pose eases toward its target at a fixed slew rate with a little
/// noise, so gestures cross the thresholds the way a real wrist does.
pub struct SimTiltSource {
    ctl:    Receiver<TiltPose>,
    pose:   TiltPose,
    beta:   f64,
    gamma:  f64,
    period: Duration,
    rng:    StdRng,
}

impl SimTiltSource {
    /// Returns the source and the sender that steers it.  Dropping the
    /// sender ends the feed.
    pub fn new(period: Duration, seed: u64) -> (Self, Sender<TiltPose>) {
        let (tx, rx) = mpsc::channel();
        let (beta, gamma) = TiltPose::Neutral.target();
        let source = SimTiltSource {
            ctl:    rx,
            pose:   TiltPose::Neutral,
            beta,
            gamma,
            period,
            rng:    StdRng::seed_from_u64(seed),
        };
        (source, tx)
    }

    pub fn pose(&self) -> TiltPose { self.pose }

    fn step(&mut self) {
        let (tb, tg) = self.pose.target();
        self.beta  += (tb - self.beta).clamp(-SLEW_DEG, SLEW_DEG);
        self.gamma += (tg - self.gamma).clamp(-SLEW_DEG, SLEW_DEG);
    }
}

impl SampleSource for SimTiltSource {
    fn next_reading(&mut self) -> Option<(Duration, RawOrientation)> {
        loop {
            match self.ctl.try_recv() {
                Ok(pose) => self.pose = pose,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return None,
            }
        }
        self.step();
        let reading = RawOrientation {
            alpha: Some(0.0),
            beta:  Some(self.beta  + self.rng.gen_range(-JITTER_DEG..JITTER_DEG)),
            gamma: Some(self.gamma + self.rng.gen_range(-JITTER_DEG..JITTER_DEG)),
        };
        Some((self.period, reading))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource — recorded readings
// ════════════════════════════════════════════════════════════════════════════

/// One line of a replay file:
///
/// ```text
/// {"t_ms": 0,  "beta": 3.5, "gamma": -87.0}
/// {"t_ms": 20, "alpha": 12.0, "beta": 4.1, "gamma": -86.2}
/// ```
///
/// Axes may be omitted or `null`.  Blank lines and `#` comments are skipped.
#[derive(Deserialize)]
struct ReplayLine {
    t_ms: u64,
    #[serde(flatten)]
    raw:  RawOrientation,
}

/// Plays back a recorded session with its original timing.
pub struct ReplaySource {
    readings: std::vec::IntoIter<(Duration, RawOrientation)>,
}

impl ReplaySource {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening replay file {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("reading replay file {}", path.display()))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        let mut readings = Vec::new();
        let mut last_ms = 0u64;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parsed: ReplayLine = serde_json::from_str(line)
                .with_context(|| format!("line {}", i + 1))?;
            let wait = Duration::from_millis(parsed.t_ms.saturating_sub(last_ms));
            last_ms = last_ms.max(parsed.t_ms);
            readings.push((wait, parsed.raw));
        }
        tracing::info!(readings = readings.len(), "replay loaded");
        Ok(ReplaySource { readings: readings.into_iter() })
    }

    pub fn remaining(&self) -> usize { self.readings.len() }
}

impl SampleSource for ReplaySource {
    fn next_reading(&mut self) -> Option<(Duration, RawOrientation)> {
        self.readings.next()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const PERIOD: Duration = Duration::from_millis(20);

    fn beta_of(r: &RawOrientation) -> f64 { r.beta.unwrap() }
    fn gamma_of(r: &RawOrientation) -> f64 { r.gamma.unwrap() }

    #[test]
    fn sim_starts_neutral() {
        let (mut sim, _ctl) = SimTiltSource::new(PERIOD, 1);
        let (wait, r) = sim.next_reading().unwrap();
        assert_eq!(wait, Duration::from_millis(20));
        assert!(beta_of(&r).abs() < 1.0);
        assert!((gamma_of(&r) + 88.0).abs() < 1.0);
    }

    #[test]
    fn sim_forward_flips_beta_past_threshold() {
        let (mut sim, ctl) = SimTiltSource::new(PERIOD, 2);
        ctl.send(TiltPose::Forward).unwrap();
        let mut last = None;
        for _ in 0..20 {
            last = sim.next_reading().map(|(_, r)| r);
        }
        assert_eq!(sim.pose(), TiltPose::Forward);
        assert!(beta_of(&last.unwrap()) > 140.0);
    }

    #[test]
    fn sim_back_enters_gamma_band() {
        let (mut sim, ctl) = SimTiltSource::new(PERIOD, 3);
        ctl.send(TiltPose::Back).unwrap();
        let mut last = None;
        for _ in 0..20 {
            last = sim.next_reading().map(|(_, r)| r);
        }
        let g = gamma_of(&last.unwrap());
        assert!(g > -50.0 && g < 0.0, "gamma {g}");
    }

    #[test]
    fn sim_moves_gradually() {
        let (mut sim, ctl) = SimTiltSource::new(PERIOD, 4);
        ctl.send(TiltPose::Forward).unwrap();
        let (_, r) = sim.next_reading().unwrap();
        assert!(beta_of(&r) < SLEW_DEG + 1.0);
    }

    #[test]
    fn sim_ends_when_controller_dropped() {
        let (mut sim, ctl) = SimTiltSource::new(PERIOD, 5);
        drop(ctl);
        assert!(sim.next_reading().is_none());
    }

    #[test]
    fn replay_uses_deltas_and_skips_comments() {
        let text = "# recorded\n\
                    {\"t_ms\": 100, \"beta\": 1.0, \"gamma\": -88.0}\n\
                    \n\
                    {\"t_ms\": 130, \"alpha\": 5.0, \"beta\": 170.0}\n\
                    {\"t_ms\": 150, \"beta\": null, \"gamma\": -20.0}\n";
        let mut r = ReplaySource::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(r.remaining(), 3);

        let (w0, a) = r.next_reading().unwrap();
        assert_eq!(w0, Duration::from_millis(100));
        assert_eq!(a.beta, Some(1.0));

        let (w1, b) = r.next_reading().unwrap();
        assert_eq!(w1, Duration::from_millis(30));
        assert_eq!(b.gamma, None);

        let (_, c) = r.next_reading().unwrap();
        assert_eq!(c.beta, None);
        assert!(r.next_reading().is_none());
    }

    #[test]
    fn replay_error_names_the_line() {
        let text = "{\"t_ms\": 0, \"beta\": 1.0}\nnot json\n";
        let err = ReplaySource::from_reader(Cursor::new(text)).err().unwrap();
        assert!(format!("{err:#}").contains("line 2"), "{err:#}");
    }

    #[test]
    fn replay_file_round_trip() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(f, "{{\"t_ms\": 0, \"beta\": 2.0, \"gamma\": -80.0}}").unwrap();
        let r = ReplaySource::open(f.path()).unwrap();
        assert_eq!(r.remaining(), 1);
        assert!(ReplaySource::open(Path::new("/nonexistent/replay.jsonl")).is_err());
    }

    #[test]
    fn feed_delivers_then_finishes() {
        let text = "{\"t_ms\": 1, \"beta\": 1.0}\n{\"t_ms\": 2, \"beta\": 2.0}\n";
        let feed = SensorFeed::subscribe(ReplaySource::from_reader(Cursor::new(text)).unwrap());
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = Vec::new();
        while got.len() < 2 && Instant::now() < deadline {
            got.extend(feed.drain());
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(got.iter().map(|(_, r)| r.beta).collect::<Vec<_>>(), vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn feed_stamps_readings_when_delivered() {
        let text = "{\"t_ms\": 0, \"beta\": 1.0}\n{\"t_ms\": 40, \"beta\": 2.0}\n";
        let before = Instant::now();
        let feed = SensorFeed::subscribe(ReplaySource::from_reader(Cursor::new(text)).unwrap());
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = Vec::new();
        while got.len() < 2 && Instant::now() < deadline {
            got.extend(feed.drain());
            thread::sleep(Duration::from_millis(2));
        }
        let drained_at = Instant::now();
        assert_eq!(got.len(), 2);
        let (t0, t1) = (got[0].0, got[1].0);
        assert!(before <= t0 && t1 <= drained_at);
        // The recording's 40 ms gap survives even if both land in one drain.
        assert!(t1.duration_since(t0) >= Duration::from_millis(40));
    }

    #[test]
    fn dropping_feed_stops_the_source() {
        let (sim, ctl) = SimTiltSource::new(Duration::from_millis(5), 6);
        let feed = SensorFeed::subscribe(sim);
        thread::sleep(Duration::from_millis(30));
        drop(feed);
        // The source went down with the thread.
        assert!(ctl.send(TiltPose::Back).is_err());
    }
}
