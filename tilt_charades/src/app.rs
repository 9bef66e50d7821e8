//! Top-level host state.
//!
//! `AppState` owns the engine handle, the deck supplier, the sensor
//! permission and the current sensor feed.  It turns key presses into
//! engine commands, forwards sensor readings, and keeps the screen-only
//! state the engine doesn't care about: the 3-2-1 countdown, the feedback
//! flash and the finished-screen linger.
//!
//! The sensor feed is held only while a round is live: it is subscribed as
//! the round starts and on resume, and released on pause, at the buzzer and
//! on play-again.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use anyhow::Context;
use charades_core::{
    EngineCommand, EngineEvent, EngineHandle, GameConfig, GameSession, Guess, NoSensor,
    OrientationSample, OrientationSampler, PermissionProvider, PreGranted, RoundSummary,
    SessionView, Status,
};
use charades_deck::DeckSupplier;

use crate::sensor::{ReplaySource, SensorFeed, SimTiltSource, TiltPose};
use crate::visualizer::Visualizer;

/// "GO!" stays up this long after the last countdown digit.
const GO_HOLD: Duration = Duration::from_millis(500);

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where tilt readings come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SensorMode {
    /// Arrow keys steer a simulated phone.
    Simulated,
    /// Readings recorded to a JSON-lines file.
    Replay(PathBuf),
    /// No sensor; buttons only.
    Off,
}

pub struct AppConfig {
    pub game:   GameConfig,
    pub sensor: SensorMode,
    /// Seeds the simulated sensor's jitter.
    pub seed:   u64,
}

// ════════════════════════════════════════════════════════════════════════════
// Input / Screen
// ════════════════════════════════════════════════════════════════════════════

/// One user action, already decoded from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Correct,
    Pass,
    TogglePause,
    Recalibrate,
    PlayAgain,
    Quit,
    /// Held arrow keys, reported every frame.
    Tilt(TiltPose),
}

/// What the window should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Seconds left, `None` while "GO!" is up.
    Countdown(Option<u32>),
    Round,
    /// Time ran out; results are about to show.
    TimeUp,
    Results,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── game ─────────────────────────────────────────────────────────────
    engine:   EngineHandle,
    supplier: Box<dyn DeckSupplier>,
    config:   GameConfig,
    view:     SessionView,

    // ── sensor ───────────────────────────────────────────────────────────
    sampler:     OrientationSampler,
    mode:        SensorMode,
    seed:        u64,
    feed:        Option<SensorFeed>,
    sim_ctl:     Option<Sender<TiltPose>>,
    pose:        TiltPose,
    last_sample: Option<OrientationSample>,

    // ── screen ───────────────────────────────────────────────────────────
    countdown_from: Option<Instant>,
    finished_at:    Option<Instant>,
    summary:        Option<RoundSummary>,
    flash:          Option<(Guess, Instant)>,
    pub status:     String,
    quit:           bool,
}

impl AppState {
    /// Spawn the engine, deal the first deck and start the countdown.
    pub fn new(cfg: AppConfig, supplier: Box<dyn DeckSupplier>, now: Instant) -> anyhow::Result<Self> {
        let provider: Box<dyn PermissionProvider> = match cfg.sensor {
            SensorMode::Off => Box::new(NoSensor),
            _               => Box::new(PreGranted),
        };
        let mut app = AppState {
            engine:   EngineHandle::spawn(&cfg.game),
            supplier,
            config:   cfg.game,
            view:     SessionView {
                session:       GameSession::default(),
                calibrated:    false,
                sensor_active: false,
            },
            sampler:     OrientationSampler::new(provider),
            mode:        cfg.sensor,
            seed:        cfg.seed,
            feed:        None,
            sim_ctl:     None,
            pose:        TiltPose::Neutral,
            last_sample: None,
            countdown_from: None,
            finished_at:    None,
            summary:        None,
            flash:          None,
            status:         String::new(),
            quit:           false,
        };
        app.deal(now)?;
        Ok(app)
    }

    // ── process one Input ────────────────────────────────────────────────

    pub fn handle_input(&mut self, input: Input, now: Instant) -> anyhow::Result<()> {
        match input {
            Input::Correct => self.engine.send(EngineCommand::Guess(Guess::Correct))?,
            Input::Pass    => self.engine.send(EngineCommand::Guess(Guess::Pass))?,
            Input::TogglePause => match self.view.session.status {
                Status::Playing => self.engine.send(EngineCommand::Pause)?,
                Status::Paused  => self.engine.send(EngineCommand::Resume)?,
                _ => {}
            },
            Input::Recalibrate => {
                self.engine.send(EngineCommand::Recalibrate)?;
                self.status = "Hold the phone level to recalibrate".to_string();
            }
            Input::PlayAgain => {
                self.engine.send(EngineCommand::Reset)?;
                self.release_sensor();
                self.deal(now)?;
            }
            Input::Quit => self.quit = true,
            Input::Tilt(pose) => {
                if pose != self.pose {
                    self.pose = pose;
                    if let Some(ctl) = &self.sim_ctl {
                        let _ = ctl.send(pose);
                    }
                }
            }
        }
        Ok(())
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant) -> anyhow::Result<()> {
        for event in self.engine.drain_events() {
            self.on_event(event, now);
        }

        if let Some(feed) = &self.feed {
            for (at, raw) in feed.drain() {
                if let Some(sample) = self.sampler.sample(&raw, at) {
                    self.last_sample = Some(sample);
                    self.engine.send(EngineCommand::Sample(sample))?;
                }
            }
        }

        if let Some(t0) = self.countdown_from {
            if now.saturating_duration_since(t0) >= self.config.timing.countdown() + GO_HOLD {
                self.begin_round()?;
            }
        }
        Ok(())
    }

    fn on_event(&mut self, event: EngineEvent, now: Instant) {
        match event {
            EngineEvent::Updated(view) => {
                let was = self.view.session.status;
                self.view = view;
                self.follow_status(was);
            }
            EngineEvent::Calibrated => {
                self.status = "Calibrated".to_string();
            }
            EngineEvent::Gesture(g) => {
                tracing::debug!(guess = ?g.guess, "tilt");
            }
            EngineEvent::Scored { guess, card } => {
                self.flash = Some((guess, now));
                self.status = match guess {
                    Guess::Correct => format!("Correct: {card}"),
                    Guess::Pass    => format!("Passed: {card}"),
                };
            }
            EngineEvent::DeckRejected(reason) => {
                tracing::warn!(%reason, "deck rejected");
                self.status = format!("Deck rejected: {reason}");
            }
            EngineEvent::Finished(summary) => {
                tracing::info!(
                    score = summary.score,
                    total = summary.total,
                    percentage = summary.percentage,
                    "round over"
                );
                self.finished_at = Some(now);
                self.summary = Some(summary);
                self.release_sensor();
            }
        }
    }

    /// Supply a deck, load it and start the countdown.
    fn deal(&mut self, now: Instant) -> anyhow::Result<()> {
        let deck = self.supplier.supply().context("loading deck")?;
        tracing::info!(deck = deck.title(), "dealing");
        self.status = format!("{} {}", deck.icon(), deck.title());
        self.engine.send(EngineCommand::LoadDeck(deck))?;
        self.engine.send(EngineCommand::StartCountdown)?;
        self.countdown_from = Some(now);
        self.finished_at    = None;
        self.summary        = None;
        self.flash          = None;
        Ok(())
    }

    /// Countdown done: settle permission, subscribe the sensor, deal the
    /// first card.
    fn begin_round(&mut self) -> anyhow::Result<()> {
        self.countdown_from = None;
        let mut granted = self.sampler.request_permission();
        if granted && self.feed.is_none() {
            granted = self.subscribe_sensor();
        }
        self.engine.send(EngineCommand::SetPermission(granted))?;
        self.engine.send(EngineCommand::StartGame)?;
        Ok(())
    }

    /// Drop the feed on pause, take it back up on resume.
    fn follow_status(&mut self, was: Status) {
        match (was, self.view.session.status) {
            (Status::Playing, Status::Paused) => self.release_sensor(),
            (Status::Paused, Status::Playing) if self.feed.is_none() && self.sampler.is_granted() => {
                self.subscribe_sensor();
            }
            _ => {}
        }
    }

    /// Returns whether a feed is running.  A replay starts over from its
    /// first reading.
    fn subscribe_sensor(&mut self) -> bool {
        match &self.mode {
            SensorMode::Simulated => {
                let (source, ctl) = SimTiltSource::new(self.config.sensor.sample_period(), self.seed);
                let _ = ctl.send(self.pose);
                self.sim_ctl = Some(ctl);
                self.feed = Some(SensorFeed::subscribe(source));
                true
            }
            SensorMode::Replay(path) => match ReplaySource::open(path) {
                Ok(source) => {
                    self.feed = Some(SensorFeed::subscribe(source));
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %format!("{e:#}"), "replay unavailable, tilt disabled");
                    false
                }
            },
            SensorMode::Off => false,
        }
    }

    fn release_sensor(&mut self) {
        self.sim_ctl = None;
        self.feed = None;
        self.last_sample = None;
    }

    // ── accessors for the render loop ────────────────────────────────────

    pub fn view(&self)        -> &SessionView           { &self.view }
    pub fn session(&self)     -> &GameSession           { &self.view.session }
    pub fn summary(&self)     -> Option<&RoundSummary>  { self.summary.as_ref() }
    pub fn pose(&self)        -> TiltPose               { self.pose }
    pub fn config(&self)      -> &GameConfig            { &self.config }
    pub fn should_quit(&self) -> bool                   { self.quit }
    pub fn has_feed(&self)    -> bool                   { self.feed.is_some() }

    pub fn screen(&self, now: Instant) -> Screen {
        if let Some(t) = self.finished_at {
            return if now.saturating_duration_since(t) >= self.config.timing.finish_linger() {
                Screen::Results
            } else {
                Screen::TimeUp
            };
        }
        if let Some(t0) = self.countdown_from {
            let elapsed = now.saturating_duration_since(t0).as_secs() as u32;
            let total = self.config.timing.countdown_secs;
            return Screen::Countdown((elapsed < total).then(|| total - elapsed));
        }
        Screen::Round
    }

    /// The guess to flash, while the flash lasts.
    pub fn flash(&self, now: Instant) -> Option<Guess> {
        self.flash
            .filter(|(_, at)| now.saturating_duration_since(*at) < self.config.timing.feedback())
            .map(|(g, _)| g)
    }

    /// Sensor was asked for and refused; play is button-only.
    pub fn tilt_unavailable(&self) -> bool {
        let s = &self.view.session;
        s.permission_requested && !s.has_permission
    }

    /// Latest reading and what the thresholds alone make of it, ignoring
    /// calibration and cooldown.
    pub fn debug_reading(&self) -> Option<(OrientationSample, Option<Guess>)> {
        self.last_sample
            .map(|s| (s, self.config.tilt.evaluate(s.beta, s.gamma)))
    }

    /// Summary to report on exit: the last finished round, else the round
    /// in progress if any card has been played.
    pub fn final_summary(&self) -> Option<RoundSummary> {
        self.summary.clone().or_else(|| {
            let s = &self.view.session;
            (s.correct.len() + s.passed.len() > 0).then(|| s.summary())
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the game window until the user quits or closes it.  Returns the
/// summary to report.
pub fn run(cfg: AppConfig, supplier: Box<dyn DeckSupplier>) -> anyhow::Result<Option<RoundSummary>> {
    let mut vis = Visualizer::new()?;
    let mut app = AppState::new(cfg, supplier, Instant::now())?;

    while vis.is_open() && !app.should_quit() {
        let now = Instant::now();
        for input in vis.poll_input() {
            app.handle_input(input, now)?;
        }
        app.tick(now)?;
        vis.render(&app, now);
    }

    Ok(app.final_summary())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
