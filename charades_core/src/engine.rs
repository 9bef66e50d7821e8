//! Single-writer game engine.
//!
//! The engine owns the session machine, the tilt pipeline and the round
//! clock.  Every mutation arrives as an [`EngineCommand`] on one channel
//! and is applied in arrival order, so a sensor sample, a button press and
//! a clock tick can never interleave inside an operation.  Observers get
//! [`EngineEvent`]s on a second channel.
//!
//! The clock is a [`Ticker`] that posts `Tick { epoch }` back into the
//! command channel.  It is started on entering `playing` and stopped on
//! every exit; each start bumps the epoch so ticks already queued from an
//! earlier run are discarded.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use charades_deck::{Card, Deck, DeckPayload};

use crate::classifier::{GestureEvent, Guess};
use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::pipeline::{Feed, TiltPipeline};
use crate::sampler::OrientationSample;
use crate::session::{GameSession, GameSessionMachine, RoundSummary, Status};
use crate::ticker::Ticker;

// ════════════════════════════════════════════════════════════════════════════
// EngineCommand — sent to the engine thread
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum EngineCommand {
    LoadDeck(Deck),
    /// Validated before install; a bad payload keeps the current deck.
    LoadPayload(DeckPayload),
    StartCountdown,
    /// Deal the first card, take a fresh baseline, start the clock.
    StartGame,
    /// A normalized sensor reading.
    Sample(OrientationSample),
    /// Manual correct / pass.
    Guess(Guess),
    /// Posted by the round clock.
    Tick { epoch: u64 },
    Pause,
    Resume,
    /// Back to idle.  Sensor permission survives.
    Reset,
    SetPermission(bool),
    /// Drop the baseline; the next sample becomes neutral.
    Recalibrate,
    /// Terminate the thread.
    Shutdown,
}

// ════════════════════════════════════════════════════════════════════════════
// EngineEvent — sent back to the host
// ════════════════════════════════════════════════════════════════════════════

/// Read-only snapshot handed to renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionView {
    pub session:       GameSession,
    pub calibrated:    bool,
    pub sensor_active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Updated(SessionView),
    Calibrated,
    Gesture(GestureEvent),
    Scored { guess: Guess, card: Card },
    DeckRejected(String),
    Finished(RoundSummary),
}

// ════════════════════════════════════════════════════════════════════════════
// Engine
// ════════════════════════════════════════════════════════════════════════════

pub struct Engine {
    machine:       GameSessionMachine,
    pipeline:      TiltPipeline,
    tick_interval: Duration,
    self_tx:       Sender<EngineCommand>,
    event_tx:      Sender<EngineEvent>,
    ticker:        Option<Ticker>,
    epoch:         u64,
}

impl Engine {
    /// `self_tx` must feed the same channel the engine reads from; the
    /// round clock posts its ticks there.
    pub fn new(
        config:   &GameConfig,
        self_tx:  Sender<EngineCommand>,
        event_tx: Sender<EngineEvent>,
    ) -> Self {
        Engine {
            machine:       GameSessionMachine::new(),
            pipeline:      TiltPipeline::new(config.tilt.clone(), config.sensor.default_gamma),
            tick_interval: config.timing.tick_interval(),
            self_tx,
            event_tx,
            ticker:        None,
            epoch:         0,
        }
    }

    pub fn session(&self) -> &GameSession { self.machine.session() }
    pub fn pipeline(&self) -> &TiltPipeline { &self.pipeline }

    /// Epoch of the running clock, if any.
    pub fn clock_epoch(&self) -> Option<u64> {
        self.ticker.as_ref().map(|_| self.epoch)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session:       self.machine.session().clone(),
            calibrated:    self.pipeline.is_calibrated(),
            sensor_active: self.machine.sensor_active().is_some(),
        }
    }

    /// Apply one command.  Returns `false` once the engine should stop.
    pub fn handle(&mut self, cmd: EngineCommand) -> bool {
        tracing::trace!(?cmd, "engine command");
        let changed = match cmd {
            EngineCommand::LoadDeck(deck) => self.machine.load_deck(deck),
            EngineCommand::LoadPayload(payload) => match self.machine.load_payload(payload) {
                Ok(()) => true,
                Err(e) => {
                    self.emit(EngineEvent::DeckRejected(e.to_string()));
                    false
                }
            },
            EngineCommand::StartCountdown => self.machine.start_countdown(),
            EngineCommand::StartGame => {
                let started = self.machine.start_game();
                if started {
                    self.pipeline.recalibrate();
                }
                started
            }
            EngineCommand::Sample(sample) => self.on_sample(&sample),
            EngineCommand::Guess(guess) => self.score(guess),
            EngineCommand::Tick { epoch } => self.on_tick(epoch),
            EngineCommand::Pause  => self.machine.pause(),
            EngineCommand::Resume => self.machine.resume(),
            EngineCommand::Reset => {
                self.pipeline.recalibrate();
                self.machine.reset()
            }
            EngineCommand::SetPermission(granted) => self.machine.set_permission(granted),
            EngineCommand::Recalibrate => {
                self.pipeline.recalibrate();
                true
            }
            EngineCommand::Shutdown => {
                self.release_clock();
                return false;
            }
        };
        self.sync_clock();
        if changed {
            self.emit(EngineEvent::Updated(self.view()));
        }
        true
    }

    fn on_sample(&mut self, sample: &OrientationSample) -> bool {
        match self.pipeline.feed(sample, self.machine.sensor_active()) {
            Feed::Calibrated => {
                self.emit(EngineEvent::Calibrated);
                true
            }
            Feed::Gesture(event) => {
                self.emit(EngineEvent::Gesture(event));
                self.score(event.guess)
            }
            Feed::Disabled | Feed::Quiet => false,
        }
    }

    fn score(&mut self, guess: Guess) -> bool {
        if !self.machine.apply(guess) {
            return false;
        }
        let s = self.machine.session();
        let pile = match guess {
            Guess::Correct => &s.correct,
            Guess::Pass    => &s.passed,
        };
        if let Some(card) = pile.last().cloned() {
            self.emit(EngineEvent::Scored { guess, card });
        }
        true
    }

    fn on_tick(&mut self, epoch: u64) -> bool {
        if self.clock_epoch() != Some(epoch) {
            tracing::trace!(epoch, current = self.epoch, "stale tick dropped");
            return false;
        }
        if !self.machine.tick() {
            return false;
        }
        if self.machine.status() == Status::Finished {
            self.emit(EngineEvent::Finished(self.machine.session().summary()));
        }
        true
    }

    // ── clock ────────────────────────────────────────────────────────────

    /// Run the clock exactly while the machine wants it.
    fn sync_clock(&mut self) {
        match (self.machine.timer_active(), self.ticker.is_some()) {
            (true, false) => self.acquire_clock(),
            (false, true) => self.release_clock(),
            _ => {}
        }
    }

    fn acquire_clock(&mut self) {
        self.epoch += 1;
        let epoch = self.epoch;
        let tx = self.self_tx.clone();
        tracing::debug!(epoch, "clock started");
        self.ticker = Some(Ticker::start(self.tick_interval, move || {
            tx.send(EngineCommand::Tick { epoch }).is_ok()
        }));
    }

    fn release_clock(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
            tracing::debug!(epoch = self.epoch, "clock stopped");
        }
    }

    fn emit(&self, event: EngineEvent) {
        // Nobody listening is fine; the host may already be gone.
        let _ = self.event_tx.send(event);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EngineHandle — the engine on its own thread
// ════════════════════════════════════════════════════════════════════════════

/// Dropping the handle shuts the engine down and joins its thread.
pub struct EngineHandle {
    cmd_tx:   Sender<EngineCommand>,
    event_rx: Receiver<EngineEvent>,
    thread:   Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn spawn(config: &GameConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        let engine = Engine::new(config, cmd_tx.clone(), event_tx);

        let thread = thread::spawn(move || engine_thread(engine, cmd_rx));
        EngineHandle { cmd_tx, event_rx, thread: Some(thread) }
    }

    pub fn send(&self, cmd: EngineCommand) -> Result<()> {
        self.cmd_tx.send(cmd).map_err(|_| Error::EngineGone)
    }

    /// Drain any pending events (non-blocking).
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        let mut out = Vec::new();
        while let Ok(e) = self.event_rx.try_recv() { out.push(e); }
        out
    }

    /// Wait for the next event.
    pub fn next_event(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

fn engine_thread(mut engine: Engine, cmd_rx: Receiver<EngineCommand>) {
    tracing::debug!("engine thread started");
    while let Ok(cmd) = cmd_rx.recv() {
        if !engine.handle(cmd) {
            break;
        }
    }
    tracing::debug!("engine thread stopped");
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ROUND_SECONDS;
    use charades_deck::curated;
    use std::time::Instant;

    struct Rig {
        engine: Engine,
        events: Receiver<EngineEvent>,
        _cmds:  Receiver<EngineCommand>,
    }

    /// An engine whose clock never fires on its own; tests post ticks.
    fn rig() -> Rig {
        let mut config = GameConfig::default();
        config.timing.tick_interval_ms = 3_600_000;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (ev_tx, ev_rx) = mpsc::channel();
        Rig { engine: Engine::new(&config, cmd_tx, ev_tx), events: ev_rx, _cmds: cmd_rx }
    }

    impl Rig {
        fn drain(&self) -> Vec<EngineEvent> {
            self.events.try_iter().collect()
        }

        fn play(&mut self, permission: bool) {
            let e = &mut self.engine;
            e.handle(EngineCommand::LoadDeck(curated::find("animals").unwrap()));
            e.handle(EngineCommand::StartCountdown);
            e.handle(EngineCommand::SetPermission(permission));
            e.handle(EngineCommand::StartGame);
            self.drain();
        }

        fn tick(&mut self) -> bool {
            match self.engine.clock_epoch() {
                Some(epoch) => self.engine.handle(EngineCommand::Tick { epoch }),
                None => false,
            }
        }
    }

    #[test]
    fn clock_runs_only_while_playing() {
        let mut r = rig();
        assert_eq!(r.engine.clock_epoch(), None);
        r.play(false);
        assert_eq!(r.engine.clock_epoch(), Some(1));
        r.engine.handle(EngineCommand::Pause);
        assert_eq!(r.engine.clock_epoch(), None);
        r.engine.handle(EngineCommand::Resume);
        assert_eq!(r.engine.clock_epoch(), Some(2));
        r.engine.handle(EngineCommand::Reset);
        assert_eq!(r.engine.clock_epoch(), None);
    }

    #[test]
    fn stale_tick_is_dropped() {
        let mut r = rig();
        r.play(false);
        r.engine.handle(EngineCommand::Pause);
        r.engine.handle(EngineCommand::Resume);
        r.drain();
        r.engine.handle(EngineCommand::Tick { epoch: 1 });
        assert_eq!(r.engine.session().time_left, ROUND_SECONDS);
        assert!(r.drain().is_empty());
        r.tick();
        assert_eq!(r.engine.session().time_left, ROUND_SECONDS - 1);
    }

    #[test]
    fn final_tick_finishes_and_reports() {
        let mut r = rig();
        r.play(false);
        r.engine.handle(EngineCommand::Guess(Guess::Correct));
        for _ in 0..ROUND_SECONDS { r.tick(); }
        assert_eq!(r.engine.session().status, Status::Finished);
        assert_eq!(r.engine.clock_epoch(), None);
        let summary = r.drain().into_iter().find_map(|e| match e {
            EngineEvent::Finished(s) => Some(s),
            _ => None,
        });
        let summary = summary.expect("finished event");
        assert_eq!(summary.score, 1);
        assert_eq!(summary.percentage, 100);
    }

    #[test]
    fn manual_guess_is_scored() {
        let mut r = rig();
        r.play(false);
        r.engine.handle(EngineCommand::Guess(Guess::Pass));
        let events = r.drain();
        assert!(events.contains(&EngineEvent::Scored {
            guess: Guess::Pass,
            card:  curated::find("animals").unwrap().cards()[0].clone(),
        }));
        assert!(matches!(events.last(), Some(EngineEvent::Updated(_))));
    }

    #[test]
    fn start_game_calibrates_on_first_sample_then_tilts_score() {
        let mut r = rig();
        r.play(true);
        let t0 = Instant::now();
        r.engine.handle(EngineCommand::Sample(OrientationSample::at(10.0, -85.0, t0)));
        assert_eq!(r.drain().first(), Some(&EngineEvent::Calibrated));

        let t1 = t0 + Duration::from_millis(40);
        r.engine.handle(EngineCommand::Sample(OrientationSample::at(170.0, -85.0, t1)));
        let events = r.drain();
        assert!(matches!(events[0], EngineEvent::Gesture(g) if g.guess == Guess::Correct));
        assert_eq!(r.engine.session().correct.len(), 1);

        // Cooldown swallows the follow-through.
        let t2 = t1 + Duration::from_millis(200);
        r.engine.handle(EngineCommand::Sample(OrientationSample::at(-170.0, -85.0, t2)));
        assert!(r.drain().is_empty());
        assert_eq!(r.engine.session().correct.len(), 1);
    }

    #[test]
    fn samples_are_ignored_without_permission() {
        let mut r = rig();
        r.play(false);
        let t0 = Instant::now();
        r.engine.handle(EngineCommand::Sample(OrientationSample::at(10.0, -85.0, t0)));
        r.engine.handle(EngineCommand::Sample(OrientationSample::at(170.0, -85.0, t0)));
        assert!(r.drain().is_empty());
        assert!(!r.engine.pipeline().is_calibrated());
    }

    #[test]
    fn samples_are_ignored_while_paused() {
        let mut r = rig();
        r.play(true);
        r.engine.handle(EngineCommand::Pause);
        r.drain();
        r.engine.handle(EngineCommand::Sample(OrientationSample::at(10.0, -85.0, Instant::now())));
        assert!(r.drain().is_empty());
    }

    #[test]
    fn rejected_payload_reports_and_keeps_deck() {
        let mut r = rig();
        r.engine.handle(EngineCommand::LoadDeck(curated::find("food").unwrap()));
        r.drain();
        r.engine.handle(EngineCommand::LoadPayload(DeckPayload {
            id:    None,
            title: "Tiny".into(),
            icon:  String::new(),
            cards: vec!["one".into(), "two".into()],
        }));
        let events = r.drain();
        assert!(matches!(events.as_slice(), [EngineEvent::DeckRejected(_)]));
        assert_eq!(r.engine.session().deck.as_ref().map(|d| d.title()), Some("Food"));
    }

    #[test]
    fn invalid_transition_emits_nothing() {
        let mut r = rig();
        r.engine.handle(EngineCommand::StartGame);
        r.engine.handle(EngineCommand::Pause);
        assert!(r.drain().is_empty());
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut r = rig();
        r.play(false);
        assert!(!r.engine.handle(EngineCommand::Shutdown));
        assert_eq!(r.engine.clock_epoch(), None);
    }

    #[test]
    fn spawned_engine_counts_down_on_its_own() {
        let mut config = GameConfig::default();
        config.timing.tick_interval_ms = 2;
        let engine = EngineHandle::spawn(&config);
        engine.send(EngineCommand::LoadDeck(curated::find("movies").unwrap())).unwrap();
        engine.send(EngineCommand::StartCountdown).unwrap();
        engine.send(EngineCommand::StartGame).unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut finished = None;
        while finished.is_none() && Instant::now() < deadline {
            if let Some(EngineEvent::Finished(s)) = engine.next_event(Duration::from_millis(100)) {
                finished = Some(s);
            }
        }
        let summary = finished.expect("round should finish");
        assert_eq!(summary.deck_title, "Movies");
        assert_eq!(summary.total, 0);
    }
}
