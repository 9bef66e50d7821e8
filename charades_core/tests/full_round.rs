//! A whole round through the threaded engine, driven the way the host
//! drives it: countdown, permission, sensor stream, clock.

use std::time::{Duration, Instant};

use charades_core::{
    normalize, EngineCommand, EngineEvent, EngineHandle, GameConfig, Guess, OrientationSampler,
    PreGranted, RawOrientation, RoundSummary, Status, ROUND_SECONDS,
};
use charades_deck::curated;

fn fast_config() -> GameConfig {
    let mut c = GameConfig::default();
    c.timing.tick_interval_ms = 5;
    c.tilt.cooldown_ms = 0;
    c
}

fn wait_for<F>(engine: &EngineHandle, mut pred: F) -> Option<EngineEvent>
where
    F: FnMut(&EngineEvent) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if let Some(e) = engine.next_event(Duration::from_millis(50)) {
            if pred(&e) {
                return Some(e);
            }
        }
    }
    None
}

fn finished(engine: &EngineHandle) -> RoundSummary {
    match wait_for(engine, |e| matches!(e, EngineEvent::Finished(_))) {
        Some(EngineEvent::Finished(s)) => s,
        other => panic!("round did not finish: {other:?}"),
    }
}

#[test]
fn tilts_score_before_the_buzzer() {
    let mut config = fast_config();
    // Slow enough that the tilts land well inside the round.
    config.timing.tick_interval_ms = 20;
    let engine = EngineHandle::spawn(&config);
    let mut sampler = OrientationSampler::new(Box::new(PreGranted));

    engine.send(EngineCommand::LoadDeck(curated::find("animals").unwrap())).unwrap();
    engine.send(EngineCommand::StartCountdown).unwrap();
    let granted = sampler.request_permission();
    engine.send(EngineCommand::SetPermission(granted)).unwrap();
    engine.send(EngineCommand::StartGame).unwrap();

    let readings = [
        RawOrientation { alpha: Some(0.0), beta: Some(5.0),   gamma: Some(-88.0) }, // neutral
        RawOrientation { alpha: Some(0.0), beta: Some(165.0), gamma: Some(-80.0) }, // correct
        RawOrientation { alpha: Some(0.0), beta: Some(5.0),   gamma: Some(-30.0) }, // pass
        RawOrientation { alpha: Some(0.0), beta: Some(-160.0), gamma: Some(-85.0) }, // correct
    ];
    for raw in &readings {
        let sample = sampler.sample(raw, Instant::now()).expect("permission granted");
        engine.send(EngineCommand::Sample(sample)).unwrap();
    }

    let summary = finished(&engine);
    assert_eq!(summary.score, 2);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.percentage, 67);
    assert_eq!(summary.correct[0].as_str(), "Lion");
    assert_eq!(summary.passed[0].as_str(), "Tiger");
}

#[test]
fn denied_permission_still_plays_with_buttons() {
    let engine = EngineHandle::spawn(&fast_config());
    engine.send(EngineCommand::LoadDeck(curated::find("food").unwrap())).unwrap();
    engine.send(EngineCommand::StartCountdown).unwrap();
    engine.send(EngineCommand::SetPermission(false)).unwrap();
    engine.send(EngineCommand::StartGame).unwrap();

    let tilt = normalize(
        &RawOrientation { alpha: None, beta: Some(170.0), gamma: Some(-30.0) },
        Instant::now(),
    );
    engine.send(EngineCommand::Sample(tilt)).unwrap();
    engine.send(EngineCommand::Guess(Guess::Pass)).unwrap();

    let summary = finished(&engine);
    assert_eq!(summary.score, 0);
    assert_eq!(summary.total, 1);
}

#[test]
fn play_again_keeps_permission() {
    let engine = EngineHandle::spawn(&fast_config());
    engine.send(EngineCommand::LoadDeck(curated::find("objects").unwrap())).unwrap();
    engine.send(EngineCommand::StartCountdown).unwrap();
    engine.send(EngineCommand::SetPermission(true)).unwrap();
    engine.send(EngineCommand::StartGame).unwrap();
    finished(&engine);

    engine.send(EngineCommand::Reset).unwrap();
    let view = wait_for(&engine, |e| {
        matches!(e, EngineEvent::Updated(v) if v.session.status == Status::Idle)
    });
    match view {
        Some(EngineEvent::Updated(v)) => {
            assert!(v.session.has_permission);
            assert!(v.session.permission_requested);
            assert!(v.session.deck.is_none());
            assert_eq!(v.session.time_left, ROUND_SECONDS);
            assert!(!v.calibrated);
        }
        other => panic!("no idle view after reset: {other:?}"),
    }
}
