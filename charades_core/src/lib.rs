//! # charades_core
//!
//! Round logic for tilt-to-answer charades: a timed round over a 25-card
//! deck where a phone held against the forehead is tilted to mark the
//! current card correct or passed.
//!
//! ## Pipeline
//!
//! ```text
//! RawOrientation ─▶ OrientationSampler ─▶ Calibrator ─▶ GestureClassifier ─▶ GameSessionMachine
//!                    (permission, normalize) (first sample   (Pass / Correct,     (piles, clock,
//!                                             is neutral)     1 s cooldown)        status)
//! ```
//!
//! ## States
//!
//! | Status | Clock | Tilt input | Leaves via |
//! |---|---|---|---|
//! | `idle`          | stopped | ignored | `start_countdown` (deck loaded) |
//! | `counting_down` | stopped | ignored | `start_game`, `reset` |
//! | `playing`       | running | live if permitted | `pause`, last tick, `reset` |
//! | `paused`        | stopped | ignored | `resume`, `reset` |
//! | `finished`      | stopped | ignored | `reset` |
//!
//! [`engine::EngineHandle`] runs all of it on one thread so every mutation
//! is serialized.
//!
//! ## Quick start
//!
//! ```rust
//! use charades_core::{GameSessionMachine, Guess, Status};
//! use charades_deck::curated;
//!
//! let mut m = GameSessionMachine::new();
//! m.load_deck(curated::find("animals").unwrap());
//! m.start_countdown();
//! m.start_game();
//! m.apply(Guess::Correct);
//! assert_eq!(m.session().correct.len(), 1);
//! assert_eq!(m.status(), Status::Playing);
//! ```

pub mod calibration;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod sampler;
pub mod session;
pub mod ticker;

pub use calibration::{CalibrationBaseline, Calibrator, Observation, DEFAULT_NEUTRAL_GAMMA};
pub use classifier::{GestureClassifier, GestureEvent, Guess, TiltThresholds};
pub use config::{GameConfig, SensorConfig, TimingConfig};
pub use engine::{Engine, EngineCommand, EngineEvent, EngineHandle, SessionView};
pub use error::{Error, Result};
pub use pipeline::{Feed, TiltPipeline};
pub use sampler::{
    normalize, NoSensor, OrientationSample, OrientationSampler, Permission, PermissionProvider,
    PreGranted, RawOrientation,
};
pub use session::{
    GameSession, GameSessionMachine, Rating, RoundSummary, SensorActive, Status, ROUND_SECONDS,
};
pub use ticker::Ticker;
