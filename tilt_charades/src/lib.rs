//! # tilt_charades
//!
//! Desktop host for forehead charades.  A card is shown in a window; the
//! player holding the "phone" tilts it forward for a correct guess or back
//! to pass, and a 60-second clock runs the round.
//!
//! ## Sensor sources
//!
//! | Source | Type | Notes |
//! |---|---|---|
//! | Simulated phone | [`sensor::SimTiltSource`] | arrow keys steer the pose, 50 Hz |
//! | Recorded session | [`sensor::ReplaySource`] | JSON lines, `{"t_ms", "alpha", "beta", "gamma"}` |
//! | None | — | `--no-sensor`; buttons only, a banner says so |
//!
//! ## Keyboard
//!
//! | Key | Action |
//! |---|---|
//! | `Enter` / `Space` | Correct |
//! | `Backspace` | Pass |
//! | `Down` (hold) | Tilt forward (simulated phone) |
//! | `Up` (hold) | Tilt back (simulated phone) |
//! | `P` | Pause / resume |
//! | `C` | Recalibrate on the next reading |
//! | `R` | Play again |
//! | `Q` / `Escape` | Quit |

pub mod app;
pub mod sensor;
pub mod visualizer;
