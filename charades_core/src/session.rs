//! The round state machine.
//!
//! ```text
//! idle ──start_countdown──▶ counting_down ──start_game──▶ playing ◀──▶ paused
//!  ▲                                                          │
//!  └──────────────────────── reset (from any state) ◀── finished (time_left = 0)
//! ```
//!
//! Every operation is total: an operation that does not apply in the
//! current state leaves the session untouched and returns `false`.  Stale
//! callbacks (a tilt that lands after the buzzer, a button press while
//! paused) are expected and silently dropped.

use std::collections::VecDeque;

use charades_deck::{Card, Deck, DeckPayload};
use serde::Serialize;

use crate::classifier::Guess;
use crate::error::Result;

/// Length of a round. Fixed: `time_left` lives in `[0, ROUND_SECONDS]`.
pub const ROUND_SECONDS: u32 = 60;

// ════════════════════════════════════════════════════════════════════════════
// Status
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    CountingDown,
    Playing,
    Paused,
    Finished,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Idle         => "idle",
            Status::CountingDown => "counting_down",
            Status::Playing      => "playing",
            Status::Paused       => "paused",
            Status::Finished     => "finished",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SensorActive
// ════════════════════════════════════════════════════════════════════════════

/// Proof that tilt input may currently move cards.
///
/// Only [`GameSessionMachine::sensor_active`] hands these out: while
/// `playing` with sensor permission.  Pausing, finishing or resetting stops
/// the supply, so the pipeline goes quiet without any flag bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorActive {
    _sealed: (),
}

impl SensorActive {
    pub(crate) fn mint() -> Self { SensorActive { _sealed: () } }
}

// ════════════════════════════════════════════════════════════════════════════
// GameSession
// ════════════════════════════════════════════════════════════════════════════

/// State of one round.  Only the machine mutates it; everyone else sees a
/// shared reference or a clone.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    pub status:               Status,
    pub deck:                 Option<Deck>,
    pub remaining:            VecDeque<Card>,
    pub current:              Option<Card>,
    pub correct:              Vec<Card>,
    pub passed:               Vec<Card>,
    pub time_left:            u32,
    pub has_permission:       bool,
    pub permission_requested: bool,
}

impl GameSession {
    fn initial(has_permission: bool, permission_requested: bool) -> Self {
        GameSession {
            status:    Status::Idle,
            deck:      None,
            remaining: VecDeque::new(),
            current:   None,
            correct:   Vec::new(),
            passed:    Vec::new(),
            time_left: ROUND_SECONDS,
            has_permission,
            permission_requested,
        }
    }

    /// Cards still accounted for across all four piles.  Equals the deck
    /// size whenever a deck is loaded.
    pub fn cards_accounted(&self) -> usize {
        self.remaining.len()
            + usize::from(self.current.is_some())
            + self.correct.len()
            + self.passed.len()
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary::new(
            self.deck.as_ref().map(|d| d.title().to_string()).unwrap_or_default(),
            self.correct.clone(),
            self.passed.clone(),
        )
    }
}

impl Default for GameSession {
    fn default() -> Self { GameSession::initial(false, false) }
}

// ════════════════════════════════════════════════════════════════════════════
// RoundSummary
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Rating {
    Great,
    Good,
    Okay,
}

impl Rating {
    pub fn glyph(self) -> &'static str {
        match self {
            Rating::Great => "🎉",
            Rating::Good  => "👍",
            Rating::Okay  => "😊",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Great => "great",
            Rating::Good  => "good",
            Rating::Okay  => "okay",
        }
    }
}

/// End-of-round tally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub deck_title: String,
    pub score:      usize,
    /// Cards that left play (correct + passed).
    pub total:      usize,
    /// `round(100 * score / total)`, 0 for an empty round.
    pub percentage: u32,
    pub rating:     Rating,
    pub correct:    Vec<Card>,
    pub passed:     Vec<Card>,
}

impl RoundSummary {
    pub fn new(deck_title: String, correct: Vec<Card>, passed: Vec<Card>) -> Self {
        let score = correct.len();
        let total = score + passed.len();
        let percentage = if total == 0 {
            0
        } else {
            ((score as f64 / total as f64) * 100.0).round() as u32
        };
        let rating = match percentage {
            70.. => Rating::Great,
            50.. => Rating::Good,
            _    => Rating::Okay,
        };
        RoundSummary { deck_title, score, total, percentage, rating, correct, passed }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GameSessionMachine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct GameSessionMachine {
    session: GameSession,
}

impl GameSessionMachine {
    pub fn new() -> Self { Self::default() }

    pub fn session(&self) -> &GameSession { &self.session }
    pub fn status(&self)  -> Status       { self.session.status }

    /// Granted while playing with sensor permission.
    pub fn sensor_active(&self) -> Option<SensorActive> {
        (self.session.status == Status::Playing && self.session.has_permission)
            .then(SensorActive::mint)
    }

    /// The 1 Hz timer should be running.
    pub fn timer_active(&self) -> bool {
        self.session.status == Status::Playing
    }

    // ── deck ─────────────────────────────────────────────────────────────

    /// Install a deck and re-deal the piles.  Status and permission are
    /// left alone; the caller starts the countdown separately.
    pub fn load_deck(&mut self, deck: Deck) -> bool {
        tracing::debug!(id = deck.id(), status = self.status().label(), "deck loaded");
        let s = &mut self.session;
        s.remaining = deck.cards().iter().cloned().collect();
        s.current   = None;
        s.correct.clear();
        s.passed.clear();
        s.deck      = Some(deck);
        true
    }

    /// Validate a payload and install it.  On error the previous deck and
    /// piles are kept.
    pub fn load_payload(&mut self, payload: DeckPayload) -> Result<()> {
        let deck = payload.into_deck().map_err(|e| {
            tracing::warn!(error = %e, "deck rejected");
            e
        })?;
        self.load_deck(deck);
        Ok(())
    }

    // ── transitions ──────────────────────────────────────────────────────

    pub fn start_countdown(&mut self) -> bool {
        if self.session.status != Status::Idle || self.session.deck.is_none() {
            tracing::trace!(status = self.status().label(), "start_countdown ignored");
            return false;
        }
        self.transition(Status::CountingDown);
        true
    }

    /// Deal the first card and start the clock.
    pub fn start_game(&mut self) -> bool {
        if self.session.status != Status::CountingDown {
            tracing::trace!(status = self.status().label(), "start_game ignored");
            return false;
        }
        let s = &mut self.session;
        s.current   = s.remaining.pop_front();
        s.time_left = ROUND_SECONDS;
        self.transition(Status::Playing);
        tracing::info!(card = ?self.session.current.as_ref().map(Card::as_str), "round started");
        true
    }

    /// Move the current card onto the correct or passed pile and deal the
    /// next one.  An exhausted deck leaves no current card; only the clock
    /// ends the round.
    pub fn apply(&mut self, guess: Guess) -> bool {
        if self.session.status != Status::Playing {
            tracing::trace!(?guess, status = self.status().label(), "guess ignored");
            return false;
        }
        let s = &mut self.session;
        let Some(card) = s.current.take() else {
            tracing::trace!(?guess, "guess ignored, no card in play");
            return false;
        };
        tracing::debug!(?guess, card = card.as_str(), "card scored");
        match guess {
            Guess::Correct => s.correct.push(card),
            Guess::Pass    => s.passed.push(card),
        }
        s.current = s.remaining.pop_front();
        true
    }

    /// One second off the clock.  The tick that reaches zero finishes the
    /// round in the same step.
    pub fn tick(&mut self) -> bool {
        if self.session.status != Status::Playing {
            return false;
        }
        let left = self.session.time_left.saturating_sub(1);
        self.session.time_left = left;
        if left == 0 {
            self.transition(Status::Finished);
            tracing::info!(
                correct = self.session.correct.len(),
                passed  = self.session.passed.len(),
                "round finished"
            );
        }
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.session.status != Status::Playing {
            return false;
        }
        self.transition(Status::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.session.status != Status::Paused {
            return false;
        }
        self.transition(Status::Playing);
        true
    }

    /// Back to a fresh idle session.  Only the permission fields survive.
    pub fn reset(&mut self) -> bool {
        let s = &self.session;
        self.session = GameSession::initial(s.has_permission, s.permission_requested);
        tracing::debug!("session reset");
        true
    }

    pub fn set_permission(&mut self, granted: bool) -> bool {
        self.session.has_permission       = granted;
        self.session.permission_requested = true;
        true
    }

    fn transition(&mut self, to: Status) {
        tracing::debug!(from = self.session.status.label(), to = to.label(), "status");
        self.session.status = to;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
