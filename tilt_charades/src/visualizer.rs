//! Software-rendered game window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  DECK TITLE                                        0:42   │
//! │  [timer bar ───────────────────────────────────          ]│
//! │                                                           │
//! │                     CURRENT CARD                          │
//! │                                                           │
//! │  correct 3   passed 1                                     │
//! │  [tilt unavailable banner]                                │
//! │  B  12.0  G -85.3  -> --      calibrated   pose neutral   │
//! │  key legend                                               │
//! └───────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use charades_core::{Guess, RoundSummary, Status, ROUND_SECONDS};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::app::{AppState, Input, Screen};
use crate::sensor::TiltPose;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 800;
pub const WIN_H:     usize = 480;
const MARGIN:        usize = 16;
const BAR_Y:         usize = 44;
const BAR_H:         usize = 10;
const CARD_Y:        usize = 190;
const TALLY_Y:       usize = 330;
const BANNER_Y:      usize = 360;
const HUD_Y:         usize = 410;
const LEGEND_Y:      usize = WIN_H - 16;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const PANEL_BG:      u32   = 0xFF16213E;
const TEXT_COLOR:    u32   = 0xFFEEEEEE;
const DIM_TEXT:      u32   = 0xFF888888;
const GREEN:         u32   = 0xFF16A34A;
const YELLOW:        u32   = 0xFFCA8A04;
const RED:           u32   = 0xFFDC2626;
const ORANGE:        u32   = 0xFFEA580C;
const BANNER_BG:     u32   = 0xFF7C2D12;

/// Timer bar color for the seconds left.
pub fn timer_color(time_left: u32) -> u32 {
    match time_left {
        0..=10  => RED,
        11..=20 => YELLOW,
        _       => GREEN,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
}

impl Visualizer {
    pub fn new() -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Tilt Charades",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| anyhow::anyhow!("opening window: {e}"))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Decode this frame's key presses.  The tilt pose is reported every
    /// frame from the held arrow keys.
    pub fn poll_input(&mut self) -> Vec<Input> {
        let mut out = Vec::new();
        if !self.window.is_open() {
            out.push(Input::Quit);
            return out;
        }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) || pressed(Key::Escape) {
            out.push(Input::Quit);
        }
        if pressed(Key::Enter) || pressed(Key::Space) {
            out.push(Input::Correct);
        }
        if pressed(Key::Backspace) {
            out.push(Input::Pass);
        }
        if pressed(Key::P) {
            out.push(Input::TogglePause);
        }
        if pressed(Key::C) {
            out.push(Input::Recalibrate);
        }
        if pressed(Key::R) {
            out.push(Input::PlayAgain);
        }

        let pose = if self.window.is_key_down(Key::Down) {
            TiltPose::Forward
        } else if self.window.is_key_down(Key::Up) {
            TiltPose::Back
        } else {
            TiltPose::Neutral
        };
        out.push(Input::Tilt(pose));
        out
    }

    /// Render one frame.
    pub fn render(&mut self, app: &AppState, now: Instant) {
        let bg = match app.flash(now) {
            Some(Guess::Correct) => GREEN,
            Some(Guess::Pass)    => ORANGE,
            None                 => BG_COLOR,
        };
        self.buf.fill(bg);

        match app.screen(now) {
            Screen::Countdown(n) => self.draw_countdown(n),
            Screen::Round        => self.draw_round(app, now),
            Screen::TimeUp       => self.draw_centered("TIME'S UP!", CARD_Y, 6, TEXT_COLOR),
            Screen::Results      => {
                if let Some(summary) = app.summary() {
                    self.draw_results(summary);
                }
            }
        }

        self.draw_label(
            "ENTER/SPACE=correct  BKSP=pass  DOWN/UP=tilt  P=pause  C=calibrate  R=again  Q=quit",
            MARGIN, LEGEND_Y, DIM_TEXT, 1,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Countdown ─────────────────────────────────────────────────────────

    fn draw_countdown(&mut self, n: Option<u32>) {
        let text = match n {
            Some(n) => n.to_string(),
            None    => "GO!".to_string(),
        };
        self.draw_centered(&text, CARD_Y - 40, 16, TEXT_COLOR);
    }

    // ── Round ─────────────────────────────────────────────────────────────

    fn draw_round(&mut self, app: &AppState, now: Instant) {
        let s = app.session();

        // Header: deck title and clock.
        let title = s.deck.as_ref().map(|d| d.title().to_string()).unwrap_or_default();
        self.draw_label(&title, MARGIN, MARGIN, TEXT_COLOR, 3);
        let clock = format!("{}:{:02}", s.time_left / 60, s.time_left % 60);
        self.draw_label(&clock, WIN_W - MARGIN - text_width(&clock, 3), MARGIN, TEXT_COLOR, 3);

        // Timer bar.
        let full = WIN_W - 2 * MARGIN;
        self.fill_rect(MARGIN, BAR_Y, full, BAR_H, PANEL_BG);
        let w = full * s.time_left as usize / ROUND_SECONDS as usize;
        self.fill_rect(MARGIN, BAR_Y, w, BAR_H, timer_color(s.time_left));

        // Card.
        match (&s.current, s.status) {
            (_, Status::Paused) => self.draw_centered("PAUSED", CARD_Y, 8, TEXT_COLOR),
            (Some(card), _) => {
                let text = card.as_str().to_string();
                let scale = fit_scale(&text, WIN_W - 2 * MARGIN, 8);
                self.draw_centered(&text, CARD_Y, scale, TEXT_COLOR);
            }
            (None, Status::Playing) => {
                self.draw_centered("DECK EMPTY", CARD_Y, 6, DIM_TEXT);
            }
            (None, _) => {}
        }
        if let Some(guess) = app.flash(now) {
            let msg = match guess {
                Guess::Correct => "CORRECT",
                Guess::Pass    => "PASS",
            };
            self.draw_centered(msg, CARD_Y + 70, 4, TEXT_COLOR);
        }

        // Tally.
        let tally = format!("correct {}   passed {}", s.correct.len(), s.passed.len());
        self.draw_label(&tally, MARGIN, TALLY_Y, TEXT_COLOR, 2);

        // Tilt unavailable banner.
        if app.tilt_unavailable() {
            self.fill_rect(0, BANNER_Y, WIN_W, 28, BANNER_BG);
            self.draw_label(
                "TILT UNAVAILABLE - USE ENTER FOR CORRECT, BACKSPACE TO PASS",
                MARGIN, BANNER_Y + 9, TEXT_COLOR, 2,
            );
        }

        self.draw_hud(app);
    }

    /// Raw angles and what the thresholds make of them.
    fn draw_hud(&mut self, app: &AppState) {
        self.fill_rect(0, HUD_Y, WIN_W, 40, PANEL_BG);
        let axis = |v: Option<f64>| v.map_or("--".to_string(), |x| format!("{x:6.1}"));
        let line = match app.debug_reading() {
            Some((sample, verdict)) => format!(
                "B {}  G {}  -> {}",
                axis(sample.beta),
                axis(sample.gamma),
                match verdict {
                    Some(Guess::Correct) => "correct",
                    Some(Guess::Pass)    => "pass",
                    None                 => "--",
                },
            ),
            None => "no sensor readings".to_string(),
        };
        self.draw_label(&line, MARGIN, HUD_Y + 8, TEXT_COLOR, 2);

        let pose = match app.pose() {
            TiltPose::Neutral => "neutral",
            TiltPose::Forward => "forward",
            TiltPose::Back    => "back",
        };
        let cal = if app.view().calibrated { "calibrated" } else { "not calibrated" };
        let info = format!("{cal}   pose {pose}   {}", app.status);
        self.draw_label(&info, MARGIN, HUD_Y + 26, DIM_TEXT, 1);
    }

    // ── Results ───────────────────────────────────────────────────────────

    fn draw_results(&mut self, summary: &RoundSummary) {
        self.draw_centered("GAME OVER!", MARGIN, 5, TEXT_COLOR);
        let score = format!(
            "{} out of {} cards ({}%) - {}",
            summary.score, summary.total, summary.percentage, summary.rating.label()
        );
        self.draw_centered(&score, 60, 3, TEXT_COLOR);

        let col_w = (WIN_W - 3 * MARGIN) / 2;
        let top = 100;
        self.draw_label(&format!("correct ({})", summary.correct.len()), MARGIN, top, GREEN, 2);
        self.draw_label(
            &format!("passed ({})", summary.passed.len()),
            2 * MARGIN + col_w, top, ORANGE, 2,
        );
        let rows = (LEGEND_Y - top - 40) / 14;
        for (i, card) in summary.correct.iter().take(rows).enumerate() {
            self.draw_label(card.as_str(), MARGIN, top + 24 + i * 14, TEXT_COLOR, 2);
        }
        for (i, card) in summary.passed.iter().take(rows).enumerate() {
            self.draw_label(card.as_str(), 2 * MARGIN + col_w, top + 24 + i * 14, TEXT_COLOR, 2);
        }
        self.draw_label("R = play again", MARGIN, LEGEND_Y - 20, DIM_TEXT, 2);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn draw_centered(&mut self, text: &str, y: usize, scale: usize, color: u32) {
        let x = WIN_W.saturating_sub(text_width(text, scale)) / 2;
        self.draw_label(text, x, y, color, scale);
    }

    /// 3×5 bitmap font, each pixel drawn as a `scale`×`scale` block.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.set_pixel(cx + col * scale + dx, y + row * scale + dy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

fn text_width(text: &str, scale: usize) -> usize {
    (text.chars().count() * 4).saturating_sub(1) * scale
}

/// Largest scale up to `max` at which `text` fits in `width`.
fn fit_scale(text: &str, width: usize, max: usize) -> usize {
    (1..=max).rev().find(|&s| text_width(text, s) <= width).unwrap_or(1)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '&' => [0b010, 0b101, 0b010, 0b101, 0b011],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
