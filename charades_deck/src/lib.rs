//! # charades_deck
//!
//! Card decks for a forehead-charades round.
//!
//! A [`Deck`] is always exactly [`DECK_SIZE`] cards once it exists: every
//! constructor validates, so the game machine never has to.  Suppliers that
//! produce more cards are truncated to the first 25; suppliers that produce
//! fewer are rejected with [`DeckError::TooFewCards`].
//!
//! ## Sources
//!
//! | Source | Type | Notes |
//! |---|---|---|
//! | Built-in decks | [`curated::curated_decks`] | Animals, Movies, Food, Actions, Objects |
//! | JSON payload | [`DeckPayload`] / [`Deck::from_json`] | `{title, icon, cards}` as produced by the remote generator |
//! | JSON file | [`Deck::load`] | same shape, read from disk |
//!
//! Shuffling is a supplier concern ([`DeckSupplier`]); a loaded deck is
//! dealt in stored order.
//!
//! ## Quick start
//!
//! ```rust
//! use charades_deck::{Deck, DECK_SIZE};
//!
//! let cards: Vec<String> = (1..=30).map(|i| format!("Card {i}")).collect();
//! let deck = Deck::new("d1", "Numbers", "#", cards).unwrap();
//! assert_eq!(deck.len(), DECK_SIZE);
//! assert_eq!(deck.cards()[24].as_str(), "Card 25");
//! ```

pub mod curated;
pub mod deck;
pub mod error;
pub mod payload;
pub mod supplier;

pub use deck::{Card, Deck, DECK_SIZE, DEFAULT_ICON, MAX_CARD_CHARS, MAX_ICON_CHARS, MAX_TITLE_CHARS};
pub use error::DeckError;
pub use payload::DeckPayload;
pub use supplier::{CuratedSupplier, DeckSupplier, FileSupplier, Shuffle};
