//! Deck suppliers.
//!
//! A supplier hands the game a validated deck, already in deal order.
//! Shuffling lives here; the session machine never reorders cards.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::curated;
use crate::deck::Deck;
use crate::error::DeckError;

/// How a supplier orders the cards it hands out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shuffle {
    /// Stored order.
    Off,
    /// Reproducible order from a seed.
    Seeded(u64),
    /// Fresh order every time.
    Random,
}

impl Shuffle {
    fn apply(self, deck: Deck) -> Deck {
        match self {
            Shuffle::Off         => deck,
            Shuffle::Seeded(s)   => deck.shuffled(&mut StdRng::seed_from_u64(s)),
            Shuffle::Random      => deck.shuffled(&mut rand::thread_rng()),
        }
    }
}

/// Anything that can produce a playable deck.
pub trait DeckSupplier {
    fn supply(&mut self) -> Result<Deck, DeckError>;
}

/// One of the built-in decks.
#[derive(Clone, Debug)]
pub struct CuratedSupplier {
    pub name:    String,
    pub shuffle: Shuffle,
}

impl CuratedSupplier {
    pub fn new(name: impl Into<String>, shuffle: Shuffle) -> Self {
        CuratedSupplier { name: name.into(), shuffle }
    }
}

impl DeckSupplier for CuratedSupplier {
    fn supply(&mut self) -> Result<Deck, DeckError> {
        Ok(self.shuffle.apply(curated::find(&self.name)?))
    }
}

/// A JSON payload on disk (user-authored or saved from the generator).
#[derive(Clone, Debug)]
pub struct FileSupplier {
    pub path:    PathBuf,
    pub shuffle: Shuffle,
}

impl FileSupplier {
    pub fn new(path: impl Into<PathBuf>, shuffle: Shuffle) -> Self {
        FileSupplier { path: path.into(), shuffle }
    }
}

impl DeckSupplier for FileSupplier {
    fn supply(&mut self) -> Result<Deck, DeckError> {
        Ok(self.shuffle.apply(Deck::load(&self.path)?))
    }
}
