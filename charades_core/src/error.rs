//! Error types.
//!
//! Invalid state transitions are not errors; the machine ignores them.

use charades_deck::DeckError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine thread is gone")]
    EngineGone,
}

pub type Result<T> = std::result::Result<T, Error>;
