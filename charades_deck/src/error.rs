//! Deck validation and ingestion errors.

use std::path::PathBuf;

/// Why a deck could not be built or loaded.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("deck has {found} cards, need at least {required}")]
    TooFewCards { found: usize, required: usize },

    #[error("deck title must not be empty")]
    EmptyTitle,

    #[error("deck title is {len} characters, limit is {max}")]
    TitleTooLong { len: usize, max: usize },

    #[error("deck icon is {len} characters, limit is {max}")]
    IconTooLong { len: usize, max: usize },

    #[error("card {index} is empty")]
    EmptyCard { index: usize },

    #[error("card {index} is {len} characters, limit is {max}")]
    CardTooLong { index: usize, len: usize, max: usize },

    #[error("no built-in deck named {0:?}")]
    UnknownDeck(String),

    #[error("malformed deck payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read deck file {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}
