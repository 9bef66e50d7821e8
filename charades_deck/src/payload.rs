//! JSON deck ingestion.
//!
//! The wire shape is the one the remote deck generator returns:
//!
//! ```json
//! { "title": "Space", "icon": "🚀", "cards": ["Rocket", "Moon", "..."] }
//! ```
//!
//! `id` is optional; when absent one is generated.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::deck::Deck;
use crate::error::DeckError;

/// Unvalidated deck as it arrives from a supplier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id:    Option<String>,
    pub title: String,
    #[serde(default)]
    pub icon:  String,
    pub cards: Vec<String>,
}

impl DeckPayload {
    /// Validate into a playable [`Deck`].
    pub fn into_deck(self) -> Result<Deck, DeckError> {
        let id = self.id.unwrap_or_else(generate_id);
        Deck::new(id, &self.title, &self.icon, self.cards)
    }
}

impl From<&Deck> for DeckPayload {
    fn from(deck: &Deck) -> Self {
        DeckPayload {
            id:    Some(deck.id().to_string()),
            title: deck.title().to_string(),
            icon:  deck.icon().to_string(),
            cards: deck.cards().iter().map(|c| c.as_str().to_string()).collect(),
        }
    }
}

impl Deck {
    /// Parse and validate a JSON payload.
    pub fn from_json(json: &str) -> Result<Deck, DeckError> {
        let payload: DeckPayload = serde_json::from_str(json)?;
        payload.into_deck()
    }

    /// Read a JSON payload from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Deck, DeckError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| DeckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let deck = Deck::from_json(&json)?;
        tracing::debug!(path = %path.display(), id = deck.id(), "loaded deck file");
        Ok(deck)
    }

    pub fn to_json(&self) -> Result<String, DeckError> {
        Ok(serde_json::to_string_pretty(&DeckPayload::from(self))?)
    }
}

/// `custom_<unix millis>_<9 base-36 chars>`.
fn generate_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("custom_{}_{}", millis, suffix)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
