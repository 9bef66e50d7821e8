//! The `Card` and `Deck` types and their validation rules.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::error::DeckError;

// ════════════════════════════════════════════════════════════════════════════
// Limits
// ════════════════════════════════════════════════════════════════════════════

/// Number of cards in every playable deck.
pub const DECK_SIZE:       usize = 25;
pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_ICON_CHARS:  usize = 10;
pub const MAX_CARD_CHARS:  usize = 50;

/// Icon used when a supplier leaves it blank.
pub const DEFAULT_ICON: &str = "🎯";

// ════════════════════════════════════════════════════════════════════════════
// Card
// ════════════════════════════════════════════════════════════════════════════

/// A short word or phrase shown to the guessers. 1–50 characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Card(String);

impl Card {
    /// Validate one card. `index` is only used for the error.
    pub fn parse(index: usize, raw: &str) -> Result<Card, DeckError> {
        let text = raw.trim();
        let len  = text.chars().count();
        if len == 0 {
            return Err(DeckError::EmptyCard { index });
        }
        if len > MAX_CARD_CHARS {
            return Err(DeckError::CardTooLong { index, len, max: MAX_CARD_CHARS });
        }
        Ok(Card(text.to_string()))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Deck
// ════════════════════════════════════════════════════════════════════════════

/// A validated deck of exactly [`DECK_SIZE`] cards.
///
/// Fields are private so that a `Deck` can only come out of [`Deck::new`]
/// (or something built on it) and the card count holds everywhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Deck {
    id:    String,
    title: String,
    icon:  String,
    cards: Vec<Card>,
}

impl Deck {
    /// Build a deck, truncating extra cards and rejecting short decks.
    ///
    /// Title and cards are trimmed before their lengths are checked.  Only
    /// the 25 cards that are kept are validated; anything past the cut is
    /// discarded unseen.
    pub fn new<I, S>(
        id:    impl Into<String>,
        title: &str,
        icon:  &str,
        cards: I,
    ) -> Result<Deck, DeckError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let title = title.trim();
        let title_len = title.chars().count();
        if title_len == 0 {
            return Err(DeckError::EmptyTitle);
        }
        if title_len > MAX_TITLE_CHARS {
            return Err(DeckError::TitleTooLong { len: title_len, max: MAX_TITLE_CHARS });
        }

        let icon = match icon.trim() {
            ""    => DEFAULT_ICON,
            other => other,
        };
        let icon_len = icon.chars().count();
        if icon_len > MAX_ICON_CHARS {
            return Err(DeckError::IconTooLong { len: icon_len, max: MAX_ICON_CHARS });
        }

        let raw: Vec<S> = cards.into_iter().collect();
        if raw.len() < DECK_SIZE {
            return Err(DeckError::TooFewCards { found: raw.len(), required: DECK_SIZE });
        }
        if raw.len() > DECK_SIZE {
            tracing::debug!(found = raw.len(), "truncating deck to {} cards", DECK_SIZE);
        }

        let cards = raw
            .iter()
            .take(DECK_SIZE)
            .enumerate()
            .map(|(i, c)| Card::parse(i, c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Deck {
            id:    id.into(),
            title: title.to_string(),
            icon:  icon.to_string(),
            cards,
        })
    }

    /// Built-in decks. The array type pins the card count; card lengths are
    /// checked by the curated-deck tests.
    pub(crate) fn from_static(id: &str, title: &str, icon: &str, cards: &[&str; DECK_SIZE]) -> Deck {
        Deck {
            id:    id.to_string(),
            title: title.to_string(),
            icon:  icon.to_string(),
            cards: cards.iter().map(|c| Card(c.to_string())).collect(),
        }
    }

    pub fn id(&self)    -> &str    { &self.id }
    pub fn title(&self) -> &str    { &self.title }
    pub fn icon(&self)  -> &str    { &self.icon }
    pub fn cards(&self) -> &[Card] { &self.cards }
    pub fn len(&self)   -> usize   { self.cards.len() }

    /// Always false; present for symmetry with `len`.
    pub fn is_empty(&self) -> bool { self.cards.is_empty() }

    /// A copy of this deck with the card order permuted.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Deck {
        let mut cards = self.cards.clone();
        cards.shuffle(rng);
        Deck { cards, ..self.clone() }
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({} cards)", self.icon, self.title, self.cards.len())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("word{i}")).collect()
    }

    #[test]
    fn exact_deck_keeps_every_card() {
        let d = Deck::new("x", "Title", "*", words(25)).unwrap();
        assert_eq!(d.len(), 25);
        assert_eq!(d.cards()[0].as_str(), "word0");
    }

    #[test]
    fn long_deck_truncates_in_order() {
        let d = Deck::new("x", "Title", "*", words(30)).unwrap();
        assert_eq!(d.len(), DECK_SIZE);
        let got: Vec<&str> = d.cards().iter().map(Card::as_str).collect();
        let want: Vec<String> = words(25);
        assert_eq!(got, want.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn short_deck_is_rejected() {
        let err = Deck::new("x", "Title", "*", words(10)).unwrap_err();
        assert!(matches!(err, DeckError::TooFewCards { found: 10, required: 25 }));
    }

    #[test]
    fn card_beyond_cut_is_not_validated() {
        let mut cards = words(25);
        cards.push(String::new());
        assert!(Deck::new("x", "Title", "*", cards).is_ok());
    }

    #[test]
    fn blank_card_is_rejected() {
        let mut cards = words(25);
        cards[3] = "   ".to_string();
        let err = Deck::new("x", "Title", "*", cards).unwrap_err();
        assert!(matches!(err, DeckError::EmptyCard { index: 3 }));
    }

    #[test]
    fn card_length_counts_chars_not_bytes() {
        let mut cards = words(25);
        cards[0] = "é".repeat(50);
        assert!(Deck::new("x", "Title", "*", cards.clone()).is_ok());
        cards[0] = "é".repeat(51);
        assert!(matches!(
            Deck::new("x", "Title", "*", cards).unwrap_err(),
            DeckError::CardTooLong { index: 0, len: 51, .. }
        ));
    }

    #[test]
    fn title_rules() {
        assert!(matches!(Deck::new("x", "  ", "*", words(25)), Err(DeckError::EmptyTitle)));
        let long = "t".repeat(101);
        assert!(matches!(
            Deck::new("x", &long, "*", words(25)),
            Err(DeckError::TitleTooLong { len: 101, .. })
        ));
    }

    #[test]
    fn blank_icon_gets_default() {
        let d = Deck::new("x", "Title", "", words(25)).unwrap();
        assert_eq!(d.icon(), DEFAULT_ICON);
        assert!(Deck::new("x", "Title", "abcdefghijk", words(25)).is_err());
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let d = Deck::new("x", "Title", "*", words(25)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let s = d.shuffled(&mut rng);
        assert_eq!(s.len(), 25);
        assert_eq!(s.id(), d.id());
        let mut a: Vec<_> = d.cards().to_vec();
        let mut b: Vec<_> = s.cards().to_vec();
        a.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        b.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        assert_eq!(a, b);
    }
}
