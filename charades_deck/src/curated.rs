//! Built-in decks.

use crate::deck::{Deck, DECK_SIZE};
use crate::error::DeckError;

const ANIMALS: [&str; DECK_SIZE] = [
    "Lion", "Tiger", "Bear", "Penguin", "Elephant", "Giraffe", "Monkey",
    "Zebra", "Kangaroo", "Panda", "Dolphin", "Shark", "Eagle", "Owl",
    "Butterfly", "Snake", "Frog", "Rabbit", "Horse", "Cow",
    "Octopus", "Crocodile", "Flamingo", "Koala", "Camel",
];

const MOVIES: [&str; DECK_SIZE] = [
    "The Matrix", "Titanic", "Jurassic Park", "Star Wars", "Harry Potter",
    "The Avengers", "Frozen", "Toy Story", "Finding Nemo", "The Lion King",
    "Inception", "The Dark Knight", "Pulp Fiction", "Forrest Gump", "The Godfather",
    "Jaws", "Back to the Future", "Shrek", "Rocky", "Ghostbusters",
    "E.T.", "Casablanca", "Gladiator", "Up", "Home Alone",
];

const FOOD: [&str; DECK_SIZE] = [
    "Pizza", "Hamburger", "Sushi", "Taco", "Ice Cream", "Chocolate", "Pasta",
    "Salad", "Sandwich", "Soup", "Steak", "Chicken", "Fish", "Rice", "Bread",
    "Pancakes", "Popcorn", "Hot Dog", "Cheese", "Banana",
    "Spaghetti", "Donut", "Burrito", "Waffles", "Lemonade",
];

const ACTIONS: [&str; DECK_SIZE] = [
    "Running", "Jumping", "Dancing", "Singing", "Swimming", "Flying", "Cooking",
    "Reading", "Writing", "Drawing", "Sleeping", "Eating", "Drinking", "Laughing", "Crying",
    "Climbing", "Juggling", "Sneezing", "Whistling", "Skiing",
    "Fishing", "Painting", "Knitting", "Bowling", "Surfing",
];

const OBJECTS: [&str; DECK_SIZE] = [
    "Phone", "Computer", "Book", "Car", "Bicycle", "Airplane", "Camera",
    "Watch", "Glasses", "Umbrella", "Key", "Wallet", "Backpack", "Lamp", "Chair",
    "Toothbrush", "Scissors", "Guitar", "Candle", "Ladder",
    "Mirror", "Pillow", "Hammer", "Balloon", "Telescope",
];

/// All built-in decks, in menu order.
pub fn curated_decks() -> Vec<Deck> {
    vec![
        Deck::from_static("deck_animals", "Animals", "🦁", &ANIMALS),
        Deck::from_static("deck_movies",  "Movies",  "🎬", &MOVIES),
        Deck::from_static("deck_food",    "Food",    "🍕", &FOOD),
        Deck::from_static("deck_actions", "Actions", "🏃", &ACTIONS),
        Deck::from_static("deck_objects", "Objects", "📱", &OBJECTS),
    ]
}

/// Look up a built-in deck by id (`deck_animals`) or by its short name
/// (`animals`), case-insensitively.
pub fn find(name: &str) -> Result<Deck, DeckError> {
    let wanted = name.trim().to_lowercase();
    curated_decks()
        .into_iter()
        .find(|d| d.id() == wanted || d.id().strip_prefix("deck_") == Some(wanted.as_str()))
        .ok_or_else(|| DeckError::UnknownDeck(name.to_string()))
}
