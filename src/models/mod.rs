//! Data models for deckscribe.

mod deck;

pub use deck::{DeckFormat, ProcessedDeck, SlideImage, UploadedDeck};
