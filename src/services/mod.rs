//! Service layer: the upload pipeline and storage retention.

mod deck;
mod retention;

pub use deck::{DeckError, DeckService};
pub use retention::{delete_deck, spawn_sweeper, sweep, SweepReport};
