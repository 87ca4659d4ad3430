pub mod adapters;
pub mod domain;
pub mod ports;

pub use domain::app::App;
pub use domain::deck::{DeckError, DeckReport};
