pub mod app;
pub mod card;
pub mod classifier;
pub mod deck;
pub mod enricher;
pub mod format;
pub mod game;
pub mod grouping;
pub mod parser;
pub mod set_codes;
pub mod tagger;
pub mod utils;
pub mod validator;
