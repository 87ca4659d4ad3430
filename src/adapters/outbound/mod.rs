pub mod cache;
pub mod card_store;
