pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod review;
pub mod store;

pub use database::SqliteStore;
pub use models::{Card, DeckFilters, Difficulty, Quality, SchedulingState, StudySession};
pub use store::{FavoritesStore, MetadataStore, ReviewLog};
