pub mod card;
pub mod deck_builder;
pub mod due;
pub mod quality;
pub mod review_event;
pub mod scheduling_state;
pub mod sm2;
pub mod study_session;

pub use card::{Card, CardId, Difficulty, FavoriteSet};
pub use deck_builder::DeckFilters;
pub use quality::Quality;
pub use review_event::ReviewEvent;
pub use scheduling_state::{DEFAULT_EASINESS, MIN_EASINESS, SchedulingState, StatePatch};
pub use study_session::StudySession;
