pub mod place;
pub mod session;
pub mod settings;

pub use place::{Coordinate, NewPlace, Place, PlaceImage, PlaceSource, SeedPlace};
pub use session::{GameSession, GameSessionRecord, Guess, SessionSummary, SortKey};
pub use settings::{Settings, DEFAULT_ROUNDS, MAX_ROUNDS, MIN_ROUNDS};
