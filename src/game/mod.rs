// Game engine modules

pub mod geo;
pub mod session;

pub use geo::distance_km;
pub use session::{start_session, GuessOutcome, RoundAdvance, RoundState, RoundView, SessionEngine};
