pub mod card;
pub mod deck;
pub mod review;

pub use card::{Card, CardType, NewCard};
pub use deck::Deck;
pub use review::{ReviewEvent, ReviewOutcome, SchedulingState};
