pub mod due_set;
pub mod scheduler;

pub use due_set::{due_cards, due_count, load_latest_states, StateMap};
pub use scheduler::{format_interval, next_state, preview, ScheduleStep};
