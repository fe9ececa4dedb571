pub mod controller;
pub mod registry;

pub use controller::{ReviewController, ReviewSession, SessionState, Submission};
pub use registry::{generate_session_id, SessionRegistry};
