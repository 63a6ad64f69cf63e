pub mod models;
pub mod sequencer;
pub mod services;
pub mod errors;

pub use models::*;
pub use sequencer::*;
pub use services::*;
pub use errors::*;
