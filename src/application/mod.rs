//! Application layer managing state and wizard workflows.
//!
//! This module coordinates between the domain layer and presentation layer,
//! managing application state, step transitions and the verification run.

pub mod state;

pub use state::*;
