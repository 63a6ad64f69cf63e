//! Infrastructure layer providing external service integrations.
//!
//! This module contains implementations for external concerns like
//! file I/O for receipt export.

pub mod persistence;

pub use persistence::*;
