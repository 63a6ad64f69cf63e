//! BPWIZ - Terminal Business Permit Wizard
//!
//! A terminal-based, multi-step application wizard for municipal business
//! permits, built in Rust. Collects owner and business details, document
//! references, runs a simulated AI document verification, shows the fee
//! summary, captures consent, and issues an application number.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
