//! Moving star force progress from one item onto a higher-level one.
//!
//! `logic` decides eligibility and computes the resulting pair without
//! touching anything; `executor` writes a resolved pair into a character's
//! equipment list.

pub mod executor;
pub mod logic;
pub mod types;

pub use executor::*;
pub use logic::*;
pub use types::*;
