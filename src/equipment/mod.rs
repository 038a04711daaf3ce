//! Equipment records: slots, slot families, star limits.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
