//! Cost/risk projections for pending equipment and character-wide rollups.

pub mod aggregator;
pub mod logic;
pub mod types;

pub use aggregator::*;
pub use logic::*;
pub use types::*;
