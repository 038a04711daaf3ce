//! Star force planner - equipment enhancement planning engine.
//!
//! Two cores: transfer rules that move enhancement progress between pieces
//! of equipment, and a calculation pipeline that turns pending enhancement
//! goals into cost/risk projections via an external cost engine.

pub mod calculation;
pub mod character;
pub mod config;
pub mod engine;
pub mod equipment;
pub mod error;
pub mod format;
pub mod luck;
pub mod transfer;
