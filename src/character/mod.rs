//! Characters, their equipment lists, and the record store.

pub mod persistence;
pub mod store;
pub mod types;

pub use persistence::*;
pub use store::*;
pub use types::*;
