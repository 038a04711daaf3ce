//! Boundary to the external enhancement cost engine.

pub mod client;
pub mod types;

pub use client::*;
pub use types::*;
