//! Core types for Parley.

pub mod generation;
pub mod message;
pub mod output;
pub mod usage;

pub use generation::*;
pub use message::*;
pub use output::*;
pub use usage::*;
