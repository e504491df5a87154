//! hype core library
//!
//! This crate provides the error taxonomy, the common value types and the
//! protocol type registry shared by every other hype crate.

pub mod error;
pub mod protocol;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use protocol::Type;
pub use types::*;
