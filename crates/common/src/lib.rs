//! Shared error plumbing used across the gallery-saver crates.

pub mod error;

pub use error::FromMessage;
