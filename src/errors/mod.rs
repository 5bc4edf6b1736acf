//! # Error Handling
//!
//! Crate-wide error type built with `thiserror`.

pub mod types;

pub use types::{Error, Result};
