//! # CAPS Common Library
//!
//! Shared code for the comment analysis pipeline service:
//! - Error and result types
//! - Bootstrap configuration loading (TOML)
//! - Data folder resolution
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
