//! Dudwalls Core Library
//!
//! Types shared by the Dudwalls client crates:
//! - Connection configuration
//! - Documents and wire models

pub mod config;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use models::*;
