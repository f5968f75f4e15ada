//! # CheckMySugar Library
//!
//! This library exposes the CheckMySugar modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod error;
pub mod logging;

pub use error::AppError;

// Re-export checkmysugar_core for convenience
pub use checkmysugar_core;
