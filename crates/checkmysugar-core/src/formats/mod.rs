//! # Formats Module
//!
//! Byte formats for CheckMySugar models.
//!
//! This module contains:
//! - Binary model snapshot format (postcard + header)
//!
//! Note: File I/O operations remain in the app layer (apps/checkmysugar).
//! This module only handles format conversion (pure transformations).

mod persistence;

pub use persistence::*;
