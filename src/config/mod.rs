//! Configuration module for Folio
//!
//! This module handles application settings, including
//! serialization/deserialization to/from JSON and persistent storage in the
//! platform-specific config directory.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
