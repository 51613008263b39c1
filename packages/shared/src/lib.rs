//! Utilities shared across the Yoriai packages.

pub mod logger;
pub mod time;
