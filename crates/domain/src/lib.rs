//! Shared building blocks for the working-memory crates: the error type,
//! typed configuration, structured trace events, and timestamp wire helpers.

pub mod config;
pub mod error;
pub mod time;
pub mod trace;
