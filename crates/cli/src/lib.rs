//! `wmctl`: operator CLI over the working-memory store.

pub mod cli;
