// syscomb/src/commands/mod.rs
//! Command implementations.

pub mod combine;
