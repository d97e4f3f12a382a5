#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod combine;
pub mod error;
pub mod normalize;
pub mod threshold;

pub use combine::{combine, CombinationMethod};
pub use error::FusionError;

/// Common type definitions
pub type Score = f64;
pub type Weight = f64;
