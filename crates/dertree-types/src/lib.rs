#![forbid(unsafe_code)]
#![doc = "Common error types shared by the dertree crates."]

pub mod error;

pub use error::*;
