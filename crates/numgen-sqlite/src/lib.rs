#![doc = include_str!("../README.md")]

mod error;
mod store;

pub use error::*;
pub use store::*;
