#![doc = include_str!("../README.md")]

mod buffer;
mod config;
mod error;
mod generator;
mod orchestrator;
mod prime;
mod rand;
mod record;
mod store;

pub use crate::buffer::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::orchestrator::*;
pub use crate::prime::*;
pub use crate::rand::*;
pub use crate::record::*;
pub use crate::store::*;
