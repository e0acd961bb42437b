mod counts;
mod shared;

pub use counts::*;
pub use shared::*;
