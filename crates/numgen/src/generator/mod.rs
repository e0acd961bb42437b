mod number;

pub use number::*;
