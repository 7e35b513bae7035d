mod afi;
mod rd;

pub use afi::*;
pub use rd::*;
