//! BGP-related data structures: flow specification components and actions, and the extended
//! communities that carry actions.
pub mod community;
pub mod flowspec;

pub use community::*;
pub use flowspec::*;
