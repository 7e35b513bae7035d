/*!
Data structures for flow specification rules, actions, and the address families they apply to.
*/
mod bgp;
mod network;

pub use bgp::*;
pub use network::*;
