/*!
Wire codecs: flow specification NLRI and the extended communities carrying flowspec actions.
*/
pub mod bgp;
pub mod flowspec;
pub mod utils;

pub(crate) use self::utils::*;

pub use bgp::attributes::*;
pub use flowspec::*;
