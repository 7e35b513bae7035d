//! Flow specification NLRI and action codecs, RFC 8955 and RFC 8956.
mod actions;
mod handlers;
mod nlri;
mod registry;

pub use actions::*;
pub use handlers::{
    ComponentParser, ComponentSerializer, FragmentHandler, NumericHandler, PrefixHandler,
    TcpFlagsHandler,
};
pub use nlri::{FlowSpecCodec, MAX_NLRI_LENGTH};
pub use registry::{ComponentRegistry, FlowSpecRegistry, HandlerRegistration};
