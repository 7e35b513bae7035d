/*!
error module defines the error types used in bgpkit-flowspec.
*/
use crate::models::{Afi, ComponentKind, Safi};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// Fewer bytes are available than the field being read requires.
    ///
    /// ## Occurs during:
    ///  - Reading operands, values, prefixes, route distinguishers and communities
    #[error("buffer underrun: need {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },
    /// The component type byte has no parser registered for the address family.
    ///
    /// ## Occurs during:
    ///  - Parsing flowspec NLRI with [UnknownComponentPolicy::Reject][crate::UnknownComponentPolicy]
    #[error("unknown flowspec component type {0}")]
    UnknownComponentType(u8),
    /// The component kind has no serializer registered for the address family.
    #[error("no serializer registered for flowspec component {0}")]
    UnknownSerializer(ComponentKind),
    /// Encoded NLRI body exceeds the 4095 bytes the length field can express.
    #[error("flowspec NLRI too long: {0} bytes")]
    NlriTooLong(usize),
    /// The declared NLRI length is zero or larger than the available bytes.
    #[error("malformed flowspec NLRI length {length}, {remaining} bytes remaining")]
    MalformedNlriLength { length: usize, remaining: usize },
    #[error("malformed prefix: {0}")]
    MalformedPrefix(String),
    /// This error represents a [ipnet::PrefixLenError] error. It occurs if a prefix length is
    /// larger than the length of the address it is being applied to.
    #[error("invalid network prefix mask")]
    InvalidPrefixLength(#[from] ipnet::PrefixLenError),
    #[error("flowspec component {0} has no operands")]
    EmptyOperandList(ComponentKind),
    #[error("value {value} out of range for flowspec component {kind}")]
    ValueOutOfRange { kind: ComponentKind, value: u64 },
    /// A handler was given a component of a kind it does not encode.
    #[error("handler cannot encode flowspec component {0}")]
    HandlerMismatch(ComponentKind),
    #[error("invalid component order: type {found} after type {previous}")]
    InvalidComponentOrder { previous: u8, found: u8 },
    #[error("flowspec VPN NLRI requires a route distinguisher")]
    MissingRouteDistinguisher,
    #[error("parser for component type {component_type} already registered for {afi:?}/{safi:?}")]
    ParserAlreadyRegistered {
        afi: Afi,
        safi: Safi,
        component_type: u8,
    },
    #[error("serializer for component {kind} already registered for {afi:?}/{safi:?}")]
    SerializerAlreadyRegistered {
        afi: Afi,
        safi: Safi,
        kind: ComponentKind,
    },
}
