use crate::models::RouteDistinguisher;
use ipnet::IpNet;
use std::fmt::{Display, Formatter};

mod actions;
mod display;
pub mod operators;


pub use actions::*;
pub use display::render_flowspec;
pub use operators::*;

/// Flow Specification NLRI containing an ordered list of components.
///
/// Components are kept in the order they were decoded or supplied. `path_id` is present only
/// when parsed with add-path enabled, `route_distinguisher` only for the VPN SAFI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowSpecNlri {
    pub path_id: Option<u32>,
    pub route_distinguisher: Option<RouteDistinguisher>,
    pub components: Vec<FlowSpecComponent>,
}

impl FlowSpecNlri {
    /// Create a new Flow-Spec NLRI with the given components
    pub fn new(components: Vec<FlowSpecComponent>) -> Self {
        FlowSpecNlri {
            path_id: None,
            route_distinguisher: None,
            components,
        }
    }

    pub fn new_vpn(
        route_distinguisher: RouteDistinguisher,
        components: Vec<FlowSpecComponent>,
    ) -> Self {
        FlowSpecNlri {
            path_id: None,
            route_distinguisher: Some(route_distinguisher),
            components,
        }
    }

    pub fn with_path_id(mut self, path_id: u32) -> Self {
        self.path_id = Some(path_id);
        self
    }

    /// Get all components of this NLRI
    pub fn components(&self) -> &[FlowSpecComponent] {
        &self.components
    }
}

/// Renders the components, prefixed with the route distinguisher for VPN routes so that
/// routes of different VPNs never share a text.
impl Display for FlowSpecNlri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(rd) = &self.route_distinguisher {
            write!(f, "[l3vpn with route-distinguisher {}] ", rd)?;
        }
        write!(f, "{}", render_flowspec(&self.components))
    }
}

/// Discriminant of a [FlowSpecComponent], used to look up serializers.
///
/// `IpProtocol` and `NextHeader` share wire type 3; which one is produced depends on the
/// address family of the handler set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentKind {
    DestinationPrefix,
    SourcePrefix,
    IpProtocol,
    NextHeader,
    Port,
    DestinationPort,
    SourcePort,
    IcmpType,
    IcmpCode,
    TcpFlags,
    PacketLength,
    Dscp,
    Fragment,
    FlowLabel,
    Unknown,
}

impl ComponentKind {
    /// Wire type byte, `None` for [ComponentKind::Unknown] which carries its own.
    pub const fn type_code(&self) -> Option<u8> {
        match self {
            ComponentKind::DestinationPrefix => Some(1),
            ComponentKind::SourcePrefix => Some(2),
            ComponentKind::IpProtocol | ComponentKind::NextHeader => Some(3),
            ComponentKind::Port => Some(4),
            ComponentKind::DestinationPort => Some(5),
            ComponentKind::SourcePort => Some(6),
            ComponentKind::IcmpType => Some(7),
            ComponentKind::IcmpCode => Some(8),
            ComponentKind::TcpFlags => Some(9),
            ComponentKind::PacketLength => Some(10),
            ComponentKind::Dscp => Some(11),
            ComponentKind::Fragment => Some(12),
            ComponentKind::FlowLabel => Some(13),
            ComponentKind::Unknown => None,
        }
    }

    /// Field name used by the textual renderer.
    pub const fn field_name(&self) -> &'static str {
        match self {
            ComponentKind::DestinationPrefix => "destination prefix",
            ComponentKind::SourcePrefix => "source prefix",
            ComponentKind::IpProtocol => "IP protocol",
            ComponentKind::NextHeader => "next header",
            ComponentKind::Port => "port",
            ComponentKind::DestinationPort => "destination port",
            ComponentKind::SourcePort => "source port",
            ComponentKind::IcmpType => "ICMP type",
            ComponentKind::IcmpCode => "ICMP code",
            ComponentKind::TcpFlags => "TCP flags",
            ComponentKind::PacketLength => "packet length",
            ComponentKind::Dscp => "DSCP",
            ComponentKind::Fragment => "fragment",
            ComponentKind::FlowLabel => "flow label",
            ComponentKind::Unknown => "unknown component",
        }
    }
}

impl Display for ComponentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// Individual Flow-Spec component types as defined in RFC 8955/8956
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowSpecComponent {
    /// Type 1: Destination Prefix
    DestinationPrefix(IpNet),
    /// Type 2: Source Prefix
    SourcePrefix(IpNet),
    /// Type 3: IP Protocol (IPv4)
    IpProtocol(Vec<NumericItem>),
    /// Type 3: Next Header (IPv6)
    NextHeader(Vec<NumericItem>),
    /// Type 4: Port (source OR destination)
    Port(Vec<NumericItem>),
    /// Type 5: Destination Port
    DestinationPort(Vec<NumericItem>),
    /// Type 6: Source Port
    SourcePort(Vec<NumericItem>),
    /// Type 7: ICMP Type (IPv4) / ICMPv6 Type (IPv6)
    IcmpType(Vec<NumericItem>),
    /// Type 8: ICMP Code (IPv4) / ICMPv6 Code (IPv6)
    IcmpCode(Vec<NumericItem>),
    /// Type 9: TCP Flags
    TcpFlags(Vec<BitmaskItem>),
    /// Type 10: Packet Length
    PacketLength(Vec<NumericItem>),
    /// Type 11: DSCP
    Dscp(Vec<NumericItem>),
    /// Type 12: Fragment
    Fragment(Vec<FragmentItem>),
    /// Type 13: Flow Label (IPv6 only)
    FlowLabel(Vec<NumericItem>),
    /// A component type without a registered parser, holding all bytes that followed the
    /// type byte.
    Unknown { component_type: u8, data: Vec<u8> },
}

impl FlowSpecComponent {
    pub const fn kind(&self) -> ComponentKind {
        match self {
            FlowSpecComponent::DestinationPrefix(_) => ComponentKind::DestinationPrefix,
            FlowSpecComponent::SourcePrefix(_) => ComponentKind::SourcePrefix,
            FlowSpecComponent::IpProtocol(_) => ComponentKind::IpProtocol,
            FlowSpecComponent::NextHeader(_) => ComponentKind::NextHeader,
            FlowSpecComponent::Port(_) => ComponentKind::Port,
            FlowSpecComponent::DestinationPort(_) => ComponentKind::DestinationPort,
            FlowSpecComponent::SourcePort(_) => ComponentKind::SourcePort,
            FlowSpecComponent::IcmpType(_) => ComponentKind::IcmpType,
            FlowSpecComponent::IcmpCode(_) => ComponentKind::IcmpCode,
            FlowSpecComponent::TcpFlags(_) => ComponentKind::TcpFlags,
            FlowSpecComponent::PacketLength(_) => ComponentKind::PacketLength,
            FlowSpecComponent::Dscp(_) => ComponentKind::Dscp,
            FlowSpecComponent::Fragment(_) => ComponentKind::Fragment,
            FlowSpecComponent::FlowLabel(_) => ComponentKind::FlowLabel,
            FlowSpecComponent::Unknown { .. } => ComponentKind::Unknown,
        }
    }

    /// Get the numeric type identifier for this component
    pub const fn component_type(&self) -> u8 {
        match self {
            FlowSpecComponent::Unknown { component_type, .. } => *component_type,
            other => match other.kind().type_code() {
                Some(code) => code,
                None => 0,
            },
        }
    }

    /// Prefix of a destination or source prefix component.
    pub fn prefix(&self) -> Option<&IpNet> {
        match self {
            FlowSpecComponent::DestinationPrefix(prefix)
            | FlowSpecComponent::SourcePrefix(prefix) => Some(prefix),
            _ => None,
        }
    }

    /// Items of a component that uses numeric operators
    pub fn numeric_items(&self) -> Option<&[NumericItem]> {
        match self {
            FlowSpecComponent::IpProtocol(items)
            | FlowSpecComponent::NextHeader(items)
            | FlowSpecComponent::Port(items)
            | FlowSpecComponent::DestinationPort(items)
            | FlowSpecComponent::SourcePort(items)
            | FlowSpecComponent::IcmpType(items)
            | FlowSpecComponent::IcmpCode(items)
            | FlowSpecComponent::PacketLength(items)
            | FlowSpecComponent::Dscp(items)
            | FlowSpecComponent::FlowLabel(items) => Some(items),
            _ => None,
        }
    }

    /// Items of the TCP flags component
    pub fn bitmask_items(&self) -> Option<&[BitmaskItem]> {
        match self {
            FlowSpecComponent::TcpFlags(items) => Some(items),
            _ => None,
        }
    }

    /// Items of the fragment component
    pub fn fragment_items(&self) -> Option<&[FragmentItem]> {
        match self {
            FlowSpecComponent::Fragment(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true if this component uses numeric operators
    pub const fn uses_numeric_operators(&self) -> bool {
        matches!(
            self,
            FlowSpecComponent::IpProtocol(_)
                | FlowSpecComponent::NextHeader(_)
                | FlowSpecComponent::Port(_)
                | FlowSpecComponent::DestinationPort(_)
                | FlowSpecComponent::SourcePort(_)
                | FlowSpecComponent::IcmpType(_)
                | FlowSpecComponent::IcmpCode(_)
                | FlowSpecComponent::PacketLength(_)
                | FlowSpecComponent::Dscp(_)
                | FlowSpecComponent::FlowLabel(_)
        )
    }

    /// Returns true if this component uses bitmask operators
    pub const fn uses_bitmask_operators(&self) -> bool {
        matches!(
            self,
            FlowSpecComponent::TcpFlags(_) | FlowSpecComponent::Fragment(_)
        )
    }
}
