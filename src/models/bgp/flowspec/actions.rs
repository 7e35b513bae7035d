use crate::models::ExtendedCommunity;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

/// Sub-types of the flow specification actions carried in the generic transitive
/// experimental extended community (type 0x80), RFC 8955 Section 7.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FlowSpecActionSubtype {
    TrafficRate = 0x06,
    TrafficAction = 0x07,
    Redirect = 0x08,
    TrafficMarking = 0x09,
}

/// Flow specification traffic filtering action.
///
/// Wire layouts following the `[type][subtype]` header:
///
/// | action              | type | subtype | payload                                  |
/// |---------------------|------|---------|------------------------------------------|
/// | `TrafficRate`       | 0x80 | 0x06    | 2-byte AS, IEEE-754 f32 bytes per second |
/// | `TrafficAction`     | 0x80 | 0x07    | 5 reserved bytes, flags (S=0x02, T=0x01) |
/// | `Redirect`          | 0x80 | 0x08    | 2-byte AS, 4-byte local administrator    |
/// | `TrafficMarking`    | 0x80 | 0x09    | 5 reserved bytes, DSCP                   |
/// | `RedirectIpv4`      | 0x81 | 0x08    | IPv4 address, 2-byte local administrator |
/// | `RedirectAs4`       | 0x82 | 0x08    | 4-byte AS, 2-byte local administrator    |
/// | `RedirectIpNextHop` | 0x08 | 0x00    | IPv4 next hop, 2-byte flags (C=0x0001)   |
#[derive(Debug, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowSpecAction {
    TrafficRate { asn: u16, bandwidth: f32 },
    TrafficAction { sample: bool, terminal: bool },
    Redirect { asn: u16, local_admin: [u8; 4] },
    TrafficMarking { dscp: u8 },
    RedirectIpv4 { global_admin: Ipv4Addr, local_admin: u16 },
    RedirectAs4 { asn: u32, local_admin: u16 },
    RedirectIpNextHop { next_hop: Ipv4Addr, copy: bool },
}

impl FlowSpecAction {
    /// Bandwidth of zero discards all matching traffic.
    pub fn is_discard(&self) -> bool {
        matches!(self, FlowSpecAction::TrafficRate { bandwidth, .. } if *bandwidth == 0.0)
    }
}

/// An extended community as seen on a flow specification route: either a flowspec action or
/// any other extended community.
#[derive(Debug, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowSpecExtendedCommunity {
    Action(FlowSpecAction),
    Generic(ExtendedCommunity),
}

impl From<FlowSpecAction> for FlowSpecExtendedCommunity {
    fn from(value: FlowSpecAction) -> Self {
        FlowSpecExtendedCommunity::Action(value)
    }
}

impl From<ExtendedCommunity> for FlowSpecExtendedCommunity {
    fn from(value: ExtendedCommunity) -> Self {
        FlowSpecExtendedCommunity::Generic(value)
    }
}

impl Display for FlowSpecAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowSpecAction::TrafficRate { asn, bandwidth } => {
                write!(f, "traffic-rate:{}:{}", asn, bandwidth)
            }
            FlowSpecAction::TrafficAction { sample, terminal } => {
                write!(f, "traffic-action:sample={}:terminal={}", sample, terminal)
            }
            FlowSpecAction::Redirect { asn, local_admin } => {
                write!(f, "redirect:{}:{}", asn, u32::from_be_bytes(*local_admin))
            }
            FlowSpecAction::TrafficMarking { dscp } => write!(f, "traffic-marking:{}", dscp),
            FlowSpecAction::RedirectIpv4 {
                global_admin,
                local_admin,
            } => write!(f, "redirect:{}:{}", global_admin, local_admin),
            FlowSpecAction::RedirectAs4 { asn, local_admin } => {
                write!(f, "redirect:{}:{}", asn, local_admin)
            }
            FlowSpecAction::RedirectIpNextHop { next_hop, copy } => {
                write!(f, "redirect-to-nexthop:{}:copy={}", next_hop, copy)
            }
        }
    }
}

impl Display for FlowSpecExtendedCommunity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowSpecExtendedCommunity::Action(action) => write!(f, "{}", action),
            FlowSpecExtendedCommunity::Generic(ec) => write!(f, "{}", ec),
        }
    }
}
