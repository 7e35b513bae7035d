//! Flow specification traffic filtering actions, RFC 8955 Section 7.
//!
//! Actions travel in the extended communities attribute of a flowspec route. Communities that
//! are not flowspec actions are decoded with the generic extended community parser.

use crate::models::*;
use crate::parser::{encode_extended_community, parse_extended_community, ReadUtils};
use crate::ParserError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::debug;

const TRAFFIC_ACTION_SAMPLE: u8 = 0x02;
const TRAFFIC_ACTION_TERMINAL: u8 = 0x01;
const REDIRECT_IP_NEXT_HOP_SUBTYPE: u8 = 0x00;
const REDIRECT_IP_NEXT_HOP_COPY: u16 = 0x0001;

/// Parse a single 8-byte extended community, decoding flowspec actions.
pub fn parse_flowspec_extended_community(
    input: &mut Bytes,
) -> Result<FlowSpecExtendedCommunity, ParserError> {
    input.has_n_remaining(8)?;
    let ec_type = ExtendedCommunityType::from(input[0]);
    let subtype = input[1];

    let action = match (ec_type, FlowSpecActionSubtype::try_from(subtype)) {
        (ExtendedCommunityType::GenericExperimental, Ok(subtype)) => {
            input.advance(2);
            match subtype {
                FlowSpecActionSubtype::TrafficRate => FlowSpecAction::TrafficRate {
                    asn: input.read_u16()?,
                    bandwidth: f32::from_bits(input.read_u32()?),
                },
                FlowSpecActionSubtype::TrafficAction => {
                    input.advance(5);
                    let flags = input.read_u8()?;
                    FlowSpecAction::TrafficAction {
                        sample: flags & TRAFFIC_ACTION_SAMPLE != 0,
                        terminal: flags & TRAFFIC_ACTION_TERMINAL != 0,
                    }
                }
                FlowSpecActionSubtype::Redirect => FlowSpecAction::Redirect {
                    asn: input.read_u16()?,
                    local_admin: input.read_u32()?.to_be_bytes(),
                },
                FlowSpecActionSubtype::TrafficMarking => {
                    input.advance(5);
                    FlowSpecAction::TrafficMarking {
                        dscp: input.read_u8()?,
                    }
                }
            }
        }
        (
            ExtendedCommunityType::GenericExperimentalPart2,
            Ok(FlowSpecActionSubtype::Redirect),
        ) => {
            input.advance(2);
            FlowSpecAction::RedirectIpv4 {
                global_admin: input.read_ipv4_address()?,
                local_admin: input.read_u16()?,
            }
        }
        (
            ExtendedCommunityType::GenericExperimentalPart3,
            Ok(FlowSpecActionSubtype::Redirect),
        ) => {
            input.advance(2);
            FlowSpecAction::RedirectAs4 {
                asn: input.read_u32()?,
                local_admin: input.read_u16()?,
            }
        }
        (ExtendedCommunityType::FlowSpecRedirectIpNextHop, _)
            if subtype == REDIRECT_IP_NEXT_HOP_SUBTYPE =>
        {
            input.advance(2);
            FlowSpecAction::RedirectIpNextHop {
                next_hop: input.read_ipv4_address()?,
                copy: input.read_u16()? & REDIRECT_IP_NEXT_HOP_COPY != 0,
            }
        }
        _ => {
            debug!(
                "extended community type {:#04x} subtype {:#04x} is not a flowspec action",
                u8::from(ec_type),
                subtype
            );
            return Ok(FlowSpecExtendedCommunity::Generic(parse_extended_community(
                input,
            )?));
        }
    };
    Ok(FlowSpecExtendedCommunity::Action(action))
}

/// Parse an extended communities attribute value of a flowspec route.
pub fn parse_flowspec_extended_communities(
    mut input: Bytes,
) -> Result<Vec<FlowSpecExtendedCommunity>, ParserError> {
    let mut communities = Vec::with_capacity(input.remaining() / 8);
    while input.remaining() > 0 {
        communities.push(parse_flowspec_extended_community(&mut input)?);
    }
    Ok(communities)
}

/// Encode an action as its 8-byte extended community.
pub fn encode_flowspec_action(action: &FlowSpecAction, output: &mut BytesMut) {
    match action {
        FlowSpecAction::TrafficRate { asn, bandwidth } => {
            output.put_u8(ExtendedCommunityType::GenericExperimental.into());
            output.put_u8(FlowSpecActionSubtype::TrafficRate.into());
            output.put_u16(*asn);
            output.put_f32(*bandwidth);
        }
        FlowSpecAction::TrafficAction { sample, terminal } => {
            output.put_u8(ExtendedCommunityType::GenericExperimental.into());
            output.put_u8(FlowSpecActionSubtype::TrafficAction.into());
            output.put_bytes(0, 5);
            let mut flags = 0;
            if *sample {
                flags |= TRAFFIC_ACTION_SAMPLE;
            }
            if *terminal {
                flags |= TRAFFIC_ACTION_TERMINAL;
            }
            output.put_u8(flags);
        }
        FlowSpecAction::Redirect { asn, local_admin } => {
            output.put_u8(ExtendedCommunityType::GenericExperimental.into());
            output.put_u8(FlowSpecActionSubtype::Redirect.into());
            output.put_u16(*asn);
            output.put_slice(local_admin);
        }
        FlowSpecAction::TrafficMarking { dscp } => {
            output.put_u8(ExtendedCommunityType::GenericExperimental.into());
            output.put_u8(FlowSpecActionSubtype::TrafficMarking.into());
            output.put_bytes(0, 5);
            output.put_u8(*dscp);
        }
        FlowSpecAction::RedirectIpv4 {
            global_admin,
            local_admin,
        } => {
            output.put_u8(ExtendedCommunityType::GenericExperimentalPart2.into());
            output.put_u8(FlowSpecActionSubtype::Redirect.into());
            output.put_slice(&global_admin.octets());
            output.put_u16(*local_admin);
        }
        FlowSpecAction::RedirectAs4 { asn, local_admin } => {
            output.put_u8(ExtendedCommunityType::GenericExperimentalPart3.into());
            output.put_u8(FlowSpecActionSubtype::Redirect.into());
            output.put_u32(*asn);
            output.put_u16(*local_admin);
        }
        FlowSpecAction::RedirectIpNextHop { next_hop, copy } => {
            output.put_u8(ExtendedCommunityType::FlowSpecRedirectIpNextHop.into());
            output.put_u8(REDIRECT_IP_NEXT_HOP_SUBTYPE);
            output.put_slice(&next_hop.octets());
            output.put_u16(if *copy { REDIRECT_IP_NEXT_HOP_COPY } else { 0 });
        }
    }
}

pub fn encode_flowspec_extended_community(ec: &FlowSpecExtendedCommunity, output: &mut BytesMut) {
    match ec {
        FlowSpecExtendedCommunity::Action(action) => encode_flowspec_action(action, output),
        FlowSpecExtendedCommunity::Generic(ec) => encode_extended_community(ec, output),
    }
}

pub fn encode_flowspec_extended_communities(communities: &[FlowSpecExtendedCommunity]) -> Bytes {
    let mut bytes = BytesMut::with_capacity(communities.len() * 8);
    for ec in communities {
        encode_flowspec_extended_community(ec, &mut bytes);
    }
    bytes.freeze()
}
