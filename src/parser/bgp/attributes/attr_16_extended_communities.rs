//! BGP Extended Communities Attribute
//!
//! RFC4360: <https://datatracker.ietf.org/doc/html/rfc4360#section-4.5>
//! IANA Codes: <https://www.iana.org/assignments/bgp-extended-communities/bgp-extended-communities.xhtml>

use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Parse a single 8-byte extended community.
pub fn parse_extended_community(input: &mut Bytes) -> Result<ExtendedCommunity, ParserError> {
    input.has_n_remaining(8)?;
    let ec_type_u8 = input.read_u8()?;
    let ec = match ExtendedCommunityType::from(ec_type_u8) {
        ExtendedCommunityType::TransitiveTwoOctetAs
        | ExtendedCommunityType::NonTransitiveTwoOctetAs => {
            let ec = TwoOctetAsExtCommunity {
                subtype: input.read_u8()?,
                global_admin: input.read_u16()?,
                local_admin: input.read_u32()?.to_be_bytes(),
            };
            match ec_type_u8 {
                0x00 => ExtendedCommunity::TransitiveTwoOctetAs(ec),
                _ => ExtendedCommunity::NonTransitiveTwoOctetAs(ec),
            }
        }
        ExtendedCommunityType::TransitiveIpv4Addr | ExtendedCommunityType::NonTransitiveIpv4Addr => {
            let ec = Ipv4AddrExtCommunity {
                subtype: input.read_u8()?,
                global_admin: input.read_ipv4_address()?,
                local_admin: input.read_u16()?.to_be_bytes(),
            };
            match ec_type_u8 {
                0x01 => ExtendedCommunity::TransitiveIpv4Addr(ec),
                _ => ExtendedCommunity::NonTransitiveIpv4Addr(ec),
            }
        }
        ExtendedCommunityType::TransitiveFourOctetAs
        | ExtendedCommunityType::NonTransitiveFourOctetAs => {
            let ec = FourOctetAsExtCommunity {
                subtype: input.read_u8()?,
                global_admin: input.read_u32()?,
                local_admin: input.read_u16()?.to_be_bytes(),
            };
            match ec_type_u8 {
                0x02 => ExtendedCommunity::TransitiveFourOctetAs(ec),
                _ => ExtendedCommunity::NonTransitiveFourOctetAs(ec),
            }
        }
        ExtendedCommunityType::TransitiveOpaque | ExtendedCommunityType::NonTransitiveOpaque => {
            let subtype = input.read_u8()?;
            let mut value: [u8; 6] = [0; 6];
            input.copy_to_slice(&mut value);
            let ec = OpaqueExtCommunity { subtype, value };
            match ec_type_u8 {
                0x03 => ExtendedCommunity::TransitiveOpaque(ec),
                _ => ExtendedCommunity::NonTransitiveOpaque(ec),
            }
        }
        _ => {
            let mut buffer: [u8; 8] = [0; 8];
            buffer[0] = ec_type_u8;
            input.copy_to_slice(&mut buffer[1..]);
            ExtendedCommunity::Raw(buffer)
        }
    };
    Ok(ec)
}

/// Parse an extended communities attribute value into its 8-byte communities.
pub fn parse_extended_communities(mut input: Bytes) -> Result<Vec<ExtendedCommunity>, ParserError> {
    let mut communities = Vec::with_capacity(input.remaining() / 8);
    while input.remaining() > 0 {
        communities.push(parse_extended_community(&mut input)?);
    }
    Ok(communities)
}

pub fn encode_extended_community(ec: &ExtendedCommunity, output: &mut BytesMut) {
    let ec_type = u8::from(ec.community_type());
    match ec {
        ExtendedCommunity::TransitiveTwoOctetAs(ec)
        | ExtendedCommunity::NonTransitiveTwoOctetAs(ec) => {
            output.put_u8(ec_type);
            output.put_u8(ec.subtype);
            output.put_u16(ec.global_admin);
            output.put_slice(&ec.local_admin);
        }
        ExtendedCommunity::TransitiveIpv4Addr(ec) | ExtendedCommunity::NonTransitiveIpv4Addr(ec) => {
            output.put_u8(ec_type);
            output.put_u8(ec.subtype);
            output.put_slice(&ec.global_admin.octets());
            output.put_slice(&ec.local_admin);
        }
        ExtendedCommunity::TransitiveFourOctetAs(ec)
        | ExtendedCommunity::NonTransitiveFourOctetAs(ec) => {
            output.put_u8(ec_type);
            output.put_u8(ec.subtype);
            output.put_u32(ec.global_admin);
            output.put_slice(&ec.local_admin);
        }
        ExtendedCommunity::TransitiveOpaque(ec) | ExtendedCommunity::NonTransitiveOpaque(ec) => {
            output.put_u8(ec_type);
            output.put_u8(ec.subtype);
            output.put_slice(&ec.value);
        }
        ExtendedCommunity::Raw(buffer) => output.put_slice(buffer),
    }
}

pub fn encode_extended_communities(communities: &[ExtendedCommunity]) -> Bytes {
    let mut bytes = BytesMut::with_capacity(communities.len() * 8);
    for ec in communities {
        encode_extended_community(ec, &mut bytes);
    }
    bytes.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_parse_extended_communities_two_octet_as() {
        let data = Bytes::from(vec![
            0x00, // Transitive Two Octet AS Specific
            0x02, // Route Target
            0x00, 0x01, // AS 1
            0x00, 0x00, 0x00, 0x01, // local admin
        ]);
        let communities = parse_extended_communities(data.clone()).unwrap();
        assert_eq!(
            communities,
            vec![ExtendedCommunity::TransitiveTwoOctetAs(
                TwoOctetAsExtCommunity {
                    subtype: 2,
                    global_admin: 1,
                    local_admin: [0, 0, 0, 1],
                }
            )]
        );
        assert_eq!(encode_extended_communities(&communities), data);
    }

    #[test]
    fn test_parse_extended_communities_ipv4() {
        let data = Bytes::from(vec![
            0x41, // Non-Transitive IPv4 Address Specific
            0x02, // subtype
            0xC0, 0x00, 0x02, 0x01, // 192.0.2.1
            0x00, 0x0A, // local admin
        ]);
        let communities = parse_extended_communities(data.clone()).unwrap();
        assert_eq!(
            communities,
            vec![ExtendedCommunity::NonTransitiveIpv4Addr(
                Ipv4AddrExtCommunity {
                    subtype: 2,
                    global_admin: Ipv4Addr::new(192, 0, 2, 1),
                    local_admin: [0, 10],
                }
            )]
        );
        assert_eq!(encode_extended_communities(&communities), data);
    }

    #[test]
    fn test_parse_extended_communities_four_octet_as_and_opaque() {
        let data = Bytes::from(vec![
            0x02, 0x02, 0x00, 0x06, 0x1A, 0x80, 0x00, 0x0A, // AS 400000
            0x43, 0x0c, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, // non-transitive opaque
        ]);
        let communities = parse_extended_communities(data.clone()).unwrap();
        assert_eq!(
            communities[0],
            ExtendedCommunity::TransitiveFourOctetAs(FourOctetAsExtCommunity {
                subtype: 2,
                global_admin: 400000,
                local_admin: [0, 10],
            })
        );
        assert_eq!(
            communities[1],
            ExtendedCommunity::NonTransitiveOpaque(OpaqueExtCommunity {
                subtype: 0x0c,
                value: [1, 2, 3, 4, 5, 6],
            })
        );
        assert_eq!(encode_extended_communities(&communities), data);
    }

    #[test]
    fn test_parse_extended_communities_raw() {
        let data = Bytes::from(vec![0x80, 0x06, 0, 0, 0, 0, 0, 0]);
        let communities = parse_extended_communities(data.clone()).unwrap();
        assert_eq!(
            communities,
            vec![ExtendedCommunity::Raw([0x80, 0x06, 0, 0, 0, 0, 0, 0])]
        );
        assert_eq!(encode_extended_communities(&communities), data);
    }

    #[test]
    fn test_parse_extended_communities_truncated() {
        let data = Bytes::from(vec![0x00, 0x02, 0x00, 0x01, 0x00]);
        assert_eq!(
            parse_extended_communities(data),
            Err(ParserError::BufferUnderrun {
                needed: 8,
                remaining: 5
            })
        );
    }
}
