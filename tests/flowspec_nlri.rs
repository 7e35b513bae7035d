use bgpkit_flowspec::models::*;
use bgpkit_flowspec::{
    ComponentParser, ComponentSerializer, FlowSpecCodec, FlowSpecConfig, FlowSpecRegistry,
    ParserError, UnknownComponentPolicy,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use ipnet::IpNet;
use std::str::FromStr;
use std::sync::Arc;

/// A made-up component type 20 carrying a VLAN id in two bytes.
struct VlanHandler;

const VLAN_TYPE: u8 = 20;

impl ComponentParser for VlanHandler {
    fn parse_component(&self, input: &mut Bytes) -> Result<FlowSpecComponent, ParserError> {
        if input.remaining() < 2 {
            return Err(ParserError::BufferUnderrun {
                needed: 2,
                remaining: input.remaining(),
            });
        }
        Ok(FlowSpecComponent::Unknown {
            component_type: VLAN_TYPE,
            data: input.copy_to_bytes(2).to_vec(),
        })
    }
}

impl ComponentSerializer for VlanHandler {
    fn serialize_component(
        &self,
        component: &FlowSpecComponent,
        output: &mut BytesMut,
    ) -> Result<(), ParserError> {
        match component {
            FlowSpecComponent::Unknown {
                component_type: VLAN_TYPE,
                data,
            } if data.len() == 2 => {
                output.put_u8(VLAN_TYPE);
                output.put_slice(data);
                Ok(())
            }
            other => Err(ParserError::HandlerMismatch(other.kind())),
        }
    }
}

#[test]
fn test_decode_and_render() {
    let _ = env_logger::builder().is_test(true).try_init();

    let codec = FlowSpecCodec::default();
    let input = Bytes::from_static(&[
        0x0e, // length
        0x01, 0x18, 0xc0, 0x00, 0x02, // to 192.0.2.0/24
        0x04, 0x12, 0x00, 0x50, 0x81, 0x35, // port >80 or 53
        0x09, 0x81, 0x02, // TCP flags match SYN
    ]);
    let nlri = codec
        .parse_nlri(Afi::Ipv4, Safi::FlowSpec, input)
        .unwrap()
        .unwrap();
    assert_eq!(
        nlri.to_string(),
        "all packets to 192.0.2.0/24 where port is greater than 80 or equals to 53 \
         where TCP flags does match SYN "
    );

    // 80 fits in one byte, so the re-encoded NLRI is shorter than the input
    let encoded = codec.encode_nlri(Afi::Ipv4, Safi::FlowSpec, &nlri).unwrap();
    assert_eq!(
        encoded.as_ref(),
        &[0x0d, 0x01, 0x18, 0xc0, 0x00, 0x02, 0x04, 0x02, 0x50, 0x81, 0x35, 0x09, 0x81, 0x02]
    );
    assert_eq!(
        codec
            .parse_nlri(Afi::Ipv4, Safi::FlowSpec, encoded)
            .unwrap()
            .unwrap(),
        nlri
    );
}

#[test]
fn test_declared_length_mismatch_is_tolerated() {
    let _ = env_logger::builder().is_test(true).try_init();

    let codec = FlowSpecCodec::default();
    // declares 9 bytes, carries 3
    let nlri = codec
        .parse_nlri(
            Afi::Ipv4,
            Safi::FlowSpec,
            Bytes::from_static(&[0x09, 0x0b, 0x81, 0x2e]),
        )
        .unwrap()
        .unwrap();
    assert_eq!(
        nlri.components,
        vec![FlowSpecComponent::Dscp(terminate_list(vec![
            NumericItem::equal_to(46)
        ]))]
    );
}

#[test]
fn test_custom_component_handler() {
    let registry = Arc::new(FlowSpecRegistry::with_standard_handlers());
    let codec = FlowSpecCodec::new(
        registry.clone(),
        FlowSpecConfig::default().with_unknown_components(UnknownComponentPolicy::Reject),
    );
    // to 10.0.0.0/8, VLAN 100, DSCP 0
    let input = Bytes::from_static(&[
        0x09, 0x01, 0x08, 0x0a, 0x14, 0x00, 0x64, 0x0b, 0x81, 0x00,
    ]);

    assert_eq!(
        codec.parse_nlri(Afi::Ipv4, Safi::FlowSpec, input.clone()),
        Err(ParserError::UnknownComponentType(VLAN_TYPE))
    );

    let handler = Arc::new(VlanHandler);
    let parser = registry
        .register_parser(Afi::Ipv4, Safi::FlowSpec, VLAN_TYPE, handler.clone())
        .unwrap();
    let serializer = registry
        .register_serializer(Afi::Ipv4, Safi::FlowSpec, ComponentKind::Unknown, handler)
        .unwrap();

    // the handler knows its value length, so the DSCP component after it is decoded too
    let nlri = codec
        .parse_nlri(Afi::Ipv4, Safi::FlowSpec, input.clone())
        .unwrap()
        .unwrap();
    assert_eq!(
        nlri.components,
        vec![
            FlowSpecComponent::DestinationPrefix(IpNet::from_str("10.0.0.0/8").unwrap()),
            FlowSpecComponent::Unknown {
                component_type: VLAN_TYPE,
                data: vec![0x00, 0x64],
            },
            FlowSpecComponent::Dscp(terminate_list(vec![NumericItem::equal_to(0)])),
        ]
    );
    assert_eq!(
        codec.encode_nlri(Afi::Ipv4, Safi::FlowSpec, &nlri).unwrap(),
        input
    );

    // other tables are unaffected
    let mut vpn_input = vec![0x11, 0, 0, 0, 1, 0, 0, 0, 1];
    vpn_input.extend_from_slice(&input[1..]);
    assert_eq!(
        codec.parse_nlri(Afi::Ipv4, Safi::FlowSpecVpn, Bytes::from(vpn_input)),
        Err(ParserError::UnknownComponentType(VLAN_TYPE))
    );

    assert!(registry.deregister(parser));
    assert!(registry.deregister(serializer));
    assert_eq!(
        codec.parse_nlri(Afi::Ipv4, Safi::FlowSpec, input),
        Err(ParserError::UnknownComponentType(VLAN_TYPE))
    );
}

#[test]
fn test_shared_codec_across_threads() {
    let codec = FlowSpecCodec::default();
    let nlri = FlowSpecNlri::new(vec![
        FlowSpecComponent::DestinationPrefix(IpNet::from_str("2001:db8::/32").unwrap()),
        FlowSpecComponent::NextHeader(vec![NumericItem::equal_to(17)]),
        FlowSpecComponent::DestinationPort(vec![NumericItem::equal_to(53)]),
    ]);
    let encoded = codec.encode_nlri(Afi::Ipv6, Safi::FlowSpec, &nlri).unwrap();

    let handles = (0..4)
        .map(|_| {
            let codec = codec.clone();
            let encoded = encoded.clone();
            std::thread::spawn(move || {
                codec
                    .parse_nlri(Afi::Ipv6, Safi::FlowSpec, encoded)
                    .unwrap()
                    .unwrap()
                    .to_string()
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        assert_eq!(
            handle.join().unwrap(),
            "all packets to 2001:db8::/32 where next header equals to 17 \
             where destination port equals to 53 "
        );
    }
}

#[test]
fn test_parse_nlri_list_with_vpn_and_add_path() {
    let codec = FlowSpecCodec::with_config(FlowSpecConfig::default().with_add_path(true));
    let rd = RouteDistinguisher::new_as2(65000, 1);
    let first = FlowSpecNlri::new_vpn(
        rd,
        vec![FlowSpecComponent::DestinationPrefix(
            IpNet::from_str("198.51.100.0/24").unwrap(),
        )],
    )
    .with_path_id(1);
    let second = FlowSpecNlri::new_vpn(
        rd,
        vec![FlowSpecComponent::IpProtocol(vec![NumericItem::equal_to(17)])],
    )
    .with_path_id(2);

    let mut input = BytesMut::new();
    for nlri in [&first, &second] {
        let encoded = codec
            .encode_nlri(Afi::Ipv4, Safi::FlowSpecVpn, nlri)
            .unwrap();
        input.extend_from_slice(&encoded);
    }
    let parsed = codec
        .parse_nlri_list(Afi::Ipv4, Safi::FlowSpecVpn, input.freeze())
        .unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0], first);
    assert_eq!(parsed[1].path_id, Some(2));
    assert_eq!(
        parsed[1].route_distinguisher.unwrap().to_string(),
        "65000:1"
    );
    assert_eq!(
        parsed[1].to_string(),
        "[l3vpn with route-distinguisher 65000:1] all packets where IP protocol equals to 17 "
    );
}

#[test]
#[cfg(feature = "serde")]
fn test_serde_nlri() {
    let nlri = FlowSpecNlri::new(vec![
        FlowSpecComponent::DestinationPrefix(IpNet::from_str("192.0.2.0/24").unwrap()),
        FlowSpecComponent::Fragment(terminate_list(vec![FragmentItem::partial_match(
            FragmentFlags::IS_FRAGMENT,
        )])),
    ]);
    let json = serde_json::to_string(&nlri).unwrap();
    let back: FlowSpecNlri = serde_json::from_str(&json).unwrap();
    assert_eq!(back, nlri);
}
