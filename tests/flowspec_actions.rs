use bgpkit_flowspec::models::*;
use bgpkit_flowspec::parser::{
    encode_flowspec_extended_communities, parse_extended_communities,
    parse_flowspec_extended_communities,
};
use bgpkit_flowspec::ParserError;
use bytes::Bytes;
use std::net::Ipv4Addr;

#[test]
fn test_encode_traffic_rate() {
    let action = FlowSpecAction::TrafficRate {
        asn: 65535,
        bandwidth: 1000.0,
    };
    let bytes = encode_flowspec_extended_communities(&[action.into()]);

    let mut expected = vec![0x80, 0x06, 0xff, 0xff];
    expected.extend_from_slice(&1000f32.to_be_bytes());
    assert_eq!(bytes.to_vec(), expected);
    assert_eq!(bytes.as_ref(), &[0x80, 0x06, 0xff, 0xff, 0x44, 0x7a, 0x00, 0x00]);
}

#[test]
fn test_flowspec_route_communities() {
    let _ = env_logger::builder().is_test(true).try_init();

    let input = Bytes::from_static(&[
        0x80, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // discard
        0x80, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, // sample
        0x81, 0x08, 0xc0, 0x00, 0x02, 0x01, 0x00, 0x64, // redirect to 192.0.2.1:100
        0x00, 0x02, 0xfd, 0xe8, 0x00, 0x00, 0x00, 0x01, // route target 65000:1
    ]);
    let communities = parse_flowspec_extended_communities(input.clone()).unwrap();
    assert_eq!(
        communities,
        vec![
            FlowSpecExtendedCommunity::Action(FlowSpecAction::TrafficRate {
                asn: 0,
                bandwidth: 0.0
            }),
            FlowSpecExtendedCommunity::Action(FlowSpecAction::TrafficAction {
                sample: true,
                terminal: false
            }),
            FlowSpecExtendedCommunity::Action(FlowSpecAction::RedirectIpv4 {
                global_admin: Ipv4Addr::new(192, 0, 2, 1),
                local_admin: 100
            }),
            FlowSpecExtendedCommunity::Generic(ExtendedCommunity::TransitiveTwoOctetAs(
                TwoOctetAsExtCommunity {
                    subtype: 2,
                    global_admin: 65000,
                    local_admin: [0, 0, 0, 1]
                }
            )),
        ]
    );
    assert_eq!(
        communities.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        vec![
            "traffic-rate:0:0",
            "traffic-action:sample=true:terminal=false",
            "redirect:192.0.2.1:100",
            "ecas2:0:2:65000:00000001",
        ]
    );
    assert_eq!(encode_flowspec_extended_communities(&communities), input);

    // the generic parser keeps flowspec actions as raw communities
    let generic = parse_extended_communities(input).unwrap();
    assert_eq!(
        generic[0],
        ExtendedCommunity::Raw([0x80, 0x06, 0, 0, 0, 0, 0, 0])
    );
}

#[test]
fn test_truncated_communities() {
    assert_eq!(
        parse_flowspec_extended_communities(Bytes::from_static(&[
            0x80, 0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2e, 0x80, 0x09, 0x00
        ])),
        Err(ParserError::BufferUnderrun {
            needed: 8,
            remaining: 3
        })
    );
}

#[test]
#[cfg(feature = "serde")]
fn test_serde_actions() {
    let action = FlowSpecExtendedCommunity::Action(FlowSpecAction::RedirectAs4 {
        asn: 400000,
        local_admin: 7,
    });
    let json = serde_json::to_string(&action).unwrap();
    assert_eq!(
        json,
        r#"{"Action":{"RedirectAs4":{"asn":400000,"local_admin":7}}}"#
    );
    let back: FlowSpecExtendedCommunity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, action);
}
