/*!
BGP Flow Specification codec.

This crate decodes and encodes the Flow Specification NLRI defined in
[RFC 8955](https://datatracker.ietf.org/doc/html/rfc8955) (IPv4) and
[RFC 8956](https://datatracker.ietf.org/doc/html/rfc8956) (IPv6), including the VPN variant
(SAFI 134) and add-path framing, as well as the traffic filtering actions carried in extended
communities.

# Decoding an NLRI

```
use bgpkit_flowspec::models::*;
use bgpkit_flowspec::{FlowSpecCodec, FlowSpecConfig};
use bytes::Bytes;

let codec = FlowSpecCodec::with_config(FlowSpecConfig::default());
let nlri = codec
    .parse_nlri(
        Afi::Ipv4,
        Safi::FlowSpec,
        Bytes::from_static(&[0x08, 0x01, 0x18, 0xc0, 0x00, 0x02, 0x04, 0x81, 0x50]),
    )
    .unwrap()
    .unwrap();

assert_eq!(
    nlri.to_string(),
    "all packets to 192.0.2.0/24 where port equals to 80 "
);
```

# Encoding an NLRI

```
use bgpkit_flowspec::models::*;
use bgpkit_flowspec::FlowSpecCodec;

let codec = FlowSpecCodec::default();
let nlri = FlowSpecNlri::new(vec![FlowSpecComponent::Port(vec![NumericItem::equal_to(80)])]);
let bytes = codec.encode_nlri(Afi::Ipv4, Safi::FlowSpec, &nlri).unwrap();
assert_eq!(bytes.as_ref(), &[0x03, 0x04, 0x81, 0x50]);
```

# Component handlers

Components are decoded and encoded through a [FlowSpecRegistry] holding one handler table per
address family and SAFI. The standard tables cover component types 1 to 13; additional
[ComponentParser] and [ComponentSerializer] implementations can be registered at runtime and
removed again with the returned [HandlerRegistration].

# Actions

Flow specification actions (traffic-rate, traffic-action, redirect and traffic-marking) are
decoded from extended community bytes with
[parse_flowspec_extended_communities](parser::parse_flowspec_extended_communities). Other
extended communities are returned as generic [ExtendedCommunity](models::ExtendedCommunity)
values.
*/

#![doc(
    html_logo_url = "https://raw.githubusercontent.com/bgpkit/assets/main/logos/icon-transparent.png",
    html_favicon_url = "https://raw.githubusercontent.com/bgpkit/assets/main/logos/favicon.ico"
)]

mod config;
pub mod error;
pub mod models;
#[cfg(feature = "parser")]
pub mod parser;

pub use config::{FlowSpecConfig, UnknownComponentPolicy};
pub use error::ParserError;

#[cfg(feature = "parser")]
pub use parser::{
    ComponentParser, ComponentRegistry, ComponentSerializer, FlowSpecCodec, FlowSpecRegistry,
    HandlerRegistration,
};
