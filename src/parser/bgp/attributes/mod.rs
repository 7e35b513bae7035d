mod attr_16_extended_communities;

pub use attr_16_extended_communities::{
    encode_extended_communities, encode_extended_community, parse_extended_communities,
    parse_extended_community,
};
