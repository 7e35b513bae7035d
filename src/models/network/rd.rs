use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

/// Route Distinguisher as defined in [RFC4364](https://datatracker.ietf.org/doc/html/rfc4364#section-4.2)
///
/// The 8 bytes are kept as-is so that unknown types survive a round trip.
///
/// ## Display
///
/// - type 0: `ASN2:NUMBER4`
/// - type 1: `IPV4:NUMBER2`
/// - type 2: `ASN4:NUMBER2`
/// - others: hex string of all 8 bytes
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteDistinguisher(pub [u8; 8]);

impl RouteDistinguisher {
    pub const fn rd_type(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    /// Type 0: 2-byte administrator ASN, 4-byte assigned number.
    pub fn new_as2(asn: u16, number: u32) -> Self {
        let mut data = [0u8; 8];
        data[2..4].copy_from_slice(&asn.to_be_bytes());
        data[4..8].copy_from_slice(&number.to_be_bytes());
        RouteDistinguisher(data)
    }

    /// Type 1: IPv4 administrator, 2-byte assigned number.
    pub fn new_ipv4(addr: Ipv4Addr, number: u16) -> Self {
        let mut data = [0u8; 8];
        data[1] = 1;
        data[2..6].copy_from_slice(&addr.octets());
        data[6..8].copy_from_slice(&number.to_be_bytes());
        RouteDistinguisher(data)
    }

    /// Type 2: 4-byte administrator ASN, 2-byte assigned number.
    pub fn new_as4(asn: u32, number: u16) -> Self {
        let mut data = [0u8; 8];
        data[1] = 2;
        data[2..6].copy_from_slice(&asn.to_be_bytes());
        data[6..8].copy_from_slice(&number.to_be_bytes());
        RouteDistinguisher(data)
    }
}

impl Display for RouteDistinguisher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let d = &self.0;
        match self.rd_type() {
            0 => write!(
                f,
                "{}:{}",
                u16::from_be_bytes([d[2], d[3]]),
                u32::from_be_bytes([d[4], d[5], d[6], d[7]])
            ),
            1 => write!(
                f,
                "{}:{}",
                Ipv4Addr::new(d[2], d[3], d[4], d[5]),
                u16::from_be_bytes([d[6], d[7]])
            ),
            2 => write!(
                f,
                "{}:{}",
                u32::from_be_bytes([d[2], d[3], d[4], d[5]]),
                u16::from_be_bytes([d[6], d[7]])
            ),
            _ => write!(f, "{}", hex::encode(d)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rd_display() {
        let rd = RouteDistinguisher([0, 1, 1, 2, 3, 4, 0, 10]);
        assert_eq!(rd.rd_type(), 1);
        assert_eq!(rd.to_string(), "1.2.3.4:10");
        assert_eq!(rd, RouteDistinguisher::new_ipv4(Ipv4Addr::new(1, 2, 3, 4), 10));

        let rd = RouteDistinguisher::new_as2(65000, 100);
        assert_eq!(rd.0, [0, 0, 0xfd, 0xe8, 0, 0, 0, 100]);
        assert_eq!(rd.to_string(), "65000:100");

        let rd = RouteDistinguisher::new_as4(400000, 7);
        assert_eq!(rd.to_string(), "400000:7");

        let rd = RouteDistinguisher([0, 9, 1, 2, 3, 4, 5, 6]);
        assert_eq!(rd.to_string(), "0009010203040506");
    }
}
