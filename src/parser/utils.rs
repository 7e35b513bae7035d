/*!
Provides IO utility functions for read bytes of different length and converting to corresponding structs.
*/
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::ParserError;
use crate::models::{Afi, RouteDistinguisher};
use bytes::{Buf, Bytes};
use ipnet::IpNet;

impl ReadUtils for Bytes {}

/// Bounds-checked reads over a [Buf]. Every read fails with [ParserError::BufferUnderrun]
/// instead of panicking when the buffer is short.
pub trait ReadUtils: Buf {
    #[inline]
    fn has_n_remaining(&self, n: usize) -> Result<(), ParserError> {
        if self.remaining() < n {
            Err(ParserError::BufferUnderrun {
                needed: n,
                remaining: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, ParserError> {
        self.has_n_remaining(1)?;
        Ok(self.get_u8())
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16, ParserError> {
        self.has_n_remaining(2)?;
        Ok(self.get_u16())
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32, ParserError> {
        self.has_n_remaining(4)?;
        Ok(self.get_u32())
    }

    #[inline]
    fn read_u64(&mut self) -> Result<u64, ParserError> {
        self.has_n_remaining(8)?;
        Ok(self.get_u64())
    }

    /// Read a big-endian unsigned integer of `width` octets, at most 8.
    #[inline]
    fn read_uint(&mut self, width: usize) -> Result<u64, ParserError> {
        self.has_n_remaining(width)?;
        Ok(self.get_uint(width))
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, ParserError> {
        let addr = self.read_u32()?;
        Ok(Ipv4Addr::from(addr))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, ParserError> {
        self.has_n_remaining(16)?;
        let buf = self.get_u128();
        Ok(Ipv6Addr::from(buf))
    }

    fn read_route_distinguisher(&mut self) -> Result<RouteDistinguisher, ParserError> {
        let mut data = [0u8; 8];
        self.has_n_remaining(8)?;
        self.copy_to_slice(&mut data);
        Ok(RouteDistinguisher(data))
    }

    fn read_n_bytes(&mut self, n_bytes: usize) -> Result<Vec<u8>, ParserError> {
        self.has_n_remaining(n_bytes)?;
        Ok(self.copy_to_bytes(n_bytes).into())
    }

    /// Read a flowspec prefix: `[length][prefix bytes]` for IPv4 and
    /// `[length][offset][prefix bytes]` for IPv6. Only offset 0 is supported.
    fn read_flowspec_prefix(&mut self, afi: Afi) -> Result<IpNet, ParserError> {
        // Length in bits
        let bit_len = self.read_u8()?;
        if afi == Afi::Ipv6 {
            let offset = self.read_u8()?;
            if offset != 0 {
                return Err(ParserError::MalformedPrefix(format!(
                    "unsupported IPv6 prefix offset {}",
                    offset
                )));
            }
        }

        let max_len = match afi {
            Afi::Ipv4 => 32,
            Afi::Ipv6 => 128,
        };
        if bit_len > max_len {
            return Err(ParserError::MalformedPrefix(format!(
                "prefix length {} exceeds {} bits",
                bit_len, max_len
            )));
        }

        // Convert to bytes
        let byte_len = (bit_len as usize).div_ceil(8);
        if self.remaining() < byte_len {
            return Err(ParserError::MalformedPrefix(format!(
                "prefix length {} needs {} bytes, {} remaining",
                bit_len,
                byte_len,
                self.remaining()
            )));
        }
        let mut buff = [0u8; 16];
        self.copy_to_slice(&mut buff[..byte_len]);
        let addr = match afi {
            Afi::Ipv4 => IpAddr::V4(Ipv4Addr::new(buff[0], buff[1], buff[2], buff[3])),
            Afi::Ipv6 => IpAddr::V6(Ipv6Addr::from(buff)),
        };
        Ok(IpNet::new(addr, bit_len)?)
    }
}
