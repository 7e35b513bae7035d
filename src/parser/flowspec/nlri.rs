use super::registry::{ComponentRegistry, FlowSpecRegistry};
use crate::models::*;
use crate::parser::ReadUtils;
use crate::{FlowSpecConfig, ParserError, UnknownComponentPolicy};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::{debug, warn};
use std::sync::Arc;

/// Largest NLRI body expressible by the 12-bit extended length.
pub const MAX_NLRI_LENGTH: usize = 4095;
/// Bodies shorter than this use a single length byte.
const EXTENDED_LENGTH_THRESHOLD: usize = 240;
const EXTENDED_LENGTH_FLAG: u16 = 0xF000;
const EXTENDED_LENGTH_MASK: u16 = 0x0FFF;

/// Flow specification NLRI codec.
///
/// NLRI layout, RFC 8955 Section 4:
///
/// ```text
/// +-------------------------------+
/// | path identifier (4, add-path) |
/// +-------------------------------+
/// | length (1 or 2 octets)        |
/// +-------------------------------+
/// | route distinguisher (8, VPN)  |
/// +-------------------------------+
/// | components (variable)         |
/// +-------------------------------+
/// ```
///
/// The length covers the route distinguisher and the components. Lengths below 240 take one
/// octet; longer ones are written as `0xF000 | length` in two octets.
///
/// The codec is immutable and cheap to clone; clones share the same [FlowSpecRegistry].
#[derive(Clone)]
pub struct FlowSpecCodec {
    registry: Arc<FlowSpecRegistry>,
    config: FlowSpecConfig,
}

impl Default for FlowSpecCodec {
    fn default() -> Self {
        Self::with_config(FlowSpecConfig::default())
    }
}

impl FlowSpecCodec {
    pub fn new(registry: Arc<FlowSpecRegistry>, config: FlowSpecConfig) -> Self {
        FlowSpecCodec { registry, config }
    }

    /// Codec over a fresh registry holding the standard handlers.
    pub fn with_config(config: FlowSpecConfig) -> Self {
        Self::new(Arc::new(FlowSpecRegistry::with_standard_handlers()), config)
    }

    pub fn registry(&self) -> &Arc<FlowSpecRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &FlowSpecConfig {
        &self.config
    }

    /// Parse one NLRI occupying all of `input`.
    ///
    /// Whether the length field is one or two octets is decided by the size of the input: more
    /// than 240 bytes means two. A declared length that disagrees with the input is logged and
    /// otherwise ignored; components are read until the input is exhausted.
    ///
    /// Returns `Ok(None)` for empty input.
    pub fn parse_nlri(
        &self,
        afi: Afi,
        safi: Safi,
        mut input: Bytes,
    ) -> Result<Option<FlowSpecNlri>, ParserError> {
        if !input.has_remaining() {
            return Ok(None);
        }

        let path_id = if self.config.add_path {
            Some(input.read_u32()?)
        } else {
            None
        };

        let total = input.remaining();
        let declared = if total > EXTENDED_LENGTH_THRESHOLD {
            debug!("flowspec NLRI of {} bytes, reading 2-byte length", total);
            (input.read_u16()? & EXTENDED_LENGTH_MASK) as usize
        } else {
            input.read_u8()? as usize
        };
        if declared != input.remaining() {
            warn!(
                "flowspec NLRI declares {} bytes but {} bytes follow the length",
                declared,
                input.remaining()
            );
        }

        let route_distinguisher = if safi.is_vpn() {
            Some(input.read_route_distinguisher()?)
        } else {
            None
        };
        let components = self.parse_components(self.registry.table(afi, safi), input)?;

        Ok(Some(FlowSpecNlri {
            path_id,
            route_distinguisher,
            components,
        }))
    }

    /// Parse consecutive NLRIs, e.g. the NLRI field of an MP_REACH_NLRI attribute.
    ///
    /// Unlike [FlowSpecCodec::parse_nlri], the length field is read as RFC 8955 specifies: a
    /// first octet of `0xF0` or above starts a 2-octet length. Each declared length must be
    /// non-zero and fit in the remaining input.
    pub fn parse_nlri_list(
        &self,
        afi: Afi,
        safi: Safi,
        mut input: Bytes,
    ) -> Result<Vec<FlowSpecNlri>, ParserError> {
        let table = self.registry.table(afi, safi);
        let mut nlris = vec![];
        while input.has_remaining() {
            let path_id = if self.config.add_path {
                Some(input.read_u32()?)
            } else {
                None
            };

            let first = input.read_u8()?;
            let length = if first >= 0xF0 {
                let second = input.read_u8()?;
                (((u16::from(first) << 8) | u16::from(second)) & EXTENDED_LENGTH_MASK) as usize
            } else {
                first as usize
            };
            if length == 0 || length > input.remaining() {
                return Err(ParserError::MalformedNlriLength {
                    length,
                    remaining: input.remaining(),
                });
            }

            let mut body = input.split_to(length);
            let route_distinguisher = if safi.is_vpn() {
                Some(body.read_route_distinguisher()?)
            } else {
                None
            };
            let components = self.parse_components(table, body)?;
            nlris.push(FlowSpecNlri {
                path_id,
                route_distinguisher,
                components,
            });
        }
        Ok(nlris)
    }

    fn parse_components(
        &self,
        table: &ComponentRegistry,
        mut input: Bytes,
    ) -> Result<Vec<FlowSpecComponent>, ParserError> {
        let mut components = vec![];
        let mut previous: Option<u8> = None;
        while input.has_remaining() {
            let component_type = input.read_u8()?;
            self.check_order(&mut previous, component_type)?;

            let component = match table.parser(component_type) {
                Some(parser) => parser.parse_component(&mut input)?,
                None => match self.config.unknown_components {
                    UnknownComponentPolicy::Reject => {
                        return Err(ParserError::UnknownComponentType(component_type))
                    }
                    UnknownComponentPolicy::Opaque => {
                        // without a parser the value length is unknown, so the rest goes with it
                        let remaining = input.remaining();
                        warn!(
                            "unknown flowspec component type {} for {:?}/{:?}, keeping {} bytes opaque",
                            component_type,
                            table.afi(),
                            table.safi(),
                            remaining
                        );
                        FlowSpecComponent::Unknown {
                            component_type,
                            data: input.read_n_bytes(remaining)?,
                        }
                    }
                },
            };
            components.push(component);
        }
        Ok(components)
    }

    fn check_order(&self, previous: &mut Option<u8>, current: u8) -> Result<(), ParserError> {
        if !self.config.validate_component_order {
            return Ok(());
        }
        if let Some(previous) = *previous {
            if current <= previous {
                return Err(ParserError::InvalidComponentOrder {
                    previous,
                    found: current,
                });
            }
        }
        *previous = Some(current);
        Ok(())
    }

    /// Encode one NLRI, length prefix included.
    ///
    /// Components are written in the order given. For the VPN SAFI the NLRI must carry a route
    /// distinguisher; with add-path enabled a missing path identifier is written as 0.
    pub fn encode_nlri(
        &self,
        afi: Afi,
        safi: Safi,
        nlri: &FlowSpecNlri,
    ) -> Result<Bytes, ParserError> {
        let table = self.registry.table(afi, safi);
        let mut body = BytesMut::new();

        if safi.is_vpn() {
            let rd = nlri
                .route_distinguisher
                .ok_or(ParserError::MissingRouteDistinguisher)?;
            body.put_slice(&rd.0);
        }

        let mut previous: Option<u8> = None;
        for component in &nlri.components {
            self.check_order(&mut previous, component.component_type())?;
            match component {
                FlowSpecComponent::Unknown {
                    component_type,
                    data,
                } if self.config.unknown_components == UnknownComponentPolicy::Opaque
                    && table.serializer(ComponentKind::Unknown).is_none() =>
                {
                    body.put_u8(*component_type);
                    body.put_slice(data);
                }
                component => table.serialize_component(component, &mut body)?,
            }
        }

        if body.len() > MAX_NLRI_LENGTH {
            return Err(ParserError::NlriTooLong(body.len()));
        }

        let mut bytes = BytesMut::with_capacity(body.len() + 6);
        if self.config.add_path {
            bytes.put_u32(nlri.path_id.unwrap_or_default());
        }
        if body.len() < EXTENDED_LENGTH_THRESHOLD {
            bytes.put_u8(body.len() as u8);
        } else {
            bytes.put_u16(EXTENDED_LENGTH_FLAG | body.len() as u16);
        }
        bytes.extend_from_slice(&body);
        Ok(bytes.freeze())
    }
}
