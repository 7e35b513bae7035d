//! Component parsers and serializers.
//!
//! Each flowspec component is `[type][value]` where the value is either a prefix or a list of
//! `(operand, value)` items terminated by the end-of-list bit. Parsers are invoked after the
//! type byte has been consumed; serializers write the type byte themselves.

use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{BufMut, Bytes, BytesMut};
use ipnet::IpNet;
use log::warn;
use std::sync::Arc;

/// Decodes the value of one component type.
pub trait ComponentParser: Send + Sync {
    /// Parse a component value. `input` is positioned right after the type byte and is
    /// advanced past the value.
    fn parse_component(&self, input: &mut Bytes) -> Result<FlowSpecComponent, ParserError>;
}

/// Encodes one component kind, type byte included.
pub trait ComponentSerializer: Send + Sync {
    fn serialize_component(
        &self,
        component: &FlowSpecComponent,
        output: &mut BytesMut,
    ) -> Result<(), ParserError>;
}

/// Read `(operand, value)` pairs until an operand with the end-of-list bit set.
fn read_operand_list(input: &mut Bytes) -> Result<Vec<(u8, u64)>, ParserError> {
    let mut items = Vec::new();
    loop {
        let operand = input.read_u8()?;
        let value = input.read_uint(value_width(operand))?;
        items.push((operand, value));
        if operand & END_OF_LIST != 0 {
            break;
        }
    }
    Ok(items)
}

fn check_range(kind: ComponentKind, value: u64, max_value: u64) -> Result<(), ParserError> {
    if value > max_value {
        return Err(ParserError::ValueOutOfRange { kind, value });
    }
    Ok(())
}

/// Destination or source prefix of one address family.
#[derive(Debug, Clone, Copy)]
pub struct PrefixHandler {
    kind: ComponentKind,
    afi: Afi,
}

impl PrefixHandler {
    pub const fn destination(afi: Afi) -> Self {
        PrefixHandler {
            kind: ComponentKind::DestinationPrefix,
            afi,
        }
    }

    pub const fn source(afi: Afi) -> Self {
        PrefixHandler {
            kind: ComponentKind::SourcePrefix,
            afi,
        }
    }
}

impl ComponentParser for PrefixHandler {
    fn parse_component(&self, input: &mut Bytes) -> Result<FlowSpecComponent, ParserError> {
        let prefix = input.read_flowspec_prefix(self.afi)?;
        match self.kind {
            ComponentKind::SourcePrefix => Ok(FlowSpecComponent::SourcePrefix(prefix)),
            _ => Ok(FlowSpecComponent::DestinationPrefix(prefix)),
        }
    }
}

impl ComponentSerializer for PrefixHandler {
    fn serialize_component(
        &self,
        component: &FlowSpecComponent,
        output: &mut BytesMut,
    ) -> Result<(), ParserError> {
        let prefix = match component.prefix() {
            Some(prefix) if component.kind() == self.kind => prefix,
            _ => return Err(ParserError::HandlerMismatch(component.kind())),
        };
        let bit_len = prefix.prefix_len();
        let byte_len = (bit_len as usize).div_ceil(8);
        match (self.afi, prefix) {
            (Afi::Ipv4, IpNet::V4(net)) => {
                output.put_u8(component.component_type());
                output.put_u8(bit_len);
                output.extend_from_slice(&net.addr().octets()[..byte_len]);
            }
            (Afi::Ipv6, IpNet::V6(net)) => {
                output.put_u8(component.component_type());
                output.put_u8(bit_len);
                // offset
                output.put_u8(0);
                output.extend_from_slice(&net.addr().octets()[..byte_len]);
            }
            (afi, prefix) => {
                return Err(ParserError::MalformedPrefix(format!(
                    "{} is not an {:?} prefix",
                    prefix, afi
                )))
            }
        }
        Ok(())
    }
}

/// Component made of numeric operator items, e.g. ports or packet length.
///
/// `build` wraps decoded items into the component variant, so enum constructors such as
/// `FlowSpecComponent::Port` can be passed directly.
#[derive(Debug, Clone, Copy)]
pub struct NumericHandler {
    kind: ComponentKind,
    max_value: u64,
    build: fn(Vec<NumericItem>) -> FlowSpecComponent,
}

impl NumericHandler {
    pub const fn new(
        kind: ComponentKind,
        max_value: u64,
        build: fn(Vec<NumericItem>) -> FlowSpecComponent,
    ) -> Self {
        NumericHandler {
            kind,
            max_value,
            build,
        }
    }
}

impl ComponentParser for NumericHandler {
    fn parse_component(&self, input: &mut Bytes) -> Result<FlowSpecComponent, ParserError> {
        let items = read_operand_list(input)?
            .into_iter()
            .map(|(operand, value)| {
                check_range(self.kind, value, self.max_value)?;
                Ok(NumericItem::new(NumericOperand::from_byte(operand), value))
            })
            .collect::<Result<Vec<_>, ParserError>>()?;
        Ok((self.build)(items))
    }
}

impl ComponentSerializer for NumericHandler {
    fn serialize_component(
        &self,
        component: &FlowSpecComponent,
        output: &mut BytesMut,
    ) -> Result<(), ParserError> {
        let items = match component.numeric_items() {
            Some(items) if component.kind() == self.kind => items,
            _ => return Err(ParserError::HandlerMismatch(component.kind())),
        };
        if items.is_empty() {
            return Err(ParserError::EmptyOperandList(self.kind));
        }
        output.put_u8(component.component_type());
        for (i, item) in items.iter().enumerate() {
            check_range(self.kind, item.value, self.max_value)?;
            let mut operand = item.operand;
            operand.end_of_list = i + 1 == items.len();
            let width = minimal_width(item.value);
            output.put_u8(operand.to_byte(width));
            output.put_uint(item.value, width);
        }
        Ok(())
    }
}

/// TCP flags (type 9), bitmask operator items.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpFlagsHandler;

impl TcpFlagsHandler {
    const MAX_VALUE: u64 = 0xFFFF;
}

impl ComponentParser for TcpFlagsHandler {
    fn parse_component(&self, input: &mut Bytes) -> Result<FlowSpecComponent, ParserError> {
        let items = read_operand_list(input)?
            .into_iter()
            .map(|(operand, value)| {
                check_range(ComponentKind::TcpFlags, value, Self::MAX_VALUE)?;
                Ok(BitmaskItem::new(BitmaskOperand::from_byte(operand), value))
            })
            .collect::<Result<Vec<_>, ParserError>>()?;
        Ok(FlowSpecComponent::TcpFlags(items))
    }
}

impl ComponentSerializer for TcpFlagsHandler {
    fn serialize_component(
        &self,
        component: &FlowSpecComponent,
        output: &mut BytesMut,
    ) -> Result<(), ParserError> {
        let items = component
            .bitmask_items()
            .ok_or(ParserError::HandlerMismatch(component.kind()))?;
        if items.is_empty() {
            return Err(ParserError::EmptyOperandList(ComponentKind::TcpFlags));
        }
        output.put_u8(component.component_type());
        for (i, item) in items.iter().enumerate() {
            check_range(ComponentKind::TcpFlags, item.value, Self::MAX_VALUE)?;
            let mut operand = item.operand;
            operand.end_of_list = i + 1 == items.len();
            let width = minimal_width(item.value);
            output.put_u8(operand.to_byte(width));
            output.put_uint(item.value, width);
        }
        Ok(())
    }
}

/// Fragment (type 12). IPv6 has no don't-fragment bit, so it is cleared in both directions.
#[derive(Debug, Clone, Copy)]
pub struct FragmentHandler {
    afi: Afi,
}

impl FragmentHandler {
    pub const fn new(afi: Afi) -> Self {
        FragmentHandler { afi }
    }

    fn filter_flags(&self, mut flags: FragmentFlags) -> FragmentFlags {
        if self.afi == Afi::Ipv6 && flags.contains(FragmentFlags::DONT_FRAGMENT) {
            warn!("ignoring don't-fragment bit in IPv6 flowspec fragment component");
            flags.remove(FragmentFlags::DONT_FRAGMENT);
        }
        flags
    }
}

impl ComponentParser for FragmentHandler {
    fn parse_component(&self, input: &mut Bytes) -> Result<FlowSpecComponent, ParserError> {
        let items = read_operand_list(input)?
            .into_iter()
            .map(|(operand, value)| {
                check_range(ComponentKind::Fragment, value, 0xFF)?;
                let flags = FragmentFlags::from_bits_truncate(value as u8);
                Ok(FragmentItem::new(
                    BitmaskOperand::from_byte(operand),
                    self.filter_flags(flags),
                ))
            })
            .collect::<Result<Vec<_>, ParserError>>()?;
        Ok(FlowSpecComponent::Fragment(items))
    }
}

impl ComponentSerializer for FragmentHandler {
    fn serialize_component(
        &self,
        component: &FlowSpecComponent,
        output: &mut BytesMut,
    ) -> Result<(), ParserError> {
        let items = component
            .fragment_items()
            .ok_or(ParserError::HandlerMismatch(component.kind()))?;
        if items.is_empty() {
            return Err(ParserError::EmptyOperandList(ComponentKind::Fragment));
        }
        output.put_u8(component.component_type());
        for (i, item) in items.iter().enumerate() {
            let mut operand = item.operand;
            operand.end_of_list = i + 1 == items.len();
            output.put_u8(operand.to_byte(1));
            output.put_u8(self.filter_flags(item.flags).bits());
        }
        Ok(())
    }
}

/// A handler of the standard set, registered as both parser and serializer.
pub(crate) struct StandardHandler {
    pub(crate) type_code: u8,
    pub(crate) kind: ComponentKind,
    pub(crate) parser: Arc<dyn ComponentParser>,
    pub(crate) serializer: Arc<dyn ComponentSerializer>,
}

impl StandardHandler {
    fn new<H>(kind: ComponentKind, handler: H) -> Option<Self>
    where
        H: ComponentParser + ComponentSerializer + 'static,
    {
        let handler = Arc::new(handler);
        Some(StandardHandler {
            type_code: kind.type_code()?,
            kind,
            parser: handler.clone(),
            serializer: handler,
        })
    }
}

fn numeric(
    kind: ComponentKind,
    max_value: u64,
    build: fn(Vec<NumericItem>) -> FlowSpecComponent,
) -> Option<StandardHandler> {
    StandardHandler::new(kind, NumericHandler::new(kind, max_value, build))
}

/// Handlers for component types 1 through 12 (IPv4) or 1 through 13 (IPv6).
pub(crate) fn standard_handlers(afi: Afi) -> Vec<StandardHandler> {
    use ComponentKind as K;
    use FlowSpecComponent as C;

    let protocol = match afi {
        Afi::Ipv4 => numeric(K::IpProtocol, 0xFF, C::IpProtocol),
        Afi::Ipv6 => numeric(K::NextHeader, 0xFF, C::NextHeader),
    };
    let flow_label = match afi {
        Afi::Ipv4 => None,
        Afi::Ipv6 => numeric(K::FlowLabel, 0xFFFF_FFFF, C::FlowLabel),
    };

    [
        StandardHandler::new(K::DestinationPrefix, PrefixHandler::destination(afi)),
        StandardHandler::new(K::SourcePrefix, PrefixHandler::source(afi)),
        protocol,
        numeric(K::Port, 0xFFFF, C::Port),
        numeric(K::DestinationPort, 0xFFFF, C::DestinationPort),
        numeric(K::SourcePort, 0xFFFF, C::SourcePort),
        numeric(K::IcmpType, 0xFF, C::IcmpType),
        numeric(K::IcmpCode, 0xFF, C::IcmpCode),
        StandardHandler::new(K::TcpFlags, TcpFlagsHandler),
        numeric(K::PacketLength, 0xFFFF, C::PacketLength),
        numeric(K::Dscp, 0xFF, C::Dscp),
        StandardHandler::new(K::Fragment, FragmentHandler::new(afi)),
        flow_label,
    ]
    .into_iter()
    .flatten()
    .collect()
}
