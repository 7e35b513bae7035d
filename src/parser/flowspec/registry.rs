//! Per address-family tables of component handlers.

use super::handlers::{standard_handlers, ComponentParser, ComponentSerializer};
use crate::models::*;
use crate::ParserError;
use bytes::{Bytes, BytesMut};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handles of the standard set. Registration handles start at 1, so these can never be
/// deregistered.
const STANDARD_HANDLER_ID: u64 = 0;

struct Registered<T: ?Sized> {
    id: u64,
    handler: Arc<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum HandlerSlot {
    Parser(u8),
    Serializer(ComponentKind),
}

/// Receipt of a runtime handler registration, used to remove it again.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "a handler can only be deregistered with its registration"]
pub struct HandlerRegistration {
    afi: Afi,
    safi: Safi,
    slot: HandlerSlot,
    id: u64,
}

impl HandlerRegistration {
    pub fn afi(&self) -> Afi {
        self.afi
    }

    pub fn safi(&self) -> Safi {
        self.safi
    }
}

/// Component handlers of one AFI/SAFI pair, keyed by type byte for parsing and by
/// [ComponentKind] for serializing.
pub struct ComponentRegistry {
    afi: Afi,
    safi: Safi,
    parsers: RwLock<HashMap<u8, Registered<dyn ComponentParser>>>,
    serializers: RwLock<HashMap<ComponentKind, Registered<dyn ComponentSerializer>>>,
    next_id: AtomicU64,
}

impl ComponentRegistry {
    /// An empty table.
    pub fn new(afi: Afi, safi: Safi) -> Self {
        ComponentRegistry {
            afi,
            safi,
            parsers: RwLock::new(HashMap::new()),
            serializers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(STANDARD_HANDLER_ID + 1),
        }
    }

    /// A table holding the standard handlers for `afi`, component types 1 to 12 for IPv4 and
    /// 1 to 13 for IPv6.
    pub fn with_standard_handlers(afi: Afi, safi: Safi) -> Self {
        let registry = Self::new(afi, safi);
        {
            let mut parsers = registry.parsers.write();
            let mut serializers = registry.serializers.write();
            for handler in standard_handlers(afi) {
                parsers.insert(
                    handler.type_code,
                    Registered {
                        id: STANDARD_HANDLER_ID,
                        handler: handler.parser,
                    },
                );
                serializers.insert(
                    handler.kind,
                    Registered {
                        id: STANDARD_HANDLER_ID,
                        handler: handler.serializer,
                    },
                );
            }
        }
        registry
    }

    pub fn ipv4(safi: Safi) -> Self {
        Self::with_standard_handlers(Afi::Ipv4, safi)
    }

    pub fn ipv6(safi: Safi) -> Self {
        Self::with_standard_handlers(Afi::Ipv6, safi)
    }

    pub fn afi(&self) -> Afi {
        self.afi
    }

    pub fn safi(&self) -> Safi {
        self.safi
    }

    fn registration(&self, slot: HandlerSlot) -> HandlerRegistration {
        HandlerRegistration {
            afi: self.afi,
            safi: self.safi,
            slot,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Register a parser for a component type byte not yet handled by this table.
    pub fn register_parser(
        &self,
        component_type: u8,
        parser: Arc<dyn ComponentParser>,
    ) -> Result<HandlerRegistration, ParserError> {
        let mut parsers = self.parsers.write();
        if parsers.contains_key(&component_type) {
            return Err(ParserError::ParserAlreadyRegistered {
                afi: self.afi,
                safi: self.safi,
                component_type,
            });
        }
        let registration = self.registration(HandlerSlot::Parser(component_type));
        parsers.insert(
            component_type,
            Registered {
                id: registration.id,
                handler: parser,
            },
        );
        Ok(registration)
    }

    /// Register a serializer for a component kind not yet handled by this table.
    pub fn register_serializer(
        &self,
        kind: ComponentKind,
        serializer: Arc<dyn ComponentSerializer>,
    ) -> Result<HandlerRegistration, ParserError> {
        let mut serializers = self.serializers.write();
        if serializers.contains_key(&kind) {
            return Err(ParserError::SerializerAlreadyRegistered {
                afi: self.afi,
                safi: self.safi,
                kind,
            });
        }
        let registration = self.registration(HandlerSlot::Serializer(kind));
        serializers.insert(
            kind,
            Registered {
                id: registration.id,
                handler: serializer,
            },
        );
        Ok(registration)
    }

    /// Remove the handler added by `registration`. Returns false if it belongs to another
    /// table or was already removed.
    pub fn deregister(&self, registration: HandlerRegistration) -> bool {
        if registration.afi != self.afi || registration.safi != self.safi {
            return false;
        }
        match registration.slot {
            HandlerSlot::Parser(component_type) => {
                let mut parsers = self.parsers.write();
                match parsers.get(&component_type) {
                    Some(entry) if entry.id == registration.id => {
                        parsers.remove(&component_type);
                        true
                    }
                    _ => false,
                }
            }
            HandlerSlot::Serializer(kind) => {
                let mut serializers = self.serializers.write();
                match serializers.get(&kind) {
                    Some(entry) if entry.id == registration.id => {
                        serializers.remove(&kind);
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    pub fn parser(&self, component_type: u8) -> Option<Arc<dyn ComponentParser>> {
        let parsers = self.parsers.read();
        parsers
            .get(&component_type)
            .map(|entry| entry.handler.clone())
    }

    pub fn serializer(&self, kind: ComponentKind) -> Option<Arc<dyn ComponentSerializer>> {
        let serializers = self.serializers.read();
        serializers.get(&kind).map(|entry| entry.handler.clone())
    }

    /// Parse the value of a component whose type byte has already been read.
    pub fn parse_component(
        &self,
        component_type: u8,
        input: &mut Bytes,
    ) -> Result<FlowSpecComponent, ParserError> {
        match self.parser(component_type) {
            Some(parser) => parser.parse_component(input),
            None => Err(ParserError::UnknownComponentType(component_type)),
        }
    }

    /// Encode a component, type byte included.
    pub fn serialize_component(
        &self,
        component: &FlowSpecComponent,
        output: &mut BytesMut,
    ) -> Result<(), ParserError> {
        match self.serializer(component.kind()) {
            Some(serializer) => serializer.serialize_component(component, output),
            None => Err(ParserError::UnknownSerializer(component.kind())),
        }
    }
}

/// Handler tables for IPv4 and IPv6 flowspec, plain (SAFI 133) and VPN (SAFI 134).
///
/// Tables are independent: a handler registered for IPv4 SAFI 133 is not used for any other
/// pair. The registry is safe to share between threads; lookups and registrations may run
/// concurrently.
pub struct FlowSpecRegistry {
    ipv4: ComponentRegistry,
    ipv4_vpn: ComponentRegistry,
    ipv6: ComponentRegistry,
    ipv6_vpn: ComponentRegistry,
}

impl FlowSpecRegistry {
    /// A registry with four empty tables.
    pub fn new() -> Self {
        FlowSpecRegistry {
            ipv4: ComponentRegistry::new(Afi::Ipv4, Safi::FlowSpec),
            ipv4_vpn: ComponentRegistry::new(Afi::Ipv4, Safi::FlowSpecVpn),
            ipv6: ComponentRegistry::new(Afi::Ipv6, Safi::FlowSpec),
            ipv6_vpn: ComponentRegistry::new(Afi::Ipv6, Safi::FlowSpecVpn),
        }
    }

    pub fn with_standard_handlers() -> Self {
        FlowSpecRegistry {
            ipv4: ComponentRegistry::ipv4(Safi::FlowSpec),
            ipv4_vpn: ComponentRegistry::ipv4(Safi::FlowSpecVpn),
            ipv6: ComponentRegistry::ipv6(Safi::FlowSpec),
            ipv6_vpn: ComponentRegistry::ipv6(Safi::FlowSpecVpn),
        }
    }

    pub fn table(&self, afi: Afi, safi: Safi) -> &ComponentRegistry {
        match (afi, safi) {
            (Afi::Ipv4, Safi::FlowSpec) => &self.ipv4,
            (Afi::Ipv4, Safi::FlowSpecVpn) => &self.ipv4_vpn,
            (Afi::Ipv6, Safi::FlowSpec) => &self.ipv6,
            (Afi::Ipv6, Safi::FlowSpecVpn) => &self.ipv6_vpn,
        }
    }

    pub fn register_parser(
        &self,
        afi: Afi,
        safi: Safi,
        component_type: u8,
        parser: Arc<dyn ComponentParser>,
    ) -> Result<HandlerRegistration, ParserError> {
        self.table(afi, safi).register_parser(component_type, parser)
    }

    pub fn register_serializer(
        &self,
        afi: Afi,
        safi: Safi,
        kind: ComponentKind,
        serializer: Arc<dyn ComponentSerializer>,
    ) -> Result<HandlerRegistration, ParserError> {
        self.table(afi, safi).register_serializer(kind, serializer)
    }

    pub fn deregister(&self, registration: HandlerRegistration) -> bool {
        self.table(registration.afi, registration.safi)
            .deregister(registration)
    }

    pub fn parser(
        &self,
        afi: Afi,
        safi: Safi,
        component_type: u8,
    ) -> Option<Arc<dyn ComponentParser>> {
        self.table(afi, safi).parser(component_type)
    }

    pub fn serializer(
        &self,
        afi: Afi,
        safi: Safi,
        kind: ComponentKind,
    ) -> Option<Arc<dyn ComponentSerializer>> {
        self.table(afi, safi).serializer(kind)
    }
}

impl Default for FlowSpecRegistry {
    fn default() -> Self {
        Self::with_standard_handlers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;

    /// Type 200: a single byte carried as one equals item.
    struct OneByteHandler;

    impl ComponentParser for OneByteHandler {
        fn parse_component(&self, input: &mut Bytes) -> Result<FlowSpecComponent, ParserError> {
            let value = crate::parser::ReadUtils::read_u8(input)?;
            Ok(FlowSpecComponent::Unknown {
                component_type: 200,
                data: vec![value],
            })
        }
    }

    impl ComponentSerializer for OneByteHandler {
        fn serialize_component(
            &self,
            component: &FlowSpecComponent,
            output: &mut BytesMut,
        ) -> Result<(), ParserError> {
            output.put_u8(200);
            output.put_u8(component.component_type());
            Ok(())
        }
    }

    #[test]
    fn test_standard_tables() {
        let registry = FlowSpecRegistry::with_standard_handlers();
        for safi in [Safi::FlowSpec, Safi::FlowSpecVpn] {
            for component_type in 1..=12 {
                assert!(registry.parser(Afi::Ipv4, safi, component_type).is_some());
                assert!(registry.parser(Afi::Ipv6, safi, component_type).is_some());
            }
            assert!(registry.parser(Afi::Ipv4, safi, 13).is_none());
            assert!(registry.parser(Afi::Ipv6, safi, 13).is_some());
            assert!(registry.parser(Afi::Ipv6, safi, 14).is_none());
            assert!(registry
                .serializer(Afi::Ipv4, safi, ComponentKind::IpProtocol)
                .is_some());
            assert!(registry
                .serializer(Afi::Ipv4, safi, ComponentKind::NextHeader)
                .is_none());
            assert!(registry
                .serializer(Afi::Ipv6, safi, ComponentKind::NextHeader)
                .is_some());
        }

        let empty = FlowSpecRegistry::new();
        assert!(empty.parser(Afi::Ipv4, Safi::FlowSpec, 1).is_none());
    }

    #[test]
    fn test_protocol_and_next_header_share_type_3() {
        let v4 = ComponentRegistry::ipv4(Safi::FlowSpec);
        let v6 = ComponentRegistry::ipv6(Safi::FlowSpec);
        let mut input = Bytes::from_static(&[0x81, 0x06]);
        assert_eq!(
            v4.parse_component(3, &mut input.clone()).unwrap().kind(),
            ComponentKind::IpProtocol
        );
        assert_eq!(
            v6.parse_component(3, &mut input).unwrap().kind(),
            ComponentKind::NextHeader
        );
    }

    #[test]
    fn test_register_and_deregister() {
        let registry = FlowSpecRegistry::with_standard_handlers();

        // standard handlers cannot be replaced
        assert_eq!(
            registry
                .register_parser(Afi::Ipv4, Safi::FlowSpec, 4, Arc::new(OneByteHandler))
                .unwrap_err(),
            ParserError::ParserAlreadyRegistered {
                afi: Afi::Ipv4,
                safi: Safi::FlowSpec,
                component_type: 4
            }
        );
        assert_eq!(
            registry
                .register_serializer(
                    Afi::Ipv6,
                    Safi::FlowSpecVpn,
                    ComponentKind::Dscp,
                    Arc::new(OneByteHandler)
                )
                .unwrap_err(),
            ParserError::SerializerAlreadyRegistered {
                afi: Afi::Ipv6,
                safi: Safi::FlowSpecVpn,
                kind: ComponentKind::Dscp
            }
        );

        let parser = registry
            .register_parser(Afi::Ipv4, Safi::FlowSpec, 200, Arc::new(OneByteHandler))
            .unwrap();
        assert_eq!(parser.afi(), Afi::Ipv4);
        assert_eq!(parser.safi(), Safi::FlowSpec);

        // only the registered table sees the new handler
        assert!(registry.parser(Afi::Ipv4, Safi::FlowSpec, 200).is_some());
        assert!(registry.parser(Afi::Ipv4, Safi::FlowSpecVpn, 200).is_none());
        assert!(registry.parser(Afi::Ipv6, Safi::FlowSpec, 200).is_none());

        let mut input = Bytes::from_static(&[0x2a]);
        assert_eq!(
            registry
                .table(Afi::Ipv4, Safi::FlowSpec)
                .parse_component(200, &mut input)
                .unwrap(),
            FlowSpecComponent::Unknown {
                component_type: 200,
                data: vec![0x2a]
            }
        );

        let serializer = registry
            .register_serializer(
                Afi::Ipv4,
                Safi::FlowSpec,
                ComponentKind::Unknown,
                Arc::new(OneByteHandler),
            )
            .unwrap();

        assert!(registry.deregister(parser));
        assert!(registry.parser(Afi::Ipv4, Safi::FlowSpec, 200).is_none());
        assert!(registry.deregister(serializer));
        assert!(registry
            .serializer(Afi::Ipv4, Safi::FlowSpec, ComponentKind::Unknown)
            .is_none());
    }

    #[test]
    fn test_stale_registration() {
        let registry = ComponentRegistry::ipv6(Safi::FlowSpec);
        let first = registry
            .register_parser(201, Arc::new(OneByteHandler))
            .unwrap();
        let first_id = first.id;
        assert!(registry.deregister(first));

        let second = registry
            .register_parser(201, Arc::new(OneByteHandler))
            .unwrap();
        assert_ne!(second.id, first_id);

        // a registration for the same slot with an old id does not remove the new handler
        let stale = HandlerRegistration {
            afi: Afi::Ipv6,
            safi: Safi::FlowSpec,
            slot: HandlerSlot::Parser(201),
            id: first_id,
        };
        assert!(!registry.deregister(stale));
        assert!(registry.parser(201).is_some());

        // registrations of another table are rejected
        let other = ComponentRegistry::ipv4(Safi::FlowSpec);
        assert!(!other.deregister(second));
    }

    #[test]
    fn test_lookup_misses() {
        let registry = ComponentRegistry::new(Afi::Ipv4, Safi::FlowSpec);
        let mut input = Bytes::from_static(&[0x81, 0x50]);
        assert_eq!(
            registry.parse_component(4, &mut input),
            Err(ParserError::UnknownComponentType(4))
        );
        let mut output = BytesMut::new();
        assert_eq!(
            registry.serialize_component(
                &FlowSpecComponent::Port(vec![NumericItem::equal_to(80)]),
                &mut output
            ),
            Err(ParserError::UnknownSerializer(ComponentKind::Port))
        );
    }

    #[test]
    fn test_concurrent_lookups() {
        let registry = Arc::new(FlowSpecRegistry::with_standard_handlers());
        let handles = (0..4u8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let registration = registry
                        .register_parser(
                            Afi::Ipv4,
                            Safi::FlowSpec,
                            220 + i,
                            Arc::new(OneByteHandler),
                        )
                        .unwrap();
                    for _ in 0..100 {
                        let mut input = Bytes::from_static(&[0x81, 0x50]);
                        registry
                            .table(Afi::Ipv4, Safi::FlowSpec)
                            .parse_component(4, &mut input)
                            .unwrap();
                    }
                    registry.deregister(registration)
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    struct PanickingHandler;

    impl ComponentParser for PanickingHandler {
        fn parse_component(&self, _input: &mut Bytes) -> Result<FlowSpecComponent, ParserError> {
            panic!("handler failure")
        }
    }

    #[test]
    fn test_registry_usable_after_handler_panic() {
        let registry = Arc::new(FlowSpecRegistry::with_standard_handlers());
        let registration = registry
            .register_parser(Afi::Ipv6, Safi::FlowSpec, 230, Arc::new(PanickingHandler))
            .unwrap();

        let shared = registry.clone();
        let result = std::thread::spawn(move || {
            let mut input = Bytes::from_static(&[0x00]);
            let _ = shared
                .table(Afi::Ipv6, Safi::FlowSpec)
                .parse_component(230, &mut input);
        })
        .join();
        assert!(result.is_err());

        assert!(registry.deregister(registration));
        assert!(registry.parser(Afi::Ipv6, Safi::FlowSpec, 230).is_none());
        let registration = registry
            .register_parser(Afi::Ipv6, Safi::FlowSpec, 230, Arc::new(OneByteHandler))
            .unwrap();
        let mut input = Bytes::from_static(&[0x07]);
        assert_eq!(
            registry
                .table(Afi::Ipv6, Safi::FlowSpec)
                .parse_component(230, &mut input)
                .unwrap(),
            FlowSpecComponent::Unknown {
                component_type: 200,
                data: vec![0x07],
            }
        );
        assert!(registry.deregister(registration));
    }
}
